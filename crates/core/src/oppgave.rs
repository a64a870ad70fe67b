//! Task (oppgave) status and priority vocabularies.
//!
//! Task statuses double as the Kanban board columns, in board order.

use crate::error::CoreError;

pub const STATUS_IKKE_STARTET: &str = "ikke_startet";
pub const STATUS_PAGAR: &str = "pagar";
pub const STATUS_TIL_GODKJENNING: &str = "til_godkjenning";
pub const STATUS_FULLFORT: &str = "fullfort";

/// Board columns, left to right. Must match `ck_oppgaver_status`.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_IKKE_STARTET,
    STATUS_PAGAR,
    STATUS_TIL_GODKJENNING,
    STATUS_FULLFORT,
];

pub const PRIORITY_LAV: &str = "lav";
pub const PRIORITY_MIDDELS: &str = "middels";
pub const PRIORITY_HOY: &str = "hoy";
pub const PRIORITY_KRITISK: &str = "kritisk";

/// Must match `ck_oppgaver_priority`.
pub const VALID_PRIORITIES: &[&str] = &[
    PRIORITY_LAV,
    PRIORITY_MIDDELS,
    PRIORITY_HOY,
    PRIORITY_KRITISK,
];

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid task status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    if VALID_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid task priority '{priority}'. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        )))
    }
}

/// Validate an optional estimate in hours (non-negative, at most 10 000).
pub fn validate_estimated_hours(hours: Option<f64>) -> Result<(), CoreError> {
    match hours {
        Some(h) if !h.is_finite() || !(0.0..=10_000.0).contains(&h) => Err(
            CoreError::Validation(format!("Estimated hours {h} must be between 0 and 10000")),
        ),
        _ => Ok(()),
    }
}
