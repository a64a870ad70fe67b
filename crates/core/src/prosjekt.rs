//! Project (prosjekt) status vocabulary and validation.

use crate::error::CoreError;
use crate::types::Date;

pub const STATUS_PLANLAGT: &str = "planlagt";
pub const STATUS_AKTIV: &str = "aktiv";
pub const STATUS_PAUSE: &str = "pause";
pub const STATUS_AVSLUTTET: &str = "avsluttet";
pub const STATUS_ARKIVERT: &str = "arkivert";

/// All valid project statuses. Must match `ck_prosjekter_status`.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PLANLAGT,
    STATUS_AKTIV,
    STATUS_PAUSE,
    STATUS_AVSLUTTET,
    STATUS_ARKIVERT,
];

/// Validate that a status string is one of the known project statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid project status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Validate that a project does not end before it starts.
pub fn validate_date_range(start: Option<Date>, end: Option<Date>) -> Result<(), CoreError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(CoreError::Validation(format!(
            "Project end date {e} is before start date {s}"
        ))),
        _ => Ok(()),
    }
}
