//! Safety/compliance forms (skjema): kinds, business numbers, statuses.
//!
//! Every form kind has its own running number per company. The number is
//! allocated by the repository inside the insert transaction; this module
//! only owns the formatting and the per-kind content rules.

use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Deviation report (avviksmelding).
pub const TYPE_AVVIK: &str = "avvik";
/// Change request (endringsskjema).
pub const TYPE_ENDRING: &str = "endring";
/// Job safety analysis (sikker jobbanalyse).
pub const TYPE_SJA: &str = "sja";
/// Risk assessment (risikovurdering).
pub const TYPE_RISIKOVURDERING: &str = "risikovurdering";

/// Must match `ck_skjemaer_type`.
pub const VALID_TYPES: &[&str] = &[TYPE_AVVIK, TYPE_ENDRING, TYPE_SJA, TYPE_RISIKOVURDERING];

pub fn validate_type(skjema_type: &str) -> Result<(), CoreError> {
    if VALID_TYPES.contains(&skjema_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid form type '{skjema_type}'. Must be one of: {}",
            VALID_TYPES.join(", ")
        )))
    }
}

/// Prefix of the business number for a form kind.
pub fn number_prefix(skjema_type: &str) -> Result<&'static str, CoreError> {
    match skjema_type {
        TYPE_AVVIK => Ok("AVV"),
        TYPE_ENDRING => Ok("END"),
        TYPE_SJA => Ok("SJA"),
        TYPE_RISIKOVURDERING => Ok("RISK"),
        other => Err(CoreError::Validation(format!("Invalid form type '{other}'"))),
    }
}

/// Format a business number, e.g. `AVV-0007`. Widens past four digits.
pub fn format_number(skjema_type: &str, sequence: i32) -> Result<String, CoreError> {
    if sequence < 1 {
        return Err(CoreError::Internal(format!(
            "Form sequence must start at 1, got {sequence}"
        )));
    }
    Ok(format!("{}-{sequence:04}", number_prefix(skjema_type)?))
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

pub const STATUS_NY: &str = "ny";
pub const STATUS_UNDER_BEHANDLING: &str = "under_behandling";
pub const STATUS_LUKKET: &str = "lukket";

/// Must match `ck_skjemaer_status`.
pub const VALID_STATUSES: &[&str] = &[STATUS_NY, STATUS_UNDER_BEHANDLING, STATUS_LUKKET];

/// Statuses reachable from `from_status`.
///
/// - `ny`               -> `under_behandling`, `lukket`
/// - `under_behandling` -> `lukket`
/// - `lukket`           -> `under_behandling` (re-open)
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_NY => &[STATUS_UNDER_BEHANDLING, STATUS_LUKKET],
        STATUS_UNDER_BEHANDLING => &[STATUS_LUKKET],
        STATUS_LUKKET => &[STATUS_UNDER_BEHANDLING],
        _ => &[],
    }
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid form status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    validate_status(next)?;
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move form from '{current}' to '{next}'. Allowed: {allowed:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Severity and content
// ---------------------------------------------------------------------------

pub const SEVERITY_LAV: &str = "lav";
pub const SEVERITY_MIDDELS: &str = "middels";
pub const SEVERITY_HOY: &str = "hoy";
pub const SEVERITY_KRITISK: &str = "kritisk";

/// Must match `ck_skjemaer_severity`.
pub const VALID_SEVERITIES: &[&str] = &[
    SEVERITY_LAV,
    SEVERITY_MIDDELS,
    SEVERITY_HOY,
    SEVERITY_KRITISK,
];

/// Whether a form kind must carry a severity.
pub fn requires_severity(skjema_type: &str) -> bool {
    matches!(skjema_type, TYPE_AVVIK | TYPE_RISIKOVURDERING)
}

pub fn validate_severity(severity: &str) -> Result<(), CoreError> {
    if VALID_SEVERITIES.contains(&severity) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid severity '{severity}'. Must be one of: {}",
            VALID_SEVERITIES.join(", ")
        )))
    }
}

/// Keys that must be non-empty strings in `details`, per kind.
fn required_text_keys(skjema_type: &str) -> &'static [&'static str] {
    match skjema_type {
        TYPE_AVVIK => &["description"],
        TYPE_ENDRING => &["description", "justification"],
        TYPE_SJA => &["work_operation"],
        _ => &[],
    }
}

/// Keys that must be non-empty arrays in `details`, per kind.
fn required_list_keys(skjema_type: &str) -> &'static [&'static str] {
    match skjema_type {
        TYPE_SJA | TYPE_RISIKOVURDERING => &["hazards"],
        _ => &[],
    }
}

/// Validate a form's kind-specific content and severity together.
pub fn validate_content(
    skjema_type: &str,
    severity: Option<&str>,
    details: &Value,
) -> Result<(), CoreError> {
    validate_type(skjema_type)?;

    match severity {
        Some(s) => validate_severity(s)?,
        None if requires_severity(skjema_type) => {
            return Err(CoreError::Validation(format!(
                "Form type '{skjema_type}' requires a severity"
            )));
        }
        None => {}
    }

    let obj = details
        .as_object()
        .ok_or_else(|| CoreError::Validation("Form details must be a JSON object".into()))?;

    for key in required_text_keys(skjema_type) {
        let ok = obj
            .get(*key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !ok {
            return Err(CoreError::Validation(format!(
                "Form type '{skjema_type}' requires a non-empty '{key}'"
            )));
        }
    }

    for key in required_list_keys(skjema_type) {
        let ok = obj
            .get(*key)
            .and_then(Value::as_array)
            .is_some_and(|a| !a.is_empty());
        if !ok {
            return Err(CoreError::Validation(format!(
                "Form type '{skjema_type}' requires at least one entry in '{key}'"
            )));
        }
    }

    Ok(())
}
