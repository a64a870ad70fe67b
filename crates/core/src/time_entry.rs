//! Time tracking rules: hour granularity, daily caps and reporting periods.

use chrono::{Datelike, Duration};

use crate::error::CoreError;
use crate::types::Date;

/// No one can log more than a full day.
pub const MAX_HOURS_PER_DAY: f64 = 24.0;

/// Hours are logged in quarter-hour steps.
pub const HOUR_GRANULARITY: f64 = 0.25;

/// Longest period accepted by list/summary/export queries.
pub const MAX_PERIOD_DAYS: i64 = 366;

/// Validate a single entry's hours: `0 < hours <= 24` in quarter-hour steps.
pub fn validate_hours(hours: f64) -> Result<(), CoreError> {
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_HOURS_PER_DAY {
        return Err(CoreError::Validation(format!(
            "Hours must be greater than 0 and at most {MAX_HOURS_PER_DAY}, got {hours}"
        )));
    }
    let steps = hours / HOUR_GRANULARITY;
    if (steps - steps.round()).abs() > 1e-9 {
        return Err(CoreError::Validation(format!(
            "Hours must be logged in steps of {HOUR_GRANULARITY}, got {hours}"
        )));
    }
    Ok(())
}

/// Validate that adding `new_hours` to `already_logged` stays within one day.
pub fn validate_daily_total(already_logged: f64, new_hours: f64) -> Result<(), CoreError> {
    let total = already_logged + new_hours;
    if total > MAX_HOURS_PER_DAY + 1e-9 {
        return Err(CoreError::Validation(format!(
            "Total hours for the day would be {total}, which exceeds {MAX_HOURS_PER_DAY}"
        )));
    }
    Ok(())
}

/// Validate a reporting period given as inclusive dates.
pub fn validate_period(from: Date, to: Date) -> Result<(), CoreError> {
    if to < from {
        return Err(CoreError::Validation(format!(
            "Period end {to} is before period start {from}"
        )));
    }
    if (to - from).num_days() >= MAX_PERIOD_DAYS {
        return Err(CoreError::Validation(format!(
            "Period may span at most {MAX_PERIOD_DAYS} days"
        )));
    }
    Ok(())
}

/// Inclusive Monday..=Sunday bounds of the ISO week containing `day`.
pub fn week_bounds(day: Date) -> (Date, Date) {
    let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// Default reporting period when the caller gives none: the current month
/// up to and including `today`.
pub fn default_period(today: Date) -> (Date, Date) {
    let first = today.with_day(1).unwrap_or(today);
    (first, today)
}
