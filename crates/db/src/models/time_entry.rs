//! Time entry (timeregistrering) model and DTOs.

use hms_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `time_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub user_id: DbId,
    pub prosjekt_id: DbId,
    pub oppgave_id: Option<DbId>,
    pub work_date: Date,
    pub hours: f64,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for logging hours. The owner is always the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeEntry {
    pub prosjekt_id: DbId,
    pub oppgave_id: Option<DbId>,
    pub work_date: Date,
    pub hours: f64,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// DTO for updating a time entry. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTimeEntry {
    pub prosjekt_id: Option<DbId>,
    pub oppgave_id: Option<DbId>,
    /// Detach the entry from its task. Moving the entry to another project
    /// without naming a task detaches it as well.
    #[serde(default)]
    pub unassign_oppgave: bool,
    pub work_date: Option<Date>,
    pub hours: Option<f64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Final column values for an update, merged from the request and the
/// stored entry.
#[derive(Debug, Clone)]
pub struct TimeEntryChanges {
    pub prosjekt_id: DbId,
    pub oppgave_id: Option<DbId>,
    pub work_date: Date,
    pub hours: f64,
    pub description: Option<String>,
}

/// Filter for listing/exporting time entries within one company.
#[derive(Debug, Clone)]
pub struct TimeEntryFilter {
    pub from: Date,
    pub to: Date,
    pub user_id: Option<DbId>,
    pub prosjekt_id: Option<DbId>,
}

/// Flattened row for the CSV export.
#[derive(Debug, Clone, FromRow)]
pub struct TimeEntryExportRow {
    pub work_date: Date,
    pub employee: String,
    pub project: String,
    pub task: Option<String>,
    pub hours: f64,
    pub description: Option<String>,
}

/// Hours grouped by project and employee.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeSummaryRow {
    pub prosjekt_id: DbId,
    pub prosjekt_name: String,
    pub user_id: DbId,
    pub employee: String,
    pub hours: f64,
}
