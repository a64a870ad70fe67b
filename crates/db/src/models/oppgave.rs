//! Task (oppgave) entity model and DTOs.

use hms_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `oppgaver` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Oppgave {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub prosjekt_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub position: i32,
    pub due_date: Option<Date>,
    pub estimated_hours: Option<f64>,
    pub assigned_user_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task inside a project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOppgave {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    /// Defaults to `ikke_startet`.
    pub status: Option<String>,
    /// Defaults to `middels`.
    pub priority: Option<String>,
    pub position: Option<i32>,
    pub due_date: Option<Date>,
    pub estimated_hours: Option<f64>,
    pub assigned_user_id: Option<DbId>,
}

/// DTO for updating a task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOppgave {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub position: Option<i32>,
    pub due_date: Option<Date>,
    pub estimated_hours: Option<f64>,
    pub assigned_user_id: Option<DbId>,
    /// Remove the current assignee. Takes precedence over `assigned_user_id`.
    #[serde(default)]
    pub unassign: bool,
}

/// Kanban move: new status column and optional position within it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOppgaveStatus {
    pub status: String,
    pub position: Option<i32>,
}

/// What a task deletion removed or detached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OppgaveDeleteSummary {
    pub deleted_files: u64,
    pub detached_time_entries: u64,
    #[serde(skip)]
    pub file_keys: Vec<String>,
}
