//! Project (prosjekt) entity model and DTOs.

use hms_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `prosjekter` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prosjekt {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub customer: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProsjekt {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Defaults to `planlagt` if omitted.
    pub status: Option<String>,
    #[validate(length(max = 200))]
    pub customer: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProsjekt {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub status: Option<String>,
    #[validate(length(max = 200))]
    pub customer: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// Number of tasks in one status column.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Project detail view: the project plus its task and hour totals.
#[derive(Debug, Clone, Serialize)]
pub struct ProsjektDetail {
    #[serde(flatten)]
    pub prosjekt: Prosjekt,
    pub task_counts: Vec<StatusCount>,
    pub total_hours: f64,
}

/// What a project deletion removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProsjektDeleteSummary {
    pub deleted_tasks: u64,
    pub deleted_time_entries: u64,
    pub deleted_files: u64,
    /// Object keys of the deleted attachments, to be removed from storage.
    #[serde(skip)]
    pub file_keys: Vec<String>,
}
