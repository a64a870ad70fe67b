//! Support log (support_logg) model and DTOs.

use hms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `support_logg` table joined with the author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupportLogg {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub bedrift_name: String,
    pub user_id: Option<DbId>,
    pub user_name: Option<String>,
    pub action: String,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for writing a support log entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSupportLogg {
    pub bedrift_id: DbId,
    #[validate(length(min = 1, max = 100))]
    pub action: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    pub metadata: Option<serde_json::Value>,
}
