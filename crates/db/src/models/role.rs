//! Role lookup model.

use hms_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Roles use a `SMALLSERIAL` primary key.
pub type RoleId = i16;

/// A row from the `roles` lookup table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
