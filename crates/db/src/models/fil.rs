//! Task attachment (oppgave_filer) model.

use hms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `oppgave_filer` table. The bytes live in object storage
/// under `object_key`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OppgaveFil {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub oppgave_id: DbId,
    #[serde(skip)]
    pub object_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Internal DTO for recording an uploaded attachment.
#[derive(Debug, Clone)]
pub struct CreateOppgaveFil {
    pub bedrift_id: DbId,
    pub oppgave_id: DbId,
    pub object_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: DbId,
}
