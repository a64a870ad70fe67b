//! Persisted platform event model.

use hms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table, joined with the actor's name for the
/// activity feed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityEntry {
    pub id: DbId,
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub actor_name: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// Internal DTO for inserting an event.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub bedrift_id: Option<DbId>,
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
}
