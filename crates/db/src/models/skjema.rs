//! Safety form (skjema) model and DTOs.
//!
//! All four form kinds share one table; kind-specific fields live in the
//! `details` JSON object.

use hms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `skjemaer` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Skjema {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub skjema_type: String,
    /// Business number, e.g. `AVV-0007`.
    pub number: String,
    pub sequence: i32,
    pub title: String,
    pub prosjekt_id: Option<DbId>,
    pub status: String,
    pub severity: Option<String>,
    pub details: serde_json::Value,
    pub submitted_by: Option<DbId>,
    pub handled_by: Option<DbId>,
    pub handler_comment: Option<String>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSkjema {
    pub skjema_type: String,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub prosjekt_id: Option<DbId>,
    pub severity: Option<String>,
    #[serde(default = "empty_object")]
    pub details: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// DTO for editing a form. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSkjema {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub severity: Option<String>,
    pub details: Option<serde_json::Value>,
    pub prosjekt_id: Option<DbId>,
}

/// DTO for moving a form through its handling workflow.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SkjemaStatusChange {
    pub status: String,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

/// Filters for listing forms of one company.
#[derive(Debug, Clone, Default)]
pub struct SkjemaFilter {
    pub skjema_type: Option<String>,
    pub status: Option<String>,
    pub prosjekt_id: Option<DbId>,
    /// Restrict to forms submitted by this user.
    pub submitted_by: Option<DbId>,
}
