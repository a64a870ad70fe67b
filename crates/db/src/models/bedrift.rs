//! Company (bedrift) entity model and DTOs.

use hms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `bedrifter` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bedrift {
    pub id: DbId,
    pub name: String,
    pub orgnummer: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Company listing row for support staff, with its number of users.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BedriftSummary {
    pub id: DbId,
    pub name: String,
    pub orgnummer: String,
    pub city: Option<String>,
    pub is_active: bool,
    pub user_count: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a company. `orgnummer` must already be normalized.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBedrift {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub orgnummer: String,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
}

/// DTO for updating a company. All fields are optional.
///
/// `is_active` is only honoured for support staff.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBedrift {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    pub is_active: Option<bool>,
}
