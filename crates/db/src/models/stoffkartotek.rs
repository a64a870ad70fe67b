//! Chemical register (stoffkartotek) model and DTOs.

use hms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A `stoffkartotek` row with its hazard symbols aggregated in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stoffkartotek {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub product_name: String,
    pub manufacturer: Option<String>,
    pub cas_number: Option<String>,
    pub description: Option<String>,
    pub usage_area: Option<String>,
    pub storage_location: Option<String>,
    #[serde(skip)]
    pub datasheet_key: Option<String>,
    pub hazard_symbols: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Stoffkartotek {
    pub fn has_datasheet(&self) -> bool {
        self.datasheet_key.is_some()
    }
}

/// DTO for registering a chemical product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStoffkartotek {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(length(max = 200))]
    pub manufacturer: Option<String>,
    pub cas_number: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub usage_area: Option<String>,
    #[validate(length(max = 200))]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub hazard_symbols: Vec<String>,
}

/// DTO for updating a chemical product. `hazard_symbols`, when present,
/// replaces the whole symbol set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStoffkartotek {
    #[validate(length(min = 1, max = 200))]
    pub product_name: Option<String>,
    #[validate(length(max = 200))]
    pub manufacturer: Option<String>,
    pub cas_number: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub usage_area: Option<String>,
    #[validate(length(max = 200))]
    pub storage_location: Option<String>,
    pub hazard_symbols: Option<Vec<String>>,
}
