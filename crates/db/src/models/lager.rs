//! Warehouse stock (lager) models and DTOs.

use hms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `lager_produkter` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LagerProdukt {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub supplier: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub quantity: i32,
    pub min_quantity: i32,
    pub location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LagerProdukt {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.min_quantity
    }
}

/// DTO for creating a stock item.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLagerProdukt {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub supplier: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    /// Defaults to `stk`.
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// DTO for updating a stock item. The quantity itself only changes through
/// movements.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLagerProdukt {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub supplier: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// A row from the `lager_bevegelser` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LagerBevegelse {
    pub id: DbId,
    pub bedrift_id: DbId,
    pub produkt_id: DbId,
    pub user_id: Option<DbId>,
    pub prosjekt_id: Option<DbId>,
    pub movement_type: String,
    pub quantity_change: i32,
    pub quantity_after: i32,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a stock movement.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLagerBevegelse {
    pub movement_type: String,
    pub quantity: i32,
    pub prosjekt_id: Option<DbId>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

/// Outcome of a committed stock movement.
#[derive(Debug, Clone, Serialize)]
pub struct MovementResult {
    pub produkt: LagerProdukt,
    pub bevegelse: LagerBevegelse,
    /// The movement took the stock from at-or-above minimum to below it.
    #[serde(skip)]
    pub crossed_below_minimum: bool,
}
