//! Warehouse stock (lager) movement arithmetic.

use crate::error::CoreError;

/// Items taken out of stock (e.g. to a project).
pub const MOVEMENT_UTTAK: &str = "uttak";
/// Items returned or received into stock.
pub const MOVEMENT_INNLEVERING: &str = "innlevering";
/// Stock count correction: `quantity` is the new absolute count.
pub const MOVEMENT_JUSTERING: &str = "justering";

/// Must match `ck_lager_bevegelser_type`.
pub const VALID_MOVEMENTS: &[&str] = &[MOVEMENT_UTTAK, MOVEMENT_INNLEVERING, MOVEMENT_JUSTERING];

/// Result of applying a movement to the current stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementOutcome {
    /// Signed change applied to the stock level.
    pub change: i32,
    /// Stock level after the movement.
    pub quantity_after: i32,
}

/// Compute the effect of a movement on `current` stock.
///
/// `uttak` and `innlevering` require a positive quantity; `justering`
/// accepts any non-negative target count. Stock can never go negative.
pub fn apply_movement(
    movement_type: &str,
    quantity: i32,
    current: i32,
) -> Result<MovementOutcome, CoreError> {
    let change = match movement_type {
        MOVEMENT_UTTAK | MOVEMENT_INNLEVERING if quantity <= 0 => {
            return Err(CoreError::Validation(format!(
                "Quantity for '{movement_type}' must be positive, got {quantity}"
            )));
        }
        MOVEMENT_UTTAK => -quantity,
        MOVEMENT_INNLEVERING => quantity,
        MOVEMENT_JUSTERING if quantity < 0 => {
            return Err(CoreError::Validation(format!(
                "Adjusted stock count cannot be negative, got {quantity}"
            )));
        }
        MOVEMENT_JUSTERING => quantity - current,
        other => {
            return Err(CoreError::Validation(format!(
                "Invalid movement type '{other}'. Must be one of: {}",
                VALID_MOVEMENTS.join(", ")
            )));
        }
    };

    let quantity_after = current.checked_add(change).ok_or_else(|| {
        CoreError::Validation("Stock quantity is out of range".to_string())
    })?;

    if quantity_after < 0 {
        return Err(CoreError::Validation(format!(
            "Cannot withdraw {quantity}: only {current} in stock"
        )));
    }

    Ok(MovementOutcome {
        change,
        quantity_after,
    })
}

/// Whether a movement took stock from at-or-above the minimum to below it.
pub fn crossed_below_minimum(before: i32, after: i32, min_quantity: i32) -> bool {
    before >= min_quantity && after < min_quantity
}
