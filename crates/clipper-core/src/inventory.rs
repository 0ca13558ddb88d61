//! # Stock Arithmetic
//!
//! Pure planning of inventory quantity changes. The database layer reads the
//! quantity on hand, asks this module what the new quantity should be, and
//! only then writes.
//!
//! ## Two Paths, One Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Manual movement (stock screen)      Product sale (checkout)            │
//! │  ─────────────────────────────       ───────────────────────            │
//! │  plan_movement(current, dir, q)      plan_sale(current, q, policy)      │
//! │       │                                   │                             │
//! │       │  in  → current + q                │  Guarded       → current - q│
//! │       │  out → current - q                │                  (≥ 0 only) │
//! │       │        (≥ 0 only)                 │  AllowNegative → current - q│
//! │       ▼                                   ▼                             │
//! │  Err(InsufficientStock) before any write, or the new quantity           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::quantity::Quantity;
use crate::types::MovementDirection;
use crate::validation::validate_positive_quantity;

/// How product sales treat stock that would go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum SaleStockPolicy {
    /// A sale larger than the quantity on hand is rejected, the same rule the
    /// manual movement path applies.
    #[default]
    Guarded,
    /// A sale always succeeds and may leave the quantity on hand negative,
    /// for shops that ring up products before booking the delivery.
    AllowNegative,
}

impl SaleStockPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStockPolicy::Guarded => "guarded",
            SaleStockPolicy::AllowNegative => "allow-negative",
        }
    }
}

impl fmt::Display for SaleStockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStockPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guarded" => Ok(SaleStockPolicy::Guarded),
            "allow-negative" | "allow_negative" => Ok(SaleStockPolicy::AllowNegative),
            _ => Err(ValidationError::NotAllowed {
                field: "sale stock policy".to_string(),
                allowed: vec!["guarded".to_string(), "allow-negative".to_string()],
            }),
        }
    }
}

impl FromStr for MovementDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(MovementDirection::In),
            "out" => Ok(MovementDirection::Out),
            _ => Err(ValidationError::NotAllowed {
                field: "direction".to_string(),
                allowed: vec!["in".to_string(), "out".to_string()],
            }),
        }
    }
}

/// A manual stock adjustment as entered on the stock screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementDraft {
    pub item_id: String,
    pub direction: MovementDirection,
    pub quantity_milli: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MovementDraft {
    pub fn new(item_id: impl Into<String>, direction: MovementDirection, quantity: Quantity) -> Self {
        MovementDraft {
            item_id: item_id.into(),
            direction,
            quantity_milli: quantity.milli(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }
}

/// Quantity with the sign of its direction: `in` adds, `out` subtracts.
#[inline]
pub fn signed_quantity(direction: MovementDirection, qty: Quantity) -> Quantity {
    match direction {
        MovementDirection::In => qty,
        MovementDirection::Out => -qty,
    }
}

/// Plans a manual stock movement.
///
/// ## Rules
/// - `qty` must be strictly positive
/// - `in` has no business upper bound, only the `i64` range of milli-units
/// - `out` may not leave the item below zero
///
/// ## Returns
/// The quantity on hand after the movement.
pub fn plan_movement(
    item: &str,
    current: Quantity,
    direction: MovementDirection,
    qty: Quantity,
) -> CoreResult<Quantity> {
    validate_positive_quantity(qty)?;

    let candidate = match direction {
        MovementDirection::In => current.checked_add(qty).ok_or_else(stock_out_of_range)?,
        MovementDirection::Out => current.checked_sub(qty).ok_or_else(stock_out_of_range)?,
    };
    if candidate.is_negative() {
        return Err(CoreError::InsufficientStock {
            item: item.to_string(),
            available: current,
            requested: qty,
        });
    }

    Ok(candidate)
}

/// Plans the stock decrement caused by selling `qty` of an item.
///
/// Under [`SaleStockPolicy::Guarded`] this is exactly an `out` movement;
/// under [`SaleStockPolicy::AllowNegative`] the decrement is unconditional.
pub fn plan_sale(
    item: &str,
    current: Quantity,
    qty: Quantity,
    policy: SaleStockPolicy,
) -> CoreResult<Quantity> {
    match policy {
        SaleStockPolicy::Guarded => plan_movement(item, current, MovementDirection::Out, qty),
        SaleStockPolicy::AllowNegative => {
            validate_positive_quantity(qty)?;
            current
                .checked_sub(qty)
                .ok_or_else(|| CoreError::from(stock_out_of_range()))
        }
    }
}

fn stock_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
}

/// Note written on the movement created by a product sale.
///
/// ```rust
/// use clipper_core::inventory::sale_movement_note;
///
/// assert_eq!(sale_movement_note("tx-42"), "Sale - transaction tx-42");
/// ```
pub fn sale_movement_note(transaction_id: &str) -> String {
    format!("Sale - transaction {}", transaction_id)
}
