//! # Domain Types
//!
//! Core domain types used throughout the back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │   Profile    │  │    Barber    │  │   Service    │  │ PaymentMeth│  │
//! │  │  role        │  │  name        │  │  price_cents │  │  name      │  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  └─────┬──────┘  │
//! │         │ created_by      │ barber_id       │ service_id     │         │
//! │         ▼                 ▼                 │                ▼         │
//! │  ┌─────────────────────────────────┐        │    payment_method_id     │
//! │  │          Transaction            │◄───────┼──────────────────────────│
//! │  │  total_cents, notes             │        │                          │
//! │  └──────────────┬──────────────────┘        │                          │
//! │                 │ 1..n                      │                          │
//! │  ┌──────────────▼──────────────────┐        │                          │
//! │  │        TransactionItem          │◄───────┘                          │
//! │  │  kind: SERVICE xor PRODUCT      │                                   │
//! │  └──────────────┬──────────────────┘                                   │
//! │                 │ inventory_item_id (PRODUCT only)                      │
//! │  ┌──────────────▼──────────────────┐   ┌────────────────────────────┐  │
//! │  │        InventoryItem            │──►│    InventoryMovement       │  │
//! │  │  quantity_milli, min_quantity   │   │  in | out, append-only     │  │
//! │  └─────────────────────────────────┘   └────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Representation
//! Money fields end in `_cents` and quantity fields end in `_milli`; both are
//! plain `i64` so rows map straight onto SQLite INTEGER columns. Accessors
//! return the [`Money`] and [`Quantity`] wrappers for arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Role & Profile
// =============================================================================

/// Access role assigned to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shop owner or manager: full catalog and inventory management.
    Admin,
    /// Front-desk staff: registers sales and stock movements.
    Operator,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff member able to use the back-office.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A barber that sales are registered against.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Barber {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    /// Inactive barbers stay referenced by historical transactions.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A service on the price list (haircut, beard trim, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// List price in cents. Copied onto the transaction line at checkout.
    pub price_cents: i64,
    /// Default barber commission per unit in cents.
    pub commission_cents: i64,
    pub duration_minutes: Option<i64>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Service {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn commission(&self) -> Money {
        Money::from_cents(self.commission_cents)
    }
}

/// A payment method accepted at the counter (cash, card, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Transactions
// =============================================================================

/// Kind of a transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineKind {
    /// A service rendered; references a [`Service`].
    Service,
    /// A product sold; references an [`InventoryItem`] and depletes its stock.
    Product,
}

impl LineKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineKind::Service => "SERVICE",
            LineKind::Product => "PRODUCT",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer checkout: header of one or more [`TransactionItem`] lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub barber_id: String,
    /// Sum of the line totals, in cents.
    pub total_cents: i64,
    pub payment_method_id: String,
    pub notes: Option<String>,
    /// Profile that registered the sale.
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One line of a transaction. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub kind: LineKind,
    /// Present iff `kind` is SERVICE.
    pub service_id: Option<String>,
    /// Present iff `kind` is PRODUCT.
    pub inventory_item_id: Option<String>,
    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,
    pub quantity_milli: i64,
    /// Barber commission per unit in cents at time of sale (frozen).
    pub commission_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl TransactionItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    /// Unit price × quantity. Checkout refuses lines whose totals overflow,
    /// so stored rows never reach the clamp.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).saturating_times_quantity(self.quantity())
    }

    /// Commission per unit × quantity.
    pub fn commission_total(&self) -> Money {
        Money::from_cents(self.commission_cents).saturating_times_quantity(self.quantity())
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// A stock-tracked product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Optional unique stock keeping unit.
    pub sku: Option<String>,
    /// Quantity on hand in milli-units.
    pub quantity_milli: i64,
    /// Unit label shown next to quantities ("un", "ml", "kg", ...).
    pub unit: String,
    /// Low-stock threshold in milli-units.
    pub min_quantity_milli: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    #[inline]
    pub fn min_quantity(&self) -> Option<Quantity> {
        self.min_quantity_milli.map(Quantity::from_milli)
    }

    /// Low stock: a threshold is configured and the quantity on hand has
    /// fallen to or below it.
    pub fn is_low_stock(&self) -> bool {
        match self.min_quantity() {
            Some(min) => self.quantity() <= min,
            None => false,
        }
    }

    /// Human label used in messages: SKU when present, otherwise the name.
    pub fn label(&self) -> &str {
        self.sku.as_deref().unwrap_or(&self.name)
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record of a stock change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryMovement {
    pub id: String,
    pub item_id: String,
    pub direction: MovementDirection,
    /// Always positive; the sign comes from `direction`.
    pub quantity_milli: i64,
    pub created_by: Option<String>,
    pub notes: Option<String>,
    /// Set when the movement was caused by a product sale.
    pub transaction_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    /// Quantity with the sign of its direction (`in` positive, `out` negative).
    pub fn signed_quantity(&self) -> Quantity {
        crate::inventory::signed_quantity(self.direction, self.quantity())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
