//! # clipper-core: Pure Business Logic for the Clipper Back-Office
//!
//! This crate holds every rule of the barbershop back-office that can be
//! expressed without touching a database: money and quantity arithmetic, the
//! transaction-item classifier, stock movement planning, the access policy
//! and report aggregation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Clipper Back-Office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                apps/backoffice (CLI shell)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             clipper-db (Session ► Repositories ► SQLite)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ pure calls                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ clipper-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌────────┐ ┌───────┐ │   │
//! │  │   │  money   │ │ quantity │ │ line_item │ │ policy │ │report │ │   │
//! │  │   │  types   │ │inventory │ │validation │ │        │ │       │ │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (barbers, services, transactions, inventory)
//! - [`money`] - Integer-cent money type
//! - [`quantity`] - Fixed-point inventory quantities (thousandths of a unit)
//! - [`line_item`] - Transaction-item classifier (service line xor product line)
//! - [`inventory`] - Stock movement planning and the sale stock policy
//! - [`policy`] - Role-based access predicates per table and operation
//! - [`report`] - Revenue and commission aggregation for the dashboard
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use clipper_core::inventory::plan_movement;
//! use clipper_core::{MovementDirection, Quantity};
//!
//! let on_hand = Quantity::from_units(2);
//! let after = plan_movement("Pomade", on_hand, MovementDirection::In, Quantity::from_units(3)).unwrap();
//! assert_eq!(after, Quantity::from_units(5));
//!
//! // Taking out more than is on hand is rejected before anything is written.
//! assert!(plan_movement("Pomade", on_hand, MovementDirection::Out, Quantity::from_units(5)).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod line_item;
pub mod money;
pub mod policy;
pub mod quantity;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::{MovementDraft, SaleStockPolicy};
pub use line_item::{CheckoutDraft, CheckoutReceipt, LineItemDraft, LineTarget};
pub use money::Money;
pub use policy::{Actor, Operation, Table};
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Unit label used when an inventory item is created without one.
pub const DEFAULT_UNIT: &str = "un";

/// Maximum number of lines accepted in a single checkout.
///
/// A barbershop ticket rarely has more than a handful of lines; the cap stops
/// a runaway form submission from writing thousands of rows in one transaction.
pub const MAX_TRANSACTION_LINES: usize = 50;
