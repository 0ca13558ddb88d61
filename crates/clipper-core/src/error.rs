//! # Error Types
//!
//! Domain-specific error types for clipper-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  clipper-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule and access violations            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  clipper-db errors (separate crate)                                    │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  backoffice errors (app)                                               │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → stderr       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::policy::{Operation, Table};
use crate::quantity::Quantity;
use crate::types::{LineKind, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Rule and policy failures raised by clipper-core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Taking stock out would drive the quantity on hand below zero.
    ///
    /// ## When This Occurs
    /// - Manual `out` movement larger than the quantity on hand
    /// - Product sale larger than the quantity on hand under
    ///   [`SaleStockPolicy::Guarded`](crate::inventory::SaleStockPolicy)
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: Quantity,
        requested: Quantity,
    },

    /// A transaction line's kind does not match the references it carries.
    ///
    /// A SERVICE line must reference a service and no inventory item; a
    /// PRODUCT line must reference an inventory item and no service.
    #[error("Invalid {kind} line: {reason}")]
    LineItemMismatch { kind: LineKind, reason: String },

    /// A checkout was submitted without any lines.
    #[error("Transaction must contain at least one line")]
    EmptyTransaction,

    /// A checkout exceeded the maximum number of lines.
    #[error("Transaction cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// The acting profile's role does not permit the operation.
    #[error("Role {role} may not {operation} {table}")]
    AccessDenied {
        role: Role,
        operation: Operation,
        table: Table,
    },

    /// No profile exists for the supplied identity.
    #[error("Unknown profile: {0}")]
    Unauthenticated(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A field the back-office entered or submitted was rejected before
/// reaching the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Blank name, missing barber or payment method on a checkout.
    #[error("{field} is required")]
    Required { field: String },

    /// Names, SKUs and units have length caps.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Negative prices, commissions or opening stock.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative quantity on a line or movement.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Unknown enum spelling (direction, stock policy).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            item: "Pomade".to_string(),
            available: Quantity::from_units(2),
            requested: Quantity::from_milli(5_500),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Pomade: available 2, requested 5.5"
        );
    }

    #[test]
    fn test_access_denied_message() {
        let err = CoreError::AccessDenied {
            role: Role::Operator,
            operation: Operation::Delete,
            table: Table::Barbers,
        };
        assert_eq!(err.to_string(), "Role operator may not delete barbers");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: name is required");
    }
}
