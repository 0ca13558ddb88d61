//! # Validation Module
//!
//! Field validators for catalog and inventory input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Screens / CLI                                                │
//! │  ├── Deserialization of the request                                    │
//! │  └── THIS MODULE: field rules (names, SKU, amounts)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Business rules (line_item, inventory, policy)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (line kind ⇔ references)                        │
//! │  ├── UNIQUE constraints (SKU, payment method name)                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transaction-item classifier in [`crate::line_item`] deliberately does
//! not call these; checkout applies them as a separate caller-side step.

use crate::error::ValidationError;
use crate::quantity::Quantity;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (barber, service, payment method, item).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 120 characters
///
/// ```rust
/// use clipper_core::validation::validate_name;
///
/// assert!(validate_name("name", "Skin Fade").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 120 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an inventory unit label ("un", "ml", "kg").
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if unit.len() > 16 {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: 16,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement or line quantity: must be strictly positive.
pub fn validate_positive_quantity(qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level or threshold: must not be negative.
pub fn validate_stock_level(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price or commission in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (courtesy services)
///
/// ```rust
/// use clipper_core::validation::validate_cents;
///
/// assert!(validate_cents("price", 3500).is_ok());
/// assert!(validate_cents("price", 0).is_ok());
/// assert!(validate_cents("price", -100).is_err());
/// ```
pub fn validate_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Ids are UUID v4 strings. Checked where an id arrives from outside the
/// workspace (environment, command line) rather than from a row.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected a UUID".to_string(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
