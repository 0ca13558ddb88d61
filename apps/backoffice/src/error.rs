//! # API Error Type
//!
//! Unified error type for back-office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Back-Office CLI                    │
//! │                                                                         │
//! │  backoffice checkout sale.json                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::CheckViolation("...") ─┐          │  │
//! │  │         │                                            │          │  │
//! │  │         ▼                                            ▼          │  │
//! │  │  Rule/Policy Error? ── CoreError::AccessDenied ──── ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ── JSON on stdout ────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: {"code":"INSUFFICIENT_STOCK","message":"..."}   exit 1        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clipper_core::CoreError;
use clipper_db::DbError;
use serde::Serialize;

use crate::config::ConfigError;

/// Error printed by a failing command.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Pomade: available 2, requested 5"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced row does not exist
    NotFound,

    /// Input validation failed, including malformed request files
    ValidationError,

    /// A stock decrement would go below zero
    InsufficientStock,

    /// The acting role may not perform the operation
    Forbidden,

    /// No acting profile, or an unknown one
    Unauthenticated,

    /// Unique, foreign key or check constraint rejected the write
    ConstraintViolation,

    /// Database operation failed
    DatabaseError,

    /// Bad environment or flags
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Exit status for the process.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::ConfigError => 2,
            _ => 1,
        }
    }

    /// Single-line JSON for stderr.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!(r#"{{"code":"INTERNAL","message":"{}"}}"#, self.message))
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ConstraintViolation,
                match value {
                    Some(value) => format!("{} '{}' already exists", field, value),
                    None => format!("{} already exists", field),
                },
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::new(
                    ErrorCode::ConstraintViolation,
                    "Invalid reference, or the row is still referenced by sales",
                )
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ConstraintViolation, "Row rejected by a table constraint")
            }
            DbError::Business(core) => core.into(),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::AccessDenied { .. } => ApiError::new(ErrorCode::Forbidden, message),
            CoreError::Unauthenticated(_) => ApiError::new(ErrorCode::Unauthenticated, message),
            CoreError::LineItemMismatch { .. }
            | CoreError::EmptyTransaction
            | CoreError::TooManyLines { .. } => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingRequired(name) if name == "CLIPPER_PROFILE_ID" => ApiError::new(
                ErrorCode::Unauthenticated,
                "No acting profile: pass --as <PROFILE_ID> or set CLIPPER_PROFILE_ID",
            ),
            other => ApiError::new(ErrorCode::ConfigError, other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::validation(format!("Malformed JSON: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use clipper_core::{Operation, Quantity, Role, Table, ValidationError};

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::new(ErrorCode::InsufficientStock, "nope");
        assert_eq!(err.to_json(), r#"{"code":"INSUFFICIENT_STOCK","message":"nope"}"#);
    }

    #[test]
    fn test_business_errors_keep_their_meaning() {
        let stock: ApiError = DbError::Business(CoreError::InsufficientStock {
            item: "Pomade".to_string(),
            available: Quantity::from_units(2),
            requested: Quantity::from_units(5),
        })
        .into();
        assert_eq!(stock.code, ErrorCode::InsufficientStock);
        assert!(stock.message.contains("Pomade"));

        let denied: ApiError = CoreError::AccessDenied {
            role: Role::Operator,
            operation: Operation::Delete,
            table: Table::Transactions,
        }
        .into();
        assert_eq!(denied.code, ErrorCode::Forbidden);

        let unknown: ApiError = DbError::Business(CoreError::Unauthenticated("x".into())).into();
        assert_eq!(unknown.code, ErrorCode::Unauthenticated);

        let empty: ApiError = CoreError::EmptyTransaction.into();
        assert_eq!(empty.code, ErrorCode::ValidationError);

        let invalid: ApiError = DbError::from(ValidationError::Required {
            field: "barber".to_string(),
        })
        .into();
        assert_eq!(invalid.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_constraint_and_infra_errors() {
        let dup: ApiError = DbError::duplicate("sku", "POM-100").into();
        assert_eq!(dup.code, ErrorCode::ConstraintViolation);
        assert_eq!(dup.message, "sku 'POM-100' already exists");

        let unnamed: ApiError = DbError::UniqueViolation {
            field: "profiles.email".to_string(),
            value: None,
        }
        .into();
        assert_eq!(unnamed.message, "profiles.email already exists");

        let check: ApiError = DbError::CheckViolation {
            message: "CHECK constraint failed".to_string(),
        }
        .into();
        assert_eq!(check.code, ErrorCode::ConstraintViolation);

        let query: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(query.code, ErrorCode::DatabaseError);
        assert!(!query.message.contains("disk"));

        let missing: ApiError = DbError::not_found("Barber", "b-1").into();
        assert_eq!(missing.code, ErrorCode::NotFound);
        assert_eq!(missing.message, "Barber not found: b-1");
    }

    #[test]
    fn test_config_errors() {
        let no_profile: ApiError =
            ConfigError::MissingRequired("CLIPPER_PROFILE_ID".to_string()).into();
        assert_eq!(no_profile.code, ErrorCode::Unauthenticated);

        let bad: ApiError = ConfigError::InvalidValue("CLIPPER_MAX_CONNECTIONS".to_string()).into();
        assert_eq!(bad.code, ErrorCode::ConfigError);
        assert_eq!(bad.exit_code(), 2);
    }

    #[test]
    fn test_malformed_json() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
