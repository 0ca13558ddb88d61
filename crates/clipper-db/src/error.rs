//! # Database Errors
//!
//! What can go wrong between a repository call and SQLite, and how
//! constraint failures are told apart.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (rules, access policy)  │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← constraint classification, Business wrapper   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (backoffice app) ← stable code + message                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clipper_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with that id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate SKU, payment method name, email).
    ///
    /// SQLite names only the column; the write that knows the offending
    /// value attaches it with [`DbError::with_duplicate_value`].
    #[error("Duplicate {field}{}", duplicate_suffix(.value))]
    UniqueViolation { field: String, value: Option<String> },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A transaction references a missing barber or payment method
    /// - Deleting an inventory item or service that past sales reference
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A transaction line whose kind disagrees with its references
    /// - Non-positive quantities on lines or movements
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Business rule or access policy rejected the operation.
    #[error(transparent)]
    Business(#[from] CoreError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other SQLite failure.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Timed out waiting for a connection.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: Some(value.into()),
        }
    }

    /// Fills in the value of a unique violation; other errors pass through.
    pub fn with_duplicate_value(self, value: Option<&str>) -> Self {
        match self {
            DbError::UniqueViolation { field, value: None } => DbError::UniqueViolation {
                field,
                value: value.map(String::from),
            },
            other => other,
        }
    }

    /// The wrapped business error, if any.
    pub fn as_business(&self) -> Option<&CoreError> {
        match self {
            DbError::Business(err) => Some(err),
            _ => None,
        }
    }
}

impl From<clipper_core::ValidationError> for DbError {
    fn from(err: clipper_core::ValidationError) -> Self {
        DbError::Business(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => classify_constraint(db_err.message()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Maps a SQLite error message onto a constraint variant.
///
/// SQLite reports constraints as:
/// - `UNIQUE constraint failed: <table>.<column>`
/// - `FOREIGN KEY constraint failed`
/// - `CHECK constraint failed: <expr>`
fn classify_constraint(msg: &str) -> DbError {
    if let Some(field) = msg.split("UNIQUE constraint failed: ").nth(1) {
        DbError::UniqueViolation {
            field: field.to_string(),
            value: None,
        }
    } else if msg.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation {
            message: msg.to_string(),
        }
    } else if msg.contains("CHECK constraint failed") {
        DbError::CheckViolation {
            message: msg.to_string(),
        }
    } else {
        DbError::QueryFailed(msg.to_string())
    }
}

fn duplicate_suffix(value: &Option<String>) -> String {
    match value {
        Some(value) => format!(": '{}' already exists", value),
        None => String::new(),
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
