//! # clipper-db: Database Layer for the Clipper Back-Office
//!
//! SQLite persistence for the barbershop back-office, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Back-Office Data Flow                            │
//! │                                                                         │
//! │  backoffice CLI (checkout, inventory move, report, ...)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    clipper-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │   Session    │──►│ Repositories  │──►│    Database      │  │   │
//! │  │   │ (authorize)  │   │ checkout      │   │    (pool.rs)     │  │   │
//! │  │   │              │   │ record_move   │   │    Migrations    │  │   │
//! │  │   └──────────────┘   └───────────────┘   └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (./clipper.db by default)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-table data access, checkout, stock movements
//! - [`session`] - Authorizing facade for an acting profile
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clipper_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./clipper.db")).await?;
//! let session = db.session(&profile_id).await?;
//!
//! let receipt = session.checkout(&draft).await?;
//! let low = session.low_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use session::Session;

pub use repository::{
    BarberRepository, InventoryRepository, NewInventoryItem, NewService, PaymentMethodRepository,
    ProfileRepository, ReportRepository, ServiceRepository, TransactionRepository,
};
