//! # Repository Module
//!
//! Plain data access for every table. Repositories perform no
//! authorization; callers acting for a profile go through
//! [`crate::session::Session`].
//!
//! ```text
//!   Session::checkout(draft)
//!       │  policy::authorize(...)
//!       ▼
//!   TransactionRepository::checkout(draft, created_by)
//!       │  BEGIN IMMEDIATE
//!       │  header → lines → stock decrements → movements
//!       │  COMMIT (or ROLLBACK on any error)
//!       ▼
//!   SQLite
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProfileRepository`] - staff profiles and roles
//! - [`BarberRepository`], [`ServiceRepository`], [`PaymentMethodRepository`] - catalog
//! - [`InventoryRepository`] - items and manual stock movements
//! - [`TransactionRepository`] - checkout and sale history
//! - [`ReportRepository`] - revenue and commission summaries

pub mod barber;
pub mod inventory;
pub mod payment_method;
pub mod profile;
pub mod report;
pub mod service;
pub mod transaction;

pub use barber::BarberRepository;
pub use inventory::{InventoryRepository, NewInventoryItem};
pub use payment_method::PaymentMethodRepository;
pub use profile::ProfileRepository;
pub use report::ReportRepository;
pub use service::{NewService, ServiceRepository};
pub use transaction::TransactionRepository;

use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::error::DbResult;

/// Generates a new row ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Starts a transaction holding SQLite's write lock from `BEGIN`.
///
/// A deferred transaction that reads before it writes cannot wait for a
/// concurrent writer when it upgrades; it fails with `SQLITE_BUSY`.
/// Taking the lock up front makes it wait on the busy timeout instead.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
