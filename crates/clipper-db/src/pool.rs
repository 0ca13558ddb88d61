//! # Shop Database
//!
//! Opening the SQLite file and handing out repositories and sessions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Opening the Shop Database                          │
//! │                                                                         │
//! │  DbConfig::new(path) ← pool settings, sale stock policy                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← create pool + run migrations            │
//! │       │                                                                 │
//! │       ├──► db.inventory(), db.transactions(), ...   (unchecked access)  │
//! │       │                                                                 │
//! │       └──► db.session(profile_id) ──► Session       (authorized access) │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so report reads do not
//! block the counter registering sales.

use clipper_core::{Actor, CoreError, SaleStockPolicy};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{
    BarberRepository, InventoryRepository, PaymentMethodRepository, ProfileRepository,
    ReportRepository, ServiceRepository, TransactionRepository,
};
use crate::session::Session;

// =============================================================================
// Configuration
// =============================================================================

/// How to open the shop database.
///
/// ```rust,ignore
/// let config = DbConfig::new("./clipper.db")
///     .max_connections(4)
///     .sale_stock_policy(SaleStockPolicy::AllowNegative);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file; created on first open. `:memory:` for a throwaway database.
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long to wait for a free connection.
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    /// How long a writer waits for another connection's write lock.
    pub busy_timeout: Duration,
    /// Apply pending migrations while opening.
    pub run_migrations: bool,
    /// Handed to [`TransactionRepository`]; see [`SaleStockPolicy`].
    pub sale_stock_policy: SaleStockPolicy,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
            sale_stock_policy: SaleStockPolicy::Guarded,
        }
    }

    /// A private, migrated, empty database for tests.
    ///
    /// An in-memory SQLite database lives and dies with its connection,
    /// so the pool is pinned to exactly one.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ..DbConfig::new(":memory:")
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn sale_stock_policy(mut self, policy: SaleStockPolicy) -> Self {
        self.sale_stock_policy = policy;
        self
    }

    /// WAL journal, NORMAL sync, foreign keys on (SQLite defaults them off;
    /// the schema's cascades and references depend on them). Writers wait
    /// up to `busy_timeout` for the write lock.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        Ok(SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the shop database: repositories for trusted callers,
/// [`Session`]s for everyone else.
///
/// Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    sale_stock_policy: SaleStockPolicy,
}

impl Database {
    /// Opens (creating if needed) the database and applies migrations
    /// unless `config.run_migrations` is off.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            policy = %config.sale_stock_policy,
            "Opening shop database"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database {
            pool,
            sale_stock_policy: config.sale_stock_policy,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns `(total, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The stock policy checkout applies to product lines.
    pub fn sale_stock_policy(&self) -> SaleStockPolicy {
        self.sale_stock_policy
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.pool.clone())
    }

    pub fn barbers(&self) -> BarberRepository {
        BarberRepository::new(self.pool.clone())
    }

    pub fn services(&self) -> ServiceRepository {
        ServiceRepository::new(self.pool.clone())
    }

    pub fn payment_methods(&self) -> PaymentMethodRepository {
        PaymentMethodRepository::new(self.pool.clone())
    }

    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone())
    }

    /// Returns the transaction repository, bound to the configured
    /// sale stock policy.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone(), self.sale_stock_policy)
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Opens an authorizing session for the given profile.
    ///
    /// ## Errors
    /// `CoreError::Unauthenticated` when the profile does not exist.
    pub async fn session(&self, profile_id: &str) -> DbResult<Session> {
        let Some(role) = self.profiles().role_of(profile_id).await? else {
            warn!(profile_id = %profile_id, "Session requested for unknown profile");
            return Err(CoreError::Unauthenticated(profile_id.to_string()).into());
        };

        debug!(profile_id = %profile_id, role = %role, "Session opened");
        Ok(Session::new(self.clone(), Actor::new(profile_id, role)))
    }

    /// Waits for in-flight queries, then closes every connection. Later
    /// calls on any clone fail.
    pub async fn close(&self) {
        debug!("Closing shop database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
