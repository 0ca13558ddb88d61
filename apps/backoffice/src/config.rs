//! Back-office configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! Command-line flags override what the environment provides.

use clipper_core::validation::validate_uuid;
use clipper_core::SaleStockPolicy;
use clipper_db::DbConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Back-office configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackofficeConfig {
    /// SQLite database file
    pub database_path: String,

    /// Acting profile (overridable with `--as`)
    pub profile_id: Option<String>,

    /// How checkout treats product lines larger than the stock on hand
    pub sale_stock_policy: SaleStockPolicy,

    /// Pool size
    pub max_connections: u32,
}

impl BackofficeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = BackofficeConfig {
            database_path: lookup("CLIPPER_DATABASE_PATH")
                .unwrap_or_else(|| "./clipper.db".to_string()),

            profile_id: lookup("CLIPPER_PROFILE_ID").filter(|id| !id.trim().is_empty()),

            sale_stock_policy: lookup("CLIPPER_SALE_STOCK_POLICY")
                .unwrap_or_else(|| "guarded".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CLIPPER_SALE_STOCK_POLICY".to_string()))?,

            max_connections: lookup("CLIPPER_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CLIPPER_MAX_CONNECTIONS".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("CLIPPER_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, database: Option<String>, profile_id: Option<String>) -> Self {
        if let Some(path) = database {
            self.database_path = path;
        }
        if let Some(id) = profile_id {
            self.profile_id = Some(id);
        }
        self
    }

    /// The acting profile, required by every command except `status`.
    pub fn require_profile(&self) -> Result<&str, ConfigError> {
        let id = self
            .profile_id
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| ConfigError::MissingRequired("CLIPPER_PROFILE_ID".to_string()))?;

        validate_uuid("profile id", id)
            .map_err(|_| ConfigError::InvalidValue("CLIPPER_PROFILE_ID".to_string()))?;
        Ok(id)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .sale_stock_policy(self.sale_stock_policy)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
