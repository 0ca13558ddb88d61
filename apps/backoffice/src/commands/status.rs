//! Database status.

use clipper_core::{Profile, SaleStockPolicy};
use clipper_db::Database;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub database_path: String,
    pub healthy: bool,
    pub migrations_applied: usize,
    pub migrations_total: usize,
    pub sale_stock_policy: SaleStockPolicy,
    /// Present when an acting profile was given.
    pub profile: Option<Profile>,
}

/// Reports health and migration state. Works without an acting profile so
/// a fresh install can be checked before anyone is seeded.
pub async fn status(
    db: &Database,
    database_path: &str,
    profile_id: Option<&str>,
) -> Result<StatusView, ApiError> {
    let (migrations_total, migrations_applied) = db.migration_status().await?;

    let profile = match profile_id {
        Some(id) => Some(db.session(id).await?.me().await?),
        None => None,
    };

    Ok(StatusView {
        database_path: database_path.to_string(),
        healthy: db.health_check().await,
        migrations_applied,
        migrations_total,
        sale_stock_policy: db.sale_stock_policy(),
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::shop;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_status_without_profile() {
        let shop = shop().await;
        let view = status(&shop.db, ":memory:", None).await.unwrap();

        assert!(view.healthy);
        assert_eq!(view.migrations_applied, view.migrations_total);
        assert_eq!(view.sale_stock_policy, SaleStockPolicy::Guarded);
        assert!(view.profile.is_none());
    }

    #[tokio::test]
    async fn test_status_with_profiles() {
        let shop = shop().await;
        let operator_id = shop.operator.actor().profile_id.clone();

        let view = status(&shop.db, ":memory:", Some(&operator_id)).await.unwrap();
        assert_eq!(view.profile.unwrap().full_name, "Front Desk");

        let err = status(&shop.db, ":memory:", Some("ghost")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }
}
