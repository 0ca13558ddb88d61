//! Shared fixtures for database tests.

use std::path::Path;

use clipper_core::{Quantity, Role, SaleStockPolicy};

use crate::repository::{NewInventoryItem, NewService};
use crate::{Database, DbConfig};

/// An in-memory database with one row of everything a checkout needs.
///
/// Stock: pomade 10 un (threshold 3), beard oil 5 un (no threshold).
pub struct Fixture {
    pub db: Database,
    pub admin_id: String,
    pub operator_id: String,
    pub barber_id: String,
    pub haircut_id: String,
    pub cash_id: String,
    pub pomade_id: String,
    pub oil_id: String,
}

pub async fn fixture() -> Fixture {
    fixture_with_policy(SaleStockPolicy::Guarded).await
}

pub async fn fixture_with_policy(policy: SaleStockPolicy) -> Fixture {
    seeded(DbConfig::in_memory().sale_stock_policy(policy)).await
}

/// The same rows in a WAL database file served by several connections,
/// for tests where writers actually contend.
pub async fn file_fixture(path: &Path) -> Fixture {
    seeded(DbConfig::new(path).max_connections(8)).await
}

async fn seeded(config: DbConfig) -> Fixture {
    let db = Database::new(config).await.unwrap();

    let admin = db.profiles().create("Owner", None, Role::Admin).await.unwrap();
    let operator = db
        .profiles()
        .create("Front Desk", None, Role::Operator)
        .await
        .unwrap();

    let barber = db.barbers().create("Ana", None).await.unwrap();
    let haircut = db
        .services()
        .create(&NewService {
            name: "Haircut".to_string(),
            price_cents: 3500,
            commission_cents: 1200,
            duration_minutes: Some(30),
        })
        .await
        .unwrap();
    let cash = db.payment_methods().create("Cash").await.unwrap();

    let pomade = db
        .inventory()
        .create(
            &NewInventoryItem::new("Pomade", Quantity::from_units(10))
                .sku("POM-100")
                .min_quantity(Quantity::from_units(3)),
        )
        .await
        .unwrap();
    let oil = db
        .inventory()
        .create(&NewInventoryItem::new("Beard Oil", Quantity::from_units(5)))
        .await
        .unwrap();

    Fixture {
        db,
        admin_id: admin.id,
        operator_id: operator.id,
        barber_id: barber.id,
        haircut_id: haircut.id,
        cash_id: cash.id,
        pomade_id: pomade.id,
        oil_id: oil.id,
    }
}
