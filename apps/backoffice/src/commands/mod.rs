//! # Back-Office Commands
//!
//! One function per CLI subcommand. Each takes the state it needs (a
//! [`Session`](clipper_db::Session) for everything but `status`) and returns
//! a serializable value that `main` prints as JSON.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports, JSON output)
//! ├── status.rs     ◄─── Database health, migrations, acting profile
//! ├── catalog.rs    ◄─── Barbers, services, payment methods
//! ├── inventory.rs  ◄─── Stock list, low stock, add, move, history
//! ├── sale.rs       ◄─── Checkout, transaction lookup and listing
//! └── report.rs     ◄─── Period revenue/commission summary
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  $ backoffice --as <profile> inventory move <item> out 2                │
//! │         │                                                               │
//! │         ▼ (clap parses, main opens Database + Session)                  │
//! │  inventory::move_stock(&session, ...) -> Result<InventoryItem, ApiError>│
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stdout: { "id": "...", "quantity_milli": 8000, ... }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod inventory;
pub mod report;
pub mod sale;
pub mod status;

use serde::Serialize;

use crate::error::ApiError;

/// Prints a command result as pretty JSON on stdout.
pub fn emit<T: Serialize>(value: &T) -> Result<(), ApiError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::internal(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! A small shop in an in-memory database, shared by command tests.

    use clipper_core::{Quantity, Role};
    use clipper_db::{Database, DbConfig, NewInventoryItem, NewService, Session};

    pub struct Shop {
        pub db: Database,
        pub admin: Session,
        pub operator: Session,
        pub barber_id: String,
        pub haircut_id: String,
        pub cash_id: String,
        pub pomade_id: String,
    }

    pub async fn shop() -> Shop {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

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
                &NewInventoryItem::new("Pomade", Quantity::from_units(4))
                    .sku("POM-100")
                    .min_quantity(Quantity::from_units(3)),
            )
            .await
            .unwrap();

        Shop {
            admin: db.session(&admin.id).await.unwrap(),
            operator: db.session(&operator.id).await.unwrap(),
            db,
            barber_id: barber.id,
            haircut_id: haircut.id,
            cash_id: cash.id,
            pomade_id: pomade.id,
        }
    }
}
