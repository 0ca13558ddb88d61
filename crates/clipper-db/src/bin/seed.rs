//! # Seed Data Generator
//!
//! Populates a database with a small barbershop for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p clipper-db --bin seed
//!
//! # Specify database path
//! cargo run -p clipper-db --bin seed -- --db ./data/clipper.db
//! ```
//!
//! ## Generated Data
//! - Two profiles: an admin and an operator (ids printed at the end)
//! - Barbers, services with commissions, payment methods
//! - Inventory items with opening stock and low-stock thresholds

use clipper_core::{Quantity, Role};
use clipper_db::{Database, DbConfig, NewInventoryItem, NewService};
use std::env;

const BARBERS: &[(&str, Option<&str>)] = &[
    ("Ana Souza", Some("555-0101")),
    ("Bruno Lima", Some("555-0102")),
    ("Carla Dias", None),
];

/// (name, price cents, commission cents, minutes)
const SERVICES: &[(&str, i64, i64, i64)] = &[
    ("Haircut", 3500, 1200, 30),
    ("Beard Trim", 2000, 700, 20),
    ("Haircut + Beard", 5000, 1800, 50),
    ("Skin Fade", 4000, 1400, 40),
    ("Hot Towel Shave", 3000, 1000, 30),
];

const PAYMENT_METHODS: &[&str] = &["Cash", "Credit Card", "Debit Card", "Pix"];

/// (name, sku, unit, opening stock milli, threshold milli)
const ITEMS: &[(&str, &str, &str, i64, i64)] = &[
    ("Matte Pomade 100g", "POM-100", "un", 12_000, 3_000),
    ("Beard Oil 30ml", "OIL-30", "un", 8_000, 2_000),
    ("Shampoo Refill", "SHA-REF", "l", 4_500, 1_000),
    ("Aftershave Balm", "BALM-50", "un", 2_000, 2_000),
    ("Hair Gel 250g", "GEL-250", "un", 15_000, 4_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./clipper_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Clipper Back-Office Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./clipper_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Clipper Back-Office Seed Data Generator");
    println!("==========================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.profiles().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} profiles", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = db
        .profiles()
        .create("Shop Owner", Some("owner@clipper.local"), Role::Admin)
        .await?;
    let operator = db
        .profiles()
        .create("Front Desk", Some("desk@clipper.local"), Role::Operator)
        .await?;
    println!("✓ Created 2 profiles");

    for (name, phone) in BARBERS {
        db.barbers().create(name, *phone).await?;
    }
    println!("✓ Created {} barbers", BARBERS.len());

    for (name, price_cents, commission_cents, minutes) in SERVICES {
        db.services()
            .create(&NewService {
                name: name.to_string(),
                price_cents: *price_cents,
                commission_cents: *commission_cents,
                duration_minutes: Some(*minutes),
            })
            .await?;
    }
    println!("✓ Created {} services", SERVICES.len());

    for name in PAYMENT_METHODS {
        db.payment_methods().create(name).await?;
    }
    println!("✓ Created {} payment methods", PAYMENT_METHODS.len());

    for (name, sku, unit, opening, threshold) in ITEMS {
        let input = NewInventoryItem::new(*name, Quantity::from_milli(*opening))
            .sku(*sku)
            .unit(*unit)
            .min_quantity(Quantity::from_milli(*threshold));

        if let Err(e) = db.inventory().create(&input).await {
            eprintln!("Failed to insert {}: {}", sku, e);
        }
    }
    println!("✓ Created {} inventory items", ITEMS.len());

    let low = db.inventory().list_low_stock().await?;
    println!("  Low stock right away: {}", low.len());

    println!();
    println!("🎉 Seed complete!");
    println!();
    println!("Profiles:");
    println!("  admin     {}", admin.id);
    println!("  operator  {}", operator.id);
    println!();
    println!("Try: CLIPPER_PROFILE_ID={} backoffice --database {} status", operator.id, db_path);

    db.close().await;

    Ok(())
}
