//! # Clipper Back-Office
//!
//! Command-line back-office for the barbershop: catalog, stock, checkout
//! and period reports over a local SQLite database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Back-Office CLI                                  │
//! │                                                                         │
//! │  env + flags ──► BackofficeConfig ──► Database ──► Session(--as)       │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │                                             commands::* ──► JSON stdout │
//! │                                                       │                 │
//! │                                   ApiError {code, message} ──► stderr   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr (`RUST_LOG`, default `info`) so stdout stays parseable.

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use clipper_core::{MovementDirection, Quantity};
use clipper_db::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{catalog, emit, inventory, report, sale, status};
use crate::config::BackofficeConfig;
use crate::error::ApiError;

#[derive(Debug, Parser)]
#[command(name = "backoffice", version, about = "Barbershop back-office")]
struct Cli {
    /// SQLite database file (overrides CLIPPER_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Acting profile id (overrides CLIPPER_PROFILE_ID)
    #[arg(long = "as", value_name = "PROFILE_ID", global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Database health, migrations and the acting profile
    Status,

    /// Barbers, services and payment methods
    Catalog {
        /// Include inactive rows
        #[arg(long)]
        all: bool,
    },

    /// Stock on hand and manual movements
    #[command(subcommand)]
    Inventory(InventoryCommand),

    /// Register a sale from a JSON checkout request
    Checkout {
        /// Request file; stdin when omitted or `-`
        file: Option<PathBuf>,
    },

    /// Look up registered sales
    #[command(subcommand)]
    Transactions(TransactionsCommand),

    /// Revenue and commission summary
    Report {
        #[command(flatten)]
        range: DateRange,
    },
}

#[derive(Debug, Subcommand)]
enum InventoryCommand {
    /// All items
    List,

    /// Items at or below their threshold
    LowStock,

    /// Create an item with its opening stock
    Add {
        name: String,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        /// Opening stock, e.g. 12 or 2.5
        #[arg(long, default_value = "0", value_parser = parse_quantity)]
        quantity: Quantity,
        /// Low-stock threshold
        #[arg(long, value_parser = parse_quantity)]
        min: Option<Quantity>,
    },

    /// Record a stock movement
    Move {
        item_id: String,
        /// `in` or `out`
        direction: MovementDirection,
        #[arg(value_parser = parse_quantity)]
        quantity: Quantity,
        #[arg(long)]
        notes: Option<String>,
    },

    /// An item with its movements, newest first
    History { item_id: String },
}

#[derive(Debug, Subcommand)]
enum TransactionsCommand {
    /// One transaction with its lines and stock movements
    Show { id: String },

    /// Transactions in a date range
    List {
        #[command(flatten)]
        range: DateRange,
        #[arg(long)]
        barber: Option<String>,
    },
}

/// Inclusive day range; defaults to today (UTC).
#[derive(Debug, clap::Args)]
struct DateRange {
    /// First day, YYYY-MM-DD
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl DateRange {
    fn period(&self) -> Result<clipper_core::report::ReportPeriod, ApiError> {
        report::period_from_dates(self.from, self.to, Utc::now().date_naive())
    }
}

fn parse_quantity(input: &str) -> Result<Quantity, String> {
    Quantity::parse(input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{}", err.to_json());
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), ApiError> {
    let config = BackofficeConfig::from_env()?.with_overrides(cli.database, cli.profile);
    info!(
        database = %config.database_path,
        policy = %config.sale_stock_policy,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()).await?;
    let result = dispatch(&db, &config, cli.command).await;
    db.close().await;
    result
}

async fn dispatch(db: &Database, config: &BackofficeConfig, command: Command) -> Result<(), ApiError> {
    // `status` is the one command that runs without an acting profile.
    let session = match (&command, config.profile_id.as_deref()) {
        (Command::Status, None) => {
            return emit(&status::status(db, &config.database_path, None).await?);
        }
        _ => db.session(config.require_profile()?).await?,
    };

    match command {
        Command::Status => {
            let profile_id = session.actor().profile_id.as_str();
            emit(&status::status(db, &config.database_path, Some(profile_id)).await?)
        }
        Command::Catalog { all } => emit(&catalog::catalog(&session, all).await?),
        Command::Inventory(cmd) => match cmd {
            InventoryCommand::List => emit(&inventory::list(&session).await?),
            InventoryCommand::LowStock => emit(&inventory::low_stock(&session).await?),
            InventoryCommand::Add {
                name,
                sku,
                unit,
                quantity,
                min,
            } => {
                let input = inventory::AddItem {
                    name,
                    sku,
                    unit,
                    quantity,
                    min_quantity: min,
                };
                emit(&inventory::add(&session, input).await?)
            }
            InventoryCommand::Move {
                item_id,
                direction,
                quantity,
                notes,
            } => emit(&inventory::move_stock(&session, &item_id, direction, quantity, notes).await?),
            InventoryCommand::History { item_id } => {
                emit(&inventory::history(&session, &item_id).await?)
            }
        },
        Command::Checkout { file } => {
            let draft = sale::read_draft(file.as_deref()).await?;
            emit(&sale::checkout(&session, &draft).await?)
        }
        Command::Transactions(cmd) => match cmd {
            TransactionsCommand::Show { id } => emit(&sale::show(&session, &id).await?),
            TransactionsCommand::List { range, barber } => {
                let period = range.period()?;
                emit(&sale::list(&session, &period, barber.as_deref()).await?)
            }
        },
        Command::Report { range } => {
            let period = range.period()?;
            emit(&report::summary(&session, &period).await?)
        }
    }
}
