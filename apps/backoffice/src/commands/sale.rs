//! # Sale Commands
//!
//! Checkout and transaction lookup.
//!
//! ## Checkout Request
//! A JSON [`CheckoutDraft`] read from a file, or from stdin when the path is
//! omitted or `-`:
//! ```json
//! {
//!   "barber_id": "…",
//!   "payment_method_id": "…",
//!   "notes": "walk-in",
//!   "lines": [
//!     {"kind": "SERVICE", "service_id": "…", "price_cents": 3500,
//!      "quantity_milli": 1000, "commission_cents": 1200},
//!     {"kind": "PRODUCT", "inventory_item_id": "…", "price_cents": 2500,
//!      "quantity_milli": 2000}
//!   ]
//! }
//! ```
//! The whole checkout commits or nothing does; the receipt printed on
//! success includes the stock movements the product lines produced.

use std::path::Path;

use clipper_core::report::ReportPeriod;
use clipper_core::{CheckoutDraft, CheckoutReceipt, Transaction};
use clipper_db::Session;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::ApiError;

/// Reads a checkout request from `source`, or stdin for `None` / `-`.
pub async fn read_draft(source: Option<&Path>) -> Result<CheckoutDraft, ApiError> {
    let raw = match source {
        Some(path) if path != Path::new("-") => {
            debug!(path = %path.display(), "Reading checkout request");
            tokio::fs::read_to_string(path).await.map_err(|e| {
                ApiError::validation(format!("Cannot read {}: {}", path.display(), e))
            })?
        }
        _ => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .map_err(|e| ApiError::internal(format!("Cannot read stdin: {}", e)))?;
            raw
        }
    };

    parse_draft(&raw)
}

pub fn parse_draft(raw: &str) -> Result<CheckoutDraft, ApiError> {
    Ok(serde_json::from_str(raw)?)
}

pub async fn checkout(session: &Session, draft: &CheckoutDraft) -> Result<CheckoutReceipt, ApiError> {
    Ok(session.checkout(draft).await?)
}

pub async fn show(session: &Session, id: &str) -> Result<CheckoutReceipt, ApiError> {
    Ok(session.get_transaction(id).await?)
}

/// Transactions in the period, optionally for one barber.
pub async fn list(
    session: &Session,
    period: &ReportPeriod,
    barber_id: Option<&str>,
) -> Result<Vec<Transaction>, ApiError> {
    let transactions = match barber_id {
        Some(barber_id) => session.list_barber_transactions(barber_id, period).await?,
        None => session.list_transactions(period).await?,
    };
    Ok(transactions)
}
