//! # Report Repository
//!
//! Loads a period's transactions and lines and hands them to
//! [`clipper_core::report::summarize`].

use clipper_core::report::{summarize, ReportPeriod, RevenueReport};
use clipper_core::{Transaction, TransactionItem};
use sqlx::SqlitePool;
use tracing::debug;

use super::transaction::SELECT_ITEM_LINE;
use crate::error::DbResult;

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Revenue and commission summary for the period.
    pub async fn summary(&self, period: &ReportPeriod) -> DbResult<RevenueReport> {
        debug!(from = %period.from, to = %period.to, "Building revenue report");

        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, barber_id, total_cents, payment_method_id, notes, created_by, created_at
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(period.from)
        .bind(period.to)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            r#"{SELECT_ITEM_LINE}
            WHERE transaction_id IN (
                SELECT id FROM transactions WHERE created_at >= ?1 AND created_at < ?2
            )"#
        ))
        .bind(period.from)
        .bind(period.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(summarize(&transactions, &items))
    }
}
