//! # Reports
//!
//! Revenue and commission aggregation behind the dashboard and the reports
//! screen. The database layer loads the transactions of a period together
//! with their items; [`summarize`] folds them into a [`RevenueReport`].
//!
//! ```text
//!   transactions ──┬──► revenue, ticket count, average ticket
//!                  ├──► per barber   (revenue, commission, tickets)
//!                  └──► per payment method (revenue, tickets)
//!   items ─────────┬──► service revenue vs product revenue
//!                  └──► commission (commission per unit × quantity)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{LineKind, Transaction, TransactionItem};

/// Half-open reporting interval `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportPeriod {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
}

impl ReportPeriod {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ValidationError> {
        if to <= from {
            return Err(ValidationError::InvalidFormat {
                field: "period".to_string(),
                reason: "end must be after start".to_string(),
            });
        }
        Ok(ReportPeriod { from, to })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at < self.to
    }
}

/// Totals for one barber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BarberSummary {
    pub barber_id: String,
    pub transactions: i64,
    pub revenue_cents: i64,
    pub commission_cents: i64,
}

/// Totals for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethodSummary {
    pub payment_method_id: String,
    pub transactions: i64,
    pub revenue_cents: i64,
}

/// Aggregated figures for a set of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueReport {
    pub transactions: i64,
    pub revenue_cents: i64,
    pub average_ticket_cents: i64,
    pub service_revenue_cents: i64,
    pub product_revenue_cents: i64,
    pub commission_cents: i64,
    /// Sorted by revenue, highest first.
    pub by_barber: Vec<BarberSummary>,
    /// Sorted by revenue, highest first.
    pub by_payment_method: Vec<PaymentMethodSummary>,
}

impl RevenueReport {
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }

    #[inline]
    pub fn commission(&self) -> Money {
        Money::from_cents(self.commission_cents)
    }
}

/// Folds transactions and their items into a report. Sums clamp at the
/// `i64` range instead of wrapping.
///
/// Items whose transaction is not in `transactions` are ignored, so callers
/// may pass a superset.
pub fn summarize(transactions: &[Transaction], items: &[TransactionItem]) -> RevenueReport {
    let included: HashSet<&str> = transactions.iter().map(|t| t.id.as_str()).collect();
    let barber_of: BTreeMap<&str, &str> = transactions
        .iter()
        .map(|t| (t.id.as_str(), t.barber_id.as_str()))
        .collect();

    let mut barbers: BTreeMap<&str, BarberSummary> = BTreeMap::new();
    let mut methods: BTreeMap<&str, PaymentMethodSummary> = BTreeMap::new();
    let mut revenue = Money::zero();

    for tx in transactions {
        revenue = revenue.saturating_add(tx.total());

        let barber = barbers.entry(&tx.barber_id).or_insert_with(|| BarberSummary {
            barber_id: tx.barber_id.clone(),
            transactions: 0,
            revenue_cents: 0,
            commission_cents: 0,
        });
        barber.transactions += 1;
        barber.revenue_cents = barber.revenue_cents.saturating_add(tx.total_cents);

        let method = methods
            .entry(&tx.payment_method_id)
            .or_insert_with(|| PaymentMethodSummary {
                payment_method_id: tx.payment_method_id.clone(),
                transactions: 0,
                revenue_cents: 0,
            });
        method.transactions += 1;
        method.revenue_cents = method.revenue_cents.saturating_add(tx.total_cents);
    }

    let mut service_revenue = Money::zero();
    let mut product_revenue = Money::zero();
    let mut commission = Money::zero();

    for item in items.iter().filter(|i| included.contains(i.transaction_id.as_str())) {
        match item.kind {
            LineKind::Service => service_revenue = service_revenue.saturating_add(item.line_total()),
            LineKind::Product => product_revenue = product_revenue.saturating_add(item.line_total()),
        }

        let line_commission = item.commission_total();
        commission = commission.saturating_add(line_commission);

        if let Some(barber) = barber_of
            .get(item.transaction_id.as_str())
            .and_then(|id| barbers.get_mut(id))
        {
            barber.commission_cents = barber.commission_cents.saturating_add(line_commission.cents());
        }
    }

    let count = transactions.len() as i64;

    let mut by_barber: Vec<BarberSummary> = barbers.into_values().collect();
    by_barber.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));

    let mut by_payment_method: Vec<PaymentMethodSummary> = methods.into_values().collect();
    by_payment_method.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));

    RevenueReport {
        transactions: count,
        revenue_cents: revenue.cents(),
        average_ticket_cents: revenue.average_over(count).cents(),
        service_revenue_cents: service_revenue.cents(),
        product_revenue_cents: product_revenue.cents(),
        commission_cents: commission.cents(),
        by_barber,
        by_payment_method,
    }
}
