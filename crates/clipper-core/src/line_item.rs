//! # Transaction-Item Classifier
//!
//! Every transaction line is either a service line or a product line, never
//! both and never neither:
//!
//! ```text
//!   kind      service_id   inventory_item_id   result
//!   ───────   ──────────   ─────────────────   ─────────────────────────
//!   SERVICE   Some         None                LineTarget::Service
//!   PRODUCT   None         Some                LineTarget::Product
//!   SERVICE   *            Some                LineItemMismatch
//!   SERVICE   None         *                   LineItemMismatch
//!   PRODUCT   Some         *                   LineItemMismatch
//!   PRODUCT   *            None                LineItemMismatch
//! ```
//!
//! [`classify`] is a pure gate: it checks only the kind/reference pairing.
//! Prices, quantities and commissions pass through untouched; [`plan_checkout`]
//! validates those separately. The same rule is repeated as a `CHECK`
//! constraint on `transaction_items`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{InventoryMovement, LineKind, Transaction, TransactionItem};
use crate::validation::{validate_cents, validate_positive_quantity};
use crate::MAX_TRANSACTION_LINES;

/// A transaction line as submitted by the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemDraft {
    pub kind: LineKind,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub inventory_item_id: Option<String>,
    pub price_cents: i64,
    pub quantity_milli: i64,
    #[serde(default)]
    pub commission_cents: i64,
}

impl LineItemDraft {
    /// Builds a well-formed service line.
    pub fn service(
        service_id: impl Into<String>,
        price: Money,
        quantity: Quantity,
        commission: Money,
    ) -> Self {
        LineItemDraft {
            kind: LineKind::Service,
            service_id: Some(service_id.into()),
            inventory_item_id: None,
            price_cents: price.cents(),
            quantity_milli: quantity.milli(),
            commission_cents: commission.cents(),
        }
    }

    /// Builds a well-formed product line.
    pub fn product(
        inventory_item_id: impl Into<String>,
        price: Money,
        quantity: Quantity,
        commission: Money,
    ) -> Self {
        LineItemDraft {
            kind: LineKind::Product,
            service_id: None,
            inventory_item_id: Some(inventory_item_id.into()),
            price_cents: price.cents(),
            quantity_milli: quantity.milli(),
            commission_cents: commission.cents(),
        }
    }

    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    /// Unit price × quantity; `None` if it does not fit in cents.
    pub fn line_total(&self) -> Option<Money> {
        Money::from_cents(self.price_cents).times_quantity(self.quantity())
    }

    pub fn commission_total(&self) -> Option<Money> {
        Money::from_cents(self.commission_cents).times_quantity(self.quantity())
    }
}

/// The single catalog entry a classified line points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineTarget {
    Service { service_id: String },
    Product { inventory_item_id: String },
}

impl LineTarget {
    pub fn kind(&self) -> LineKind {
        match self {
            LineTarget::Service { .. } => LineKind::Service,
            LineTarget::Product { .. } => LineKind::Product,
        }
    }

    /// The `(service_id, inventory_item_id)` column pair for persistence.
    pub fn columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            LineTarget::Service { service_id } => (Some(service_id.as_str()), None),
            LineTarget::Product { inventory_item_id } => (None, Some(inventory_item_id.as_str())),
        }
    }
}

/// Blank strings from a form count as "not selected".
fn present(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Classifies a draft line, rejecting any inconsistent kind/reference pairing.
///
/// ## Example
/// ```rust
/// use clipper_core::line_item::{classify, LineItemDraft, LineTarget};
/// use clipper_core::{LineKind, Money, Quantity};
///
/// let line = LineItemDraft::service("svc-1", Money::from_cents(3500), Quantity::from_units(1), Money::zero());
/// assert_eq!(classify(&line).unwrap(), LineTarget::Service { service_id: "svc-1".into() });
///
/// let mut broken = line.clone();
/// broken.kind = LineKind::Product;
/// assert!(classify(&broken).is_err());
/// ```
pub fn classify(draft: &LineItemDraft) -> CoreResult<LineTarget> {
    let service = present(&draft.service_id);
    let item = present(&draft.inventory_item_id);

    let mismatch = |reason: &str| CoreError::LineItemMismatch {
        kind: draft.kind,
        reason: reason.to_string(),
    };

    match (draft.kind, service, item) {
        (LineKind::Service, Some(service_id), None) => Ok(LineTarget::Service {
            service_id: service_id.to_string(),
        }),
        (LineKind::Product, None, Some(inventory_item_id)) => Ok(LineTarget::Product {
            inventory_item_id: inventory_item_id.to_string(),
        }),
        (LineKind::Service, _, Some(_)) => {
            Err(mismatch("a service line cannot reference an inventory item"))
        }
        (LineKind::Service, None, None) => Err(mismatch("a service line requires a service")),
        (LineKind::Product, Some(_), _) => {
            Err(mismatch("a product line cannot reference a service"))
        }
        (LineKind::Product, None, None) => {
            Err(mismatch("a product line requires an inventory item"))
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// A checkout as submitted: header fields plus its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutDraft {
    pub barber_id: String,
    pub payment_method_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<LineItemDraft>,
}

/// A draft line that passed validation, paired with its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine<'a> {
    pub target: LineTarget,
    pub draft: &'a LineItemDraft,
}

/// Validated checkout, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan<'a> {
    pub lines: Vec<PlannedLine<'a>>,
    /// Sum of the line totals.
    pub total: Money,
}

impl CheckoutPlan<'_> {
    pub fn has_products(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.target.kind() == LineKind::Product)
    }
}

/// Everything a completed checkout wrote.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutReceipt {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
    /// One `out` movement per product line, in line order.
    pub movements: Vec<InventoryMovement>,
}

/// Validates a checkout before anything is written.
///
/// ## Rules
/// - barber and payment method are required
/// - 1..=[`MAX_TRANSACTION_LINES`] lines
/// - every line passes [`classify`]
/// - quantities strictly positive, prices and commissions non-negative
/// - line totals, line commissions and the ticket total fit in an `i64`
///   of cents
pub fn plan_checkout(draft: &CheckoutDraft) -> CoreResult<CheckoutPlan<'_>> {
    if draft.barber_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "barber".to_string(),
        }
        .into());
    }
    if draft.payment_method_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "payment method".to_string(),
        }
        .into());
    }
    if draft.lines.is_empty() {
        return Err(CoreError::EmptyTransaction);
    }
    if draft.lines.len() > MAX_TRANSACTION_LINES {
        return Err(CoreError::TooManyLines {
            max: MAX_TRANSACTION_LINES,
        });
    }

    let mut lines = Vec::with_capacity(draft.lines.len());
    let mut total = Money::zero();

    for line in &draft.lines {
        let target = classify(line)?;
        validate_positive_quantity(line.quantity())?;
        validate_cents("price", line.price_cents)?;
        validate_cents("commission", line.commission_cents)?;

        let line_total = line.line_total().ok_or_else(|| too_large("line total"))?;
        line.commission_total().ok_or_else(|| too_large("line commission"))?;
        total = total
            .checked_add(line_total)
            .ok_or_else(|| too_large("total"))?;
        lines.push(PlannedLine { target, draft: line });
    }

    Ok(CheckoutPlan { lines, total })
}

fn too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: LineKind, service: Option<&str>, item: Option<&str>) -> LineItemDraft {
        LineItemDraft {
            kind,
            service_id: service.map(String::from),
            inventory_item_id: item.map(String::from),
            price_cents: 1000,
            quantity_milli: 1_000,
            commission_cents: 0,
        }
    }

    #[test]
    fn test_consistent_lines_classify() {
        let target = classify(&draft(LineKind::Service, Some("svc"), None)).unwrap();
        assert_eq!(target.kind(), LineKind::Service);
        assert_eq!(target.columns(), (Some("svc"), None));

        let target = classify(&draft(LineKind::Product, None, Some("item"))).unwrap();
        assert_eq!(target.kind(), LineKind::Product);
        assert_eq!(target.columns(), (None, Some("item")));
    }

    #[test]
    fn test_every_inconsistent_pairing_is_rejected() {
        let cases = [
            draft(LineKind::Service, None, None),
            draft(LineKind::Service, Some("svc"), Some("item")),
            draft(LineKind::Service, None, Some("item")),
            draft(LineKind::Product, None, None),
            draft(LineKind::Product, Some("svc"), Some("item")),
            draft(LineKind::Product, Some("svc"), None),
        ];

        for case in &cases {
            let err = classify(case).unwrap_err();
            assert!(
                matches!(err, CoreError::LineItemMismatch { kind, .. } if kind == case.kind),
                "expected mismatch for {:?}",
                case
            );
        }
    }

    #[test]
    fn test_blank_ids_count_as_absent() {
        assert!(classify(&draft(LineKind::Service, Some("  "), None)).is_err());
        assert!(classify(&draft(LineKind::Product, Some(""), Some("item"))).is_ok());
    }

    #[test]
    fn test_classifier_ignores_amounts() {
        let mut line = draft(LineKind::Service, Some("svc"), None);
        line.price_cents = -500;
        line.quantity_milli = 0;
        line.commission_cents = -1;
        assert!(classify(&line).is_ok());
    }

    #[test]
    fn test_draft_deserializes_with_defaults() {
        let line: LineItemDraft = serde_json::from_str(
            r#"{"kind":"PRODUCT","inventory_item_id":"item","price_cents":1500,"quantity_milli":2000}"#,
        )
        .unwrap();
        assert_eq!(line.service_id, None);
        assert_eq!(line.commission_cents, 0);
        assert_eq!(line.line_total(), Some(Money::from_cents(3000)));
    }

    fn checkout(lines: Vec<LineItemDraft>) -> CheckoutDraft {
        CheckoutDraft {
            barber_id: "barber".to_string(),
            payment_method_id: "cash".to_string(),
            notes: None,
            lines,
        }
    }

    #[test]
    fn test_plan_totals_lines() {
        let draft = checkout(vec![
            LineItemDraft::service("svc", Money::from_cents(3500), Quantity::from_units(1), Money::from_cents(1000)),
            LineItemDraft::product("item", Money::from_cents(1250), Quantity::from_milli(1_500), Money::zero()),
        ]);

        let plan = plan_checkout(&draft).unwrap();
        assert_eq!(plan.total, Money::from_cents(3500 + 1875));
        assert_eq!(plan.lines.len(), 2);
        assert!(plan.has_products());
    }

    #[test]
    fn test_plan_rejects_empty_and_oversized() {
        assert!(matches!(plan_checkout(&checkout(vec![])), Err(CoreError::EmptyTransaction)));

        let line = LineItemDraft::service("svc", Money::from_cents(100), Quantity::from_units(1), Money::zero());
        let many = checkout(vec![line; MAX_TRANSACTION_LINES + 1]);
        assert!(matches!(plan_checkout(&many), Err(CoreError::TooManyLines { .. })));
    }

    #[test]
    fn test_plan_rejects_bad_lines() {
        let mut zero_qty = draft(LineKind::Service, Some("svc"), None);
        zero_qty.quantity_milli = 0;
        assert!(matches!(
            plan_checkout(&checkout(vec![zero_qty])),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let mut negative_price = draft(LineKind::Service, Some("svc"), None);
        negative_price.price_cents = -1;
        assert!(plan_checkout(&checkout(vec![negative_price])).is_err());

        let mismatched = draft(LineKind::Product, Some("svc"), None);
        assert!(matches!(
            plan_checkout(&checkout(vec![mismatched])),
            Err(CoreError::LineItemMismatch { .. })
        ));
    }

    #[test]
    fn test_plan_rejects_totals_that_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);

        let one_line = checkout(vec![LineItemDraft::service("svc", huge, Quantity::from_units(4), Money::zero())]);
        assert!(matches!(
            plan_checkout(&one_line),
            Err(CoreError::Validation(ValidationError::OutOfRange { field, .. })) if field == "line total"
        ));

        let commission = checkout(vec![LineItemDraft::service("svc", Money::zero(), Quantity::from_units(4), huge)]);
        assert!(matches!(
            plan_checkout(&commission),
            Err(CoreError::Validation(ValidationError::OutOfRange { field, .. })) if field == "line commission"
        ));

        let line = LineItemDraft::service("svc", huge, Quantity::from_units(1), Money::zero());
        let summed = checkout(vec![line.clone(), line.clone(), line]);
        assert!(matches!(
            plan_checkout(&summed),
            Err(CoreError::Validation(ValidationError::OutOfRange { field, .. })) if field == "total"
        ));
    }

    #[test]
    fn test_plan_requires_header_references() {
        let mut draft = checkout(vec![LineItemDraft::service(
            "svc",
            Money::from_cents(100),
            Quantity::from_units(1),
            Money::zero(),
        )]);
        draft.barber_id = " ".to_string();
        assert!(matches!(plan_checkout(&draft), Err(CoreError::Validation(_))));
    }
}
