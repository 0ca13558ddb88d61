//! # Transaction Repository
//!
//! Checkout and sale history.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout(draft)                                 │
//! │                                                                         │
//! │  plan_checkout ── classify lines, positive quantities, total           │
//! │       │ (nothing written yet)                                           │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE                                                       │
//! │   ├── INSERT transactions (total = Σ line totals)                      │
//! │   ├── for each line:                                                   │
//! │   │     INSERT transaction_items                                       │
//! │   │     PRODUCT only:                                                  │
//! │   │       plan_sale(on hand, qty, policy)                              │
//! │   │       UPDATE inventory_items  (conditional under Guarded)          │
//! │   │       INSERT inventory_movements (out, qty, creator, note)         │
//! │   │     SERVICE: no inventory effect                                   │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error drops the open transaction: header, lines, stock and        │
//! │  movements all roll back together.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use clipper_core::inventory::{plan_sale, sale_movement_note, signed_quantity};
use clipper_core::line_item::{plan_checkout, CheckoutDraft, CheckoutReceipt, LineTarget};
use clipper_core::report::ReportPeriod;
use clipper_core::{
    InventoryMovement, MovementDirection, SaleStockPolicy, Transaction, TransactionItem,
};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::inventory::{apply_delta, fetch_item, insert_movement};
use super::{begin_write, generate_id};
use crate::error::{DbError, DbResult};

const SELECT_TRANSACTION: &str = r#"
    SELECT id, barber_id, total_cents, payment_method_id, notes, created_by, created_at
    FROM transactions
"#;

pub(crate) const SELECT_ITEM_LINE: &str = r#"
    SELECT id, transaction_id, kind, service_id, inventory_item_id,
           price_cents, quantity_milli, commission_cents, created_at
    FROM transaction_items
"#;

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
    policy: SaleStockPolicy,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool, policy: SaleStockPolicy) -> Self {
        TransactionRepository { pool, policy }
    }

    pub fn policy(&self) -> SaleStockPolicy {
        self.policy
    }

    /// Registers a sale atomically.
    ///
    /// ## Arguments
    /// * `draft` - header references and lines
    /// * `created_by` - profile registering the sale; also the actor on the
    ///   stock movements it causes
    ///
    /// ## Errors
    /// - `Business(EmptyTransaction | TooManyLines | LineItemMismatch | Validation)`
    ///   before anything is written
    /// - `Business(InsufficientStock)` under [`SaleStockPolicy::Guarded`]
    /// - `NotFound` for an unknown inventory item
    /// - `ForeignKeyViolation` for an unknown barber, payment method or service
    pub async fn checkout(&self, draft: &CheckoutDraft, created_by: &str) -> DbResult<CheckoutReceipt> {
        let plan = plan_checkout(draft).inspect_err(|err| {
            warn!(error = %err, "Checkout rejected");
        })?;

        let now = Utc::now();
        let transaction = Transaction {
            id: generate_id(),
            barber_id: draft.barber_id.trim().to_string(),
            total_cents: plan.total.cents(),
            payment_method_id: draft.payment_method_id.trim().to_string(),
            notes: draft
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            created_by: created_by.to_string(),
            created_at: now,
        };

        debug!(
            id = %transaction.id,
            lines = plan.lines.len(),
            total = %plan.total,
            policy = %self.policy,
            "Starting checkout"
        );

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, barber_id, total_cents, payment_method_id, notes, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.barber_id)
        .bind(transaction.total_cents)
        .bind(&transaction.payment_method_id)
        .bind(&transaction.notes)
        .bind(&transaction.created_by)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(plan.lines.len());
        let mut movements = Vec::new();

        for line in &plan.lines {
            let (service_id, inventory_item_id) = line.target.columns();
            let item = TransactionItem {
                id: generate_id(),
                transaction_id: transaction.id.clone(),
                kind: line.target.kind(),
                service_id: service_id.map(String::from),
                inventory_item_id: inventory_item_id.map(String::from),
                price_cents: line.draft.price_cents,
                quantity_milli: line.draft.quantity_milli,
                commission_cents: line.draft.commission_cents,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, kind, service_id, inventory_item_id,
                    price_cents, quantity_milli, commission_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(item.kind)
            .bind(&item.service_id)
            .bind(&item.inventory_item_id)
            .bind(item.price_cents)
            .bind(item.quantity_milli)
            .bind(item.commission_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            if let LineTarget::Product { inventory_item_id } = &line.target {
                let stock = fetch_item(&mut tx, inventory_item_id).await?;
                let qty = item.quantity();

                if let Err(err) = plan_sale(stock.label(), stock.quantity(), qty, self.policy) {
                    warn!(transaction = %transaction.id, item = %stock.id, error = %err, "Checkout rejected");
                    return Err(err.into());
                }

                let guarded = self.policy == SaleStockPolicy::Guarded;
                apply_delta(
                    &mut tx,
                    &stock,
                    signed_quantity(MovementDirection::Out, qty),
                    guarded,
                    now,
                )
                .await?;

                let movement = InventoryMovement {
                    id: generate_id(),
                    item_id: stock.id.clone(),
                    direction: MovementDirection::Out,
                    quantity_milli: qty.milli(),
                    created_by: Some(created_by.to_string()),
                    notes: Some(sale_movement_note(&transaction.id)),
                    transaction_id: Some(transaction.id.clone()),
                    created_at: now,
                };
                insert_movement(&mut tx, &movement).await?;
                movements.push(movement);
            }

            items.push(item);
        }

        tx.commit().await?;

        info!(
            id = %transaction.id,
            total = %transaction.total(),
            lines = items.len(),
            movements = movements.len(),
            "Checkout completed"
        );

        Ok(CheckoutReceipt {
            transaction,
            items,
            movements,
        })
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction =
            sqlx::query_as::<_, Transaction>(&format!("{SELECT_TRANSACTION} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(transaction)
    }

    /// Lines of a transaction in insertion order.
    pub async fn items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            "{SELECT_ITEM_LINE} WHERE transaction_id = ?1 ORDER BY rowid"
        ))
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Transactions created within the period, newest first.
    pub async fn list(&self, period: &ReportPeriod) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            r#"{SELECT_TRANSACTION}
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC, rowid DESC"#
        ))
        .bind(period.from)
        .bind(period.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Transactions of one barber within the period, newest first.
    pub async fn list_for_barber(&self, barber_id: &str, period: &ReportPeriod) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            r#"{SELECT_TRANSACTION}
            WHERE barber_id = ?1 AND created_at >= ?2 AND created_at < ?3
            ORDER BY created_at DESC, rowid DESC"#
        ))
        .bind(barber_id)
        .bind(period.from)
        .bind(period.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Deletes a transaction and, by cascade, its lines.
    ///
    /// Stock is not restored: the sale movements stay in the history with
    /// their transaction reference cleared.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting transaction");

        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        info!(id = %id, "Transaction deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{file_fixture, fixture, fixture_with_policy, Fixture};
    use crate::DbError;
    use chrono::Duration;
    use clipper_core::{
        CoreError, LineItemDraft, LineKind, Money, MovementDraft, Quantity, ValidationError,
    };
    use tokio::task::JoinSet;

    fn haircut(fx: &Fixture) -> LineItemDraft {
        LineItemDraft::service(&fx.haircut_id, Money::from_cents(3500), Quantity::from_units(1), Money::from_cents(1200))
    }

    fn pomade(fx: &Fixture, units: i64) -> LineItemDraft {
        LineItemDraft::product(&fx.pomade_id, Money::from_cents(2500), Quantity::from_units(units), Money::from_cents(250))
    }

    fn draft(fx: &Fixture, lines: Vec<LineItemDraft>) -> CheckoutDraft {
        CheckoutDraft {
            barber_id: fx.barber_id.clone(),
            payment_method_id: fx.cash_id.clone(),
            notes: Some("walk-in".to_string()),
            lines,
        }
    }

    async fn on_hand(fx: &Fixture, id: &str) -> Quantity {
        fx.db.inventory().get(id).await.unwrap().unwrap().quantity()
    }

    async fn drain(fx: &Fixture, item_id: &str, units: i64) {
        let draft = MovementDraft::new(item_id, MovementDirection::Out, Quantity::from_units(units));
        fx.db.inventory().record_movement(&draft, None).await.unwrap();
    }

    async fn count(fx: &Fixture, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(fx.db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_product_line_depletes_stock_with_one_movement() {
        let fx = fixture().await;

        let receipt = fx
            .db
            .transactions()
            .checkout(&draft(&fx, vec![pomade(&fx, 3)]), &fx.operator_id)
            .await
            .unwrap();

        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::from_units(7));
        assert_eq!(receipt.transaction.total_cents, 7500);
        assert_eq!(receipt.movements.len(), 1);

        let movements = fx.db.inventory().movements(&fx.pomade_id).await.unwrap();
        assert_eq!(movements.len(), 1);
        let movement = &movements[0];
        assert_eq!(movement.direction, MovementDirection::Out);
        assert_eq!(movement.quantity(), Quantity::from_units(3));
        assert_eq!(movement.created_by.as_deref(), Some(fx.operator_id.as_str()));
        assert_eq!(movement.transaction_id.as_deref(), Some(receipt.transaction.id.as_str()));
        assert!(movement
            .notes
            .as_deref()
            .unwrap_or_default()
            .contains(&receipt.transaction.id));
    }

    #[tokio::test]
    async fn test_service_line_has_no_inventory_effect() {
        let fx = fixture().await;

        let receipt = fx
            .db
            .transactions()
            .checkout(&draft(&fx, vec![haircut(&fx)]), &fx.operator_id)
            .await
            .unwrap();

        assert!(receipt.movements.is_empty());
        assert_eq!(count(&fx, "inventory_movements").await, 0);
        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::from_units(10));
        assert_eq!(on_hand(&fx, &fx.oil_id).await, Quantity::from_units(5));
    }

    #[tokio::test]
    async fn test_mixed_checkout_persists_lines() {
        let fx = fixture().await;
        let repo = fx.db.transactions();

        let receipt = repo
            .checkout(&draft(&fx, vec![haircut(&fx), pomade(&fx, 2)]), &fx.operator_id)
            .await
            .unwrap();

        let stored = repo.get(&receipt.transaction.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, 3500 + 5000);
        assert_eq!(stored.notes.as_deref(), Some("walk-in"));

        let items = repo.items(&stored.id).await.unwrap();
        assert_eq!(items.len(), 2);
        for item in &items {
            match item.kind {
                LineKind::Service => {
                    assert!(item.service_id.is_some() && item.inventory_item_id.is_none())
                }
                LineKind::Product => {
                    assert!(item.inventory_item_id.is_some() && item.service_id.is_none())
                }
            }
        }
    }

    #[tokio::test]
    async fn test_oversell_is_rejected_under_guarded_policy() {
        let fx = fixture().await;
        let repo = fx.db.transactions();

        // Two units on hand, five sold.
        drain(&fx, &fx.pomade_id, 8).await;
        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::from_units(2));

        let err = repo
            .checkout(&draft(&fx, vec![haircut(&fx), pomade(&fx, 5)]), &fx.operator_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Business(CoreError::InsufficientStock { .. })));

        // Nothing from the failed checkout survives.
        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::from_units(2));
        assert_eq!(count(&fx, "transactions").await, 0);
        assert_eq!(count(&fx, "transaction_items").await, 0);
        assert_eq!(count(&fx, "inventory_movements").await, 1);
    }

    #[tokio::test]
    async fn test_oversell_goes_negative_under_permissive_policy() {
        let fx = fixture_with_policy(SaleStockPolicy::AllowNegative).await;

        drain(&fx, &fx.pomade_id, 8).await;

        let receipt = fx
            .db
            .transactions()
            .checkout(&draft(&fx, vec![pomade(&fx, 5)]), &fx.operator_id)
            .await
            .unwrap();

        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::from_units(-3));
        assert_eq!(receipt.movements[0].quantity(), Quantity::from_units(5));
    }

    #[tokio::test]
    async fn test_failure_on_a_later_line_rolls_back_earlier_lines() {
        let fx = fixture().await;

        let lines = vec![
            pomade(&fx, 2),
            LineItemDraft::product("missing-item", Money::from_cents(100), Quantity::from_units(1), Money::zero()),
        ];
        let err = fx
            .db
            .transactions()
            .checkout(&draft(&fx, lines), &fx.operator_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. } | DbError::NotFound { .. }));

        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::from_units(10));
        assert_eq!(count(&fx, "transactions").await, 0);
        assert_eq!(count(&fx, "inventory_movements").await, 0);
    }

    #[tokio::test]
    async fn test_invalid_drafts_write_nothing() {
        let fx = fixture().await;
        let repo = fx.db.transactions();

        assert!(matches!(
            repo.checkout(&draft(&fx, vec![]), &fx.operator_id).await,
            Err(DbError::Business(CoreError::EmptyTransaction))
        ));

        let mut mismatched = pomade(&fx, 1);
        mismatched.service_id = Some(fx.haircut_id.clone());
        assert!(matches!(
            repo.checkout(&draft(&fx, vec![mismatched]), &fx.operator_id).await,
            Err(DbError::Business(CoreError::LineItemMismatch { .. }))
        ));

        let mut unknown_barber = draft(&fx, vec![haircut(&fx)]);
        unknown_barber.barber_id = "nobody".to_string();
        assert!(matches!(
            repo.checkout(&unknown_barber, &fx.operator_id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));

        assert_eq!(count(&fx, "transactions").await, 0);
    }

    #[tokio::test]
    async fn test_total_past_cents_range_writes_nothing() {
        let fx = fixture().await;

        let line = LineItemDraft::service(
            &fx.haircut_id,
            Money::from_cents(i64::MAX / 2),
            Quantity::from_units(4),
            Money::zero(),
        );
        let err = fx
            .db
            .transactions()
            .checkout(&draft(&fx, vec![line]), &fx.operator_id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Business(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(count(&fx, "transactions").await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_on_shared_file_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let fx = file_fixture(&dir.path().join("shop.db")).await;

        let mut tasks = JoinSet::new();
        for _ in 0..15 {
            let repo = fx.db.transactions();
            let sale = draft(&fx, vec![haircut(&fx), pomade(&fx, 1)]);
            let operator = fx.operator_id.clone();
            tasks.spawn(async move { repo.checkout(&sale, &operator).await });
        }

        let (mut sold, mut refused) = (0, 0);
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Business(CoreError::InsufficientStock { .. })) => refused += 1,
                Err(other) => panic!("checkout failed instead of waiting: {other}"),
            }
        }

        assert_eq!((sold, refused), (10, 5));
        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::zero());
        assert_eq!(count(&fx, "transactions").await, 10);
        assert_eq!(count(&fx, "inventory_movements").await, 10);

        fx.db.close().await;
    }

    #[tokio::test]
    async fn test_mismatched_row_is_stopped_by_check_constraint() {
        let fx = fixture().await;
        let receipt = fx
            .db
            .transactions()
            .checkout(&draft(&fx, vec![haircut(&fx)]), &fx.operator_id)
            .await
            .unwrap();

        let result = sqlx::query(
            r#"
            INSERT INTO transaction_items (
                id, transaction_id, kind, service_id, inventory_item_id,
                price_cents, quantity_milli, commission_cents, created_at
            ) VALUES ('bad', ?1, 'SERVICE', ?2, ?3, 100, 1000, 0, ?4)
            "#,
        )
        .bind(&receipt.transaction.id)
        .bind(&fx.haircut_id)
        .bind(&fx.pomade_id)
        .bind(Utc::now())
        .execute(fx.db.pool())
        .await;

        assert!(matches!(
            result.map_err(DbError::from),
            Err(DbError::CheckViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let fx = fixture().await;
        let repo = fx.db.transactions();

        let first = repo
            .checkout(&draft(&fx, vec![haircut(&fx)]), &fx.operator_id)
            .await
            .unwrap();
        let second = repo
            .checkout(&draft(&fx, vec![pomade(&fx, 1)]), &fx.operator_id)
            .await
            .unwrap();

        let now = Utc::now();
        let today = ReportPeriod::new(now - Duration::hours(1), now + Duration::hours(1)).unwrap();
        assert_eq!(repo.list(&today).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_barber(&fx.barber_id, &today).await.unwrap().len(), 2);

        let tomorrow = ReportPeriod::new(now + Duration::days(1), now + Duration::days(2)).unwrap();
        assert!(repo.list(&tomorrow).await.unwrap().is_empty());

        repo.delete(&second.transaction.id).await.unwrap();
        assert!(repo.items(&second.transaction.id).await.unwrap().is_empty());
        assert!(repo.get(&first.transaction.id).await.unwrap().is_some());

        // The sale movement stays, detached from the deleted transaction.
        let movements = fx.db.inventory().movements(&fx.pomade_id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].transaction_id, None);
        assert_eq!(on_hand(&fx, &fx.pomade_id).await, Quantity::from_units(9));

        assert!(matches!(
            repo.delete(&second.transaction.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
