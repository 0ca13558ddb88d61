//! # Inventory Repository
//!
//! Stock-tracked items and their movement history.
//!
//! ## Stock Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quantity_milli only ever changes inside a database transaction that  │
//! │  also appends an inventory_movements row:                              │
//! │                                                                         │
//! │  record_movement (this file)       checkout (transaction.rs)           │
//! │  ───────────────────────────       ─────────────────────────           │
//! │  BEGIN IMMEDIATE                   BEGIN IMMEDIATE                     │
//! │  read item                         ... per PRODUCT line:               │
//! │  plan_movement  ── reject? ──►     read item                           │
//! │  INSERT movement   ROLLBACK        plan_sale                           │
//! │  UPDATE ... WHERE                  UPDATE ... WHERE                    │
//! │    quantity + delta >= 0             (guard per policy)                │
//! │  COMMIT                            INSERT movement                     │
//! │                                    COMMIT                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional `UPDATE` re-checks the bound at write time, so two
//! concurrent `out` movements cannot both pass against the same stock.

use chrono::{DateTime, Utc};
use clipper_core::inventory::{plan_movement, signed_quantity, MovementDraft};
use clipper_core::validation::{validate_name, validate_sku, validate_stock_level, validate_unit};
use clipper_core::{
    CoreError, InventoryItem, InventoryMovement, Quantity, ValidationError, DEFAULT_UNIT,
};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::{begin_write, generate_id};
use crate::error::{DbError, DbResult};

pub(crate) const SELECT_ITEM: &str = r#"
    SELECT id, name, sku, quantity_milli, unit, min_quantity_milli, created_at, updated_at
    FROM inventory_items
"#;

const SELECT_MOVEMENT: &str = r#"
    SELECT id, item_id, direction, quantity_milli, created_by, notes, transaction_id, created_at
    FROM inventory_movements
"#;

/// Fields for a new inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    /// Opening stock; not recorded as a movement.
    #[serde(default)]
    pub quantity_milli: i64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub min_quantity_milli: Option<i64>,
}

impl NewInventoryItem {
    pub fn new(name: impl Into<String>, quantity: Quantity) -> Self {
        NewInventoryItem {
            name: name.into(),
            sku: None,
            quantity_milli: quantity.milli(),
            unit: None,
            min_quantity_milli: None,
        }
    }

    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn min_quantity(mut self, min: Quantity) -> Self {
        self.min_quantity_milli = Some(min.milli());
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        if let Some(sku) = &self.sku {
            validate_sku(sku)?;
        }
        if let Some(unit) = &self.unit {
            validate_unit(unit)?;
        }
        validate_stock_level("quantity", Quantity::from_milli(self.quantity_milli))?;
        if let Some(min) = self.min_quantity_milli {
            validate_stock_level("minimum quantity", Quantity::from_milli(min))?;
        }
        Ok(())
    }
}

/// Repository for inventory database operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Creates an item with its opening stock.
    pub async fn create(&self, input: &NewInventoryItem) -> DbResult<InventoryItem> {
        input.validate()?;

        let now = Utc::now();
        let item = InventoryItem {
            id: generate_id(),
            name: input.name.trim().to_string(),
            sku: input.sku.as_deref().map(str::trim).map(String::from),
            quantity_milli: input.quantity_milli,
            unit: input
                .unit
                .as_deref()
                .map(str::trim)
                .unwrap_or(DEFAULT_UNIT)
                .to_string(),
            min_quantity_milli: input.min_quantity_milli,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, label = %item.label(), quantity = %item.quantity(), "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, name, sku, quantity_milli, unit, min_quantity_milli, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.sku)
        .bind(item.quantity_milli)
        .bind(&item.unit)
        .bind(item.min_quantity_milli)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(item.sku.as_deref()))?;

        Ok(item)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!("{SELECT_ITEM} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!("{SELECT_ITEM} WHERE sku = ?1"))
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists all items by name.
    pub async fn list(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!("{SELECT_ITEM} ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Items with a threshold whose quantity on hand is at or below it,
    /// most depleted first.
    pub async fn list_low_stock(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"{SELECT_ITEM}
            WHERE min_quantity_milli IS NOT NULL
              AND quantity_milli <= min_quantity_milli
            ORDER BY quantity_milli - min_quantity_milli, name"#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates name, SKU, unit and threshold. The quantity on hand is left
    /// alone; it only changes through movements and sales.
    pub async fn update_details(&self, id: &str, input: &NewInventoryItem) -> DbResult<InventoryItem> {
        input.validate()?;
        debug!(id = %id, "Updating inventory item details");

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                name = ?2,
                sku = ?3,
                unit = ?4,
                min_quantity_milli = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.sku.as_deref().map(str::trim))
        .bind(input.unit.as_deref().map(str::trim).unwrap_or(DEFAULT_UNIT))
        .bind(input.min_quantity_milli)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("InventoryItem", id))
    }

    /// Deletes an item and, by cascade, its movement history.
    ///
    /// ## Errors
    /// `ForeignKeyViolation` when a transaction line references the item.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting inventory item");

        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", id));
        }

        Ok(())
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Movement history of an item, newest first.
    pub async fn movements(&self, item_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(&format!(
            "{SELECT_MOVEMENT} WHERE item_id = ?1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Movements written by a checkout, in line order.
    pub async fn movements_for_transaction(&self, transaction_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(&format!(
            "{SELECT_MOVEMENT} WHERE transaction_id = ?1 ORDER BY rowid"
        ))
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Records a manual stock movement.
    ///
    /// ## Flow
    /// 1. Read the item (NotFound if missing)
    /// 2. [`plan_movement`] rejects non-positive quantities and any `out`
    ///    that would leave the item below zero, before anything is written
    /// 3. Append the movement and apply the delta in one database transaction
    ///
    /// ## Returns
    /// The item with its new quantity on hand.
    pub async fn record_movement(
        &self,
        draft: &MovementDraft,
        created_by: Option<&str>,
    ) -> DbResult<InventoryItem> {
        let qty = draft.quantity();
        let mut tx = begin_write(&self.pool).await?;

        let item = fetch_item(&mut tx, &draft.item_id).await?;

        if let Err(err) = plan_movement(item.label(), item.quantity(), draft.direction, qty) {
            warn!(item = %item.id, direction = %draft.direction, quantity = %qty, error = %err, "Movement rejected");
            return Err(err.into());
        }

        let now = Utc::now();
        let movement = InventoryMovement {
            id: generate_id(),
            item_id: item.id.clone(),
            direction: draft.direction,
            quantity_milli: qty.milli(),
            created_by: created_by.map(String::from),
            notes: draft.notes.clone(),
            transaction_id: None,
            created_at: now,
        };

        insert_movement(&mut tx, &movement).await?;
        apply_delta(&mut tx, &item, signed_quantity(draft.direction, qty), true, now).await?;

        let updated = fetch_item(&mut tx, &item.id).await?;
        tx.commit().await?;

        info!(
            item = %updated.id,
            direction = %draft.direction,
            quantity = %qty,
            on_hand = %updated.quantity(),
            "Stock movement recorded"
        );

        Ok(updated)
    }
}

// =============================================================================
// Connection-level helpers (shared with checkout)
// =============================================================================

pub(crate) async fn fetch_item(conn: &mut SqliteConnection, id: &str) -> DbResult<InventoryItem> {
    sqlx::query_as::<_, InventoryItem>(&format!("{SELECT_ITEM} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("InventoryItem", id))
}

pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &InventoryMovement,
) -> DbResult<()> {
    debug!(
        item = %movement.item_id,
        direction = %movement.direction,
        quantity = %movement.quantity(),
        "Inserting inventory movement"
    );

    sqlx::query(
        r#"
        INSERT INTO inventory_movements (
            id, item_id, direction, quantity_milli, created_by, notes, transaction_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.item_id)
    .bind(movement.direction)
    .bind(movement.quantity_milli)
    .bind(&movement.created_by)
    .bind(&movement.notes)
    .bind(&movement.transaction_id)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Adds `delta` to the quantity on hand.
///
/// With `floor` set the write only happens if the result stays at or above
/// zero, evaluated by SQLite against the current row value. A rejected write
/// is reported as `InsufficientStock` with the quantity actually on hand.
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
    delta: Quantity,
    floor: bool,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity_milli = quantity_milli + ?2,
            updated_at = ?3
        WHERE id = ?1
          AND (?4 = 0 OR quantity_milli + ?2 >= 0)
        "#,
    )
    .bind(&item.id)
    .bind(delta.milli())
    .bind(now)
    .bind(floor)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let current = fetch_item(conn, &item.id).await?;
        return Err(CoreError::InsufficientStock {
            item: current.label().to_string(),
            available: current.quantity(),
            requested: -delta,
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{file_fixture, fixture};
    use clipper_core::MovementDirection;
    use tokio::task::JoinSet;

    #[tokio::test]
    async fn test_manual_out_within_stock() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        let draft = MovementDraft::new(&fx.pomade_id, MovementDirection::Out, Quantity::from_units(4))
            .with_notes("Used at station 2");
        let item = repo.record_movement(&draft, Some(&fx.operator_id)).await.unwrap();
        assert_eq!(item.quantity(), Quantity::from_units(6));

        let movements = repo.movements(&fx.pomade_id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].direction, MovementDirection::Out);
        assert_eq!(movements[0].quantity(), Quantity::from_units(4));
        assert_eq!(movements[0].created_by.as_deref(), Some(fx.operator_id.as_str()));
        assert_eq!(movements[0].notes.as_deref(), Some("Used at station 2"));
        assert_eq!(movements[0].transaction_id, None);
    }

    #[tokio::test]
    async fn test_manual_out_beyond_stock_changes_nothing() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        let draft = MovementDraft::new(&fx.pomade_id, MovementDirection::Out, Quantity::from_milli(10_001));
        let err = repo.record_movement(&draft, Some(&fx.operator_id)).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Business(CoreError::InsufficientStock { available, .. })
                if available == Quantity::from_units(10)
        ));

        let item = repo.get(&fx.pomade_id).await.unwrap().unwrap();
        assert_eq!(item.quantity(), Quantity::from_units(10));
        assert!(repo.movements(&fx.pomade_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manual_in_is_unbounded() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        let draft = MovementDraft::new(&fx.pomade_id, MovementDirection::In, Quantity::from_milli(2_500));
        let item = repo.record_movement(&draft, None).await.unwrap();

        assert_eq!(item.quantity(), Quantity::from_milli(12_500));
        assert_eq!(repo.movements(&fx.pomade_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_past_representable_stock_changes_nothing() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        let draft = MovementDraft::new(&fx.pomade_id, MovementDirection::In, Quantity::from_milli(i64::MAX));
        let err = repo.record_movement(&draft, None).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Business(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let item = repo.get(&fx.pomade_id).await.unwrap().unwrap();
        assert_eq!(item.quantity(), Quantity::from_units(10));
        assert!(repo.movements(&fx.pomade_id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_outs_on_shared_file_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let fx = file_fixture(&dir.path().join("shop.db")).await;

        let mut tasks = JoinSet::new();
        for _ in 0..20 {
            let repo = fx.db.inventory();
            let draft = MovementDraft::new(&fx.pomade_id, MovementDirection::Out, Quantity::from_units(1));
            tasks.spawn(async move { repo.record_movement(&draft, None).await });
        }

        let (mut applied, mut refused) = (0, 0);
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(_) => applied += 1,
                Err(DbError::Business(CoreError::InsufficientStock { .. })) => refused += 1,
                Err(other) => panic!("writer failed instead of waiting: {other}"),
            }
        }

        assert_eq!((applied, refused), (10, 10));

        let repo = fx.db.inventory();
        let item = repo.get(&fx.pomade_id).await.unwrap().unwrap();
        assert_eq!(item.quantity(), Quantity::zero());
        assert_eq!(repo.movements(&fx.pomade_id).await.unwrap().len(), 10);

        fx.db.close().await;
    }

    #[tokio::test]
    async fn test_non_positive_and_unknown_items_are_rejected() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        let zero = MovementDraft::new(&fx.pomade_id, MovementDirection::In, Quantity::zero());
        assert!(matches!(
            repo.record_movement(&zero, None).await,
            Err(DbError::Business(CoreError::Validation(_)))
        ));

        let missing = MovementDraft::new("missing", MovementDirection::In, Quantity::from_units(1));
        assert!(matches!(
            repo.record_movement(&missing, None).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_signed_movements_sum_to_stock_change() {
        let fx = fixture().await;
        let repo = fx.db.inventory();
        let initial = repo.get(&fx.pomade_id).await.unwrap().unwrap().quantity();

        let steps = [
            (MovementDirection::In, 3_000),
            (MovementDirection::Out, 7_250),
            (MovementDirection::Out, 99_000), // rejected
            (MovementDirection::In, 500),
            (MovementDirection::Out, 6_250),
        ];
        for (direction, milli) in steps {
            let draft = MovementDraft::new(&fx.pomade_id, direction, Quantity::from_milli(milli));
            let _ = repo.record_movement(&draft, Some(&fx.admin_id)).await;
        }

        let current = repo.get(&fx.pomade_id).await.unwrap().unwrap().quantity();
        let net: Quantity = repo
            .movements(&fx.pomade_id)
            .await
            .unwrap()
            .iter()
            .map(InventoryMovement::signed_quantity)
            .sum();

        assert_eq!(net, current - initial);
        assert_eq!(current, Quantity::zero());
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        assert!(repo.list_low_stock().await.unwrap().is_empty());

        let draft = MovementDraft::new(&fx.pomade_id, MovementDirection::Out, Quantity::from_units(8));
        let item = repo.record_movement(&draft, None).await.unwrap();
        assert!(item.is_low_stock());

        let low = repo.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, fx.pomade_id);
    }

    #[tokio::test]
    async fn test_item_details_and_sku_lookup() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        let input = NewInventoryItem::new("Beard Oil", Quantity::from_units(99))
            .sku("OIL-30")
            .unit("ml")
            .min_quantity(Quantity::from_units(1));
        let updated = repo.update_details(&fx.oil_id, &input).await.unwrap();

        assert_eq!(updated.unit, "ml");
        assert_eq!(updated.quantity(), Quantity::from_units(5));
        assert_eq!(repo.get_by_sku("OIL-30").await.unwrap().unwrap().id, fx.oil_id);

        let duplicate = NewInventoryItem::new("Other", Quantity::zero()).sku("OIL-30");
        assert!(matches!(
            repo.create(&duplicate).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_movements() {
        let fx = fixture().await;
        let repo = fx.db.inventory();

        let draft = MovementDraft::new(&fx.oil_id, MovementDirection::In, Quantity::from_units(1));
        repo.record_movement(&draft, None).await.unwrap();

        repo.delete(&fx.oil_id).await.unwrap();
        assert!(repo.get(&fx.oil_id).await.unwrap().is_none());
        assert!(repo.movements(&fx.oil_id).await.unwrap().is_empty());
    }
}
