//! # Session
//!
//! Authorizing facade bound to one acting profile.
//!
//! ```text
//!   db.session(profile_id) ── role lookup ──► Session { actor }
//!        │
//!        │ every call:
//!        ▼
//!   policy::authorize(actor, table, op) ── denied ──► CoreError::AccessDenied
//!        │ allowed
//!        ▼
//!   repository call
//! ```
//!
//! Repositories themselves never check permissions; anything acting on
//! behalf of a person should go through a `Session`.

use clipper_core::inventory::MovementDraft;
use clipper_core::line_item::{CheckoutDraft, CheckoutReceipt};
use clipper_core::policy::{authorize, authorize_owned};
use clipper_core::report::{ReportPeriod, RevenueReport};
use clipper_core::{
    Actor, Barber, InventoryItem, InventoryMovement, Operation, PaymentMethod, Profile, Role,
    Service, Table, Transaction, TransactionItem,
};
use tracing::warn;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{NewInventoryItem, NewService};

/// Database access on behalf of one profile.
#[derive(Debug, Clone)]
pub struct Session {
    db: Database,
    actor: Actor,
}

impl Session {
    pub(crate) fn new(db: Database, actor: Actor) -> Self {
        Session { db, actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    fn require(&self, table: Table, op: Operation) -> DbResult<()> {
        authorize(&self.actor, table, op).map_err(|err| {
            warn!(profile = %self.actor.profile_id, %table, %op, "Access denied");
            DbError::from(err)
        })
    }

    fn require_all(&self, checks: &[(Table, Operation)]) -> DbResult<()> {
        checks
            .iter()
            .try_for_each(|&(table, op)| self.require(table, op))
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// The acting profile.
    pub async fn me(&self) -> DbResult<Profile> {
        self.require(Table::Profiles, Operation::Select)?;
        self.db
            .profiles()
            .get(&self.actor.profile_id)
            .await?
            .ok_or_else(|| DbError::not_found("Profile", &self.actor.profile_id))
    }

    pub async fn list_profiles(&self) -> DbResult<Vec<Profile>> {
        self.require(Table::Profiles, Operation::Select)?;
        self.db.profiles().list().await
    }

    /// Renames a profile: one's own, or any as admin.
    pub async fn rename_profile(&self, id: &str, full_name: &str) -> DbResult<Profile> {
        authorize_owned(&self.actor, Table::Profiles, Operation::Update, id).map_err(|err| {
            warn!(profile = %self.actor.profile_id, target = %id, "Profile rename denied");
            DbError::from(err)
        })?;
        self.db.profiles().rename(id, full_name).await
    }

    /// Assigns a role. Admin only, including for one's own profile.
    pub async fn set_role(&self, id: &str, role: Role) -> DbResult<Profile> {
        self.require(Table::Profiles, Operation::Update)?;
        self.db.profiles().set_role(id, role).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn list_barbers(&self, active_only: bool) -> DbResult<Vec<Barber>> {
        self.require(Table::Barbers, Operation::Select)?;
        self.db.barbers().list(active_only).await
    }

    pub async fn create_barber(&self, name: &str, phone: Option<&str>) -> DbResult<Barber> {
        self.require(Table::Barbers, Operation::Insert)?;
        self.db.barbers().create(name, phone).await
    }

    pub async fn update_barber(&self, id: &str, name: &str, phone: Option<&str>) -> DbResult<Barber> {
        self.require(Table::Barbers, Operation::Update)?;
        self.db.barbers().update(id, name, phone).await
    }

    pub async fn set_barber_active(&self, id: &str, active: bool) -> DbResult<()> {
        self.require(Table::Barbers, Operation::Update)?;
        self.db.barbers().set_active(id, active).await
    }

    pub async fn delete_barber(&self, id: &str) -> DbResult<()> {
        self.require(Table::Barbers, Operation::Delete)?;
        self.db.barbers().delete(id).await
    }

    pub async fn list_services(&self, active_only: bool) -> DbResult<Vec<Service>> {
        self.require(Table::Services, Operation::Select)?;
        self.db.services().list(active_only).await
    }

    pub async fn create_service(&self, input: &NewService) -> DbResult<Service> {
        self.require(Table::Services, Operation::Insert)?;
        self.db.services().create(input).await
    }

    pub async fn update_service(&self, id: &str, input: &NewService) -> DbResult<Service> {
        self.require(Table::Services, Operation::Update)?;
        self.db.services().update(id, input).await
    }

    pub async fn set_service_active(&self, id: &str, active: bool) -> DbResult<()> {
        self.require(Table::Services, Operation::Update)?;
        self.db.services().set_active(id, active).await
    }

    pub async fn delete_service(&self, id: &str) -> DbResult<()> {
        self.require(Table::Services, Operation::Delete)?;
        self.db.services().delete(id).await
    }

    pub async fn list_payment_methods(&self, active_only: bool) -> DbResult<Vec<PaymentMethod>> {
        self.require(Table::PaymentMethods, Operation::Select)?;
        self.db.payment_methods().list(active_only).await
    }

    pub async fn create_payment_method(&self, name: &str) -> DbResult<PaymentMethod> {
        self.require(Table::PaymentMethods, Operation::Insert)?;
        self.db.payment_methods().create(name).await
    }

    pub async fn rename_payment_method(&self, id: &str, name: &str) -> DbResult<PaymentMethod> {
        self.require(Table::PaymentMethods, Operation::Update)?;
        self.db.payment_methods().rename(id, name).await
    }

    pub async fn set_payment_method_active(&self, id: &str, active: bool) -> DbResult<()> {
        self.require(Table::PaymentMethods, Operation::Update)?;
        self.db.payment_methods().set_active(id, active).await
    }

    pub async fn delete_payment_method(&self, id: &str) -> DbResult<()> {
        self.require(Table::PaymentMethods, Operation::Delete)?;
        self.db.payment_methods().delete(id).await
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    pub async fn list_inventory(&self) -> DbResult<Vec<InventoryItem>> {
        self.require(Table::InventoryItems, Operation::Select)?;
        self.db.inventory().list().await
    }

    pub async fn low_stock(&self) -> DbResult<Vec<InventoryItem>> {
        self.require(Table::InventoryItems, Operation::Select)?;
        self.db.inventory().list_low_stock().await
    }

    pub async fn get_inventory_item(&self, id: &str) -> DbResult<InventoryItem> {
        self.require(Table::InventoryItems, Operation::Select)?;
        self.db
            .inventory()
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("InventoryItem", id))
    }

    pub async fn create_inventory_item(&self, input: &NewInventoryItem) -> DbResult<InventoryItem> {
        self.require(Table::InventoryItems, Operation::Insert)?;
        self.db.inventory().create(input).await
    }

    pub async fn update_inventory_item(&self, id: &str, input: &NewInventoryItem) -> DbResult<InventoryItem> {
        self.require(Table::InventoryItems, Operation::Update)?;
        self.db.inventory().update_details(id, input).await
    }

    pub async fn delete_inventory_item(&self, id: &str) -> DbResult<()> {
        self.require(Table::InventoryItems, Operation::Delete)?;
        self.db.inventory().delete(id).await
    }

    /// Records a manual movement with the acting profile as author.
    pub async fn record_movement(&self, draft: &MovementDraft) -> DbResult<InventoryItem> {
        self.require_all(&[
            (Table::InventoryMovements, Operation::Insert),
            (Table::InventoryItems, Operation::Update),
        ])?;
        self.db
            .inventory()
            .record_movement(draft, Some(&self.actor.profile_id))
            .await
    }

    pub async fn movements(&self, item_id: &str) -> DbResult<Vec<InventoryMovement>> {
        self.require(Table::InventoryMovements, Operation::Select)?;
        self.db.inventory().movements(item_id).await
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Registers a sale with the acting profile as creator.
    pub async fn checkout(&self, draft: &CheckoutDraft) -> DbResult<CheckoutReceipt> {
        self.require_all(&[
            (Table::Transactions, Operation::Insert),
            (Table::TransactionItems, Operation::Insert),
            (Table::InventoryItems, Operation::Update),
            (Table::InventoryMovements, Operation::Insert),
        ])?;
        self.db
            .transactions()
            .checkout(draft, &self.actor.profile_id)
            .await
    }

    /// A transaction with its lines and the movements it caused.
    pub async fn get_transaction(&self, id: &str) -> DbResult<CheckoutReceipt> {
        self.require_all(&[
            (Table::Transactions, Operation::Select),
            (Table::TransactionItems, Operation::Select),
            (Table::InventoryMovements, Operation::Select),
        ])?;

        let transactions = self.db.transactions();
        let transaction = transactions
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;
        let items = transactions.items(id).await?;
        let movements = self.db.inventory().movements_for_transaction(id).await?;

        Ok(CheckoutReceipt {
            transaction,
            items,
            movements,
        })
    }

    pub async fn transaction_items(&self, id: &str) -> DbResult<Vec<TransactionItem>> {
        self.require(Table::TransactionItems, Operation::Select)?;
        self.db.transactions().items(id).await
    }

    pub async fn list_transactions(&self, period: &ReportPeriod) -> DbResult<Vec<Transaction>> {
        self.require(Table::Transactions, Operation::Select)?;
        self.db.transactions().list(period).await
    }

    pub async fn list_barber_transactions(
        &self,
        barber_id: &str,
        period: &ReportPeriod,
    ) -> DbResult<Vec<Transaction>> {
        self.require(Table::Transactions, Operation::Select)?;
        self.db.transactions().list_for_barber(barber_id, period).await
    }

    /// Deletes a transaction. Admin only.
    pub async fn delete_transaction(&self, id: &str) -> DbResult<()> {
        self.require(Table::Transactions, Operation::Delete)?;
        self.db.transactions().delete(id).await
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub async fn report(&self, period: &ReportPeriod) -> DbResult<RevenueReport> {
        self.require_all(&[
            (Table::Transactions, Operation::Select),
            (Table::TransactionItems, Operation::Select),
        ])?;
        self.db.reports().summary(period).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;
    use clipper_core::{CoreError, LineItemDraft, Money, MovementDirection, Quantity};

    fn is_denied(result: &DbResult<impl std::fmt::Debug>) -> bool {
        matches!(result, Err(DbError::Business(CoreError::AccessDenied { .. })))
    }

    #[tokio::test]
    async fn test_operator_can_sell_and_move_stock() {
        let fx = fixture().await;
        let session = fx.db.session(&fx.operator_id).await.unwrap();
        assert_eq!(session.actor().role, Role::Operator);

        let draft = CheckoutDraft {
            barber_id: fx.barber_id.clone(),
            payment_method_id: fx.cash_id.clone(),
            notes: None,
            lines: vec![LineItemDraft::product(
                &fx.pomade_id,
                Money::from_cents(2500),
                Quantity::from_units(1),
                Money::zero(),
            )],
        };
        let receipt = session.checkout(&draft).await.unwrap();
        assert_eq!(receipt.transaction.created_by, fx.operator_id);

        let movement = MovementDraft::new(&fx.pomade_id, MovementDirection::In, Quantity::from_units(4));
        let item = session.record_movement(&movement).await.unwrap();
        assert_eq!(item.quantity(), Quantity::from_units(13));

        let history = session.movements(&fx.pomade_id).await.unwrap();
        assert!(history
            .iter()
            .all(|m| m.created_by.as_deref() == Some(fx.operator_id.as_str())));

        let fetched = session.get_transaction(&receipt.transaction.id).await.unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.movements.len(), 1);
    }

    #[tokio::test]
    async fn test_operator_cannot_manage_catalog_or_delete_sales() {
        let fx = fixture().await;
        let session = fx.db.session(&fx.operator_id).await.unwrap();

        assert!(is_denied(&session.create_barber("Carlos", None).await));
        assert!(is_denied(&session.delete_service(&fx.haircut_id).await));
        assert!(is_denied(&session.create_payment_method("Pix").await));
        assert!(is_denied(
            &session
                .create_inventory_item(&NewInventoryItem::new("Gel", Quantity::zero()))
                .await
        ));
        assert!(is_denied(&session.delete_inventory_item(&fx.oil_id).await));
        assert!(is_denied(&session.set_role(&fx.operator_id, Role::Admin).await));

        // Denied calls leave the data untouched.
        assert_eq!(session.list_barbers(false).await.unwrap().len(), 1);
        assert!(fx.db.inventory().get(&fx.oil_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_admin_manages_catalog_and_roles() {
        let fx = fixture().await;
        let session = fx.db.session(&fx.admin_id).await.unwrap();

        let carlos = session.create_barber("Carlos", None).await.unwrap();
        session.set_barber_active(&carlos.id, false).await.unwrap();
        assert_eq!(session.list_barbers(true).await.unwrap().len(), 1);

        let promoted = session.set_role(&fx.operator_id, Role::Admin).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);

        session.delete_inventory_item(&fx.oil_id).await.unwrap();
        assert!(session.get_inventory_item(&fx.oil_id).await.is_err());
    }

    #[tokio::test]
    async fn test_admin_edits_catalog_rows() {
        let fx = fixture().await;
        let admin = fx.db.session(&fx.admin_id).await.unwrap();

        let names: Vec<String> = admin
            .list_profiles()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.full_name)
            .collect();
        assert_eq!(names, ["Front Desk", "Owner"]);

        let ana = admin
            .update_barber(&fx.barber_id, "Ana Paula", Some(" 555-0101 "))
            .await
            .unwrap();
        assert_eq!(ana.name, "Ana Paula");
        assert_eq!(ana.phone.as_deref(), Some("555-0101"));

        let fade = NewService {
            name: "Skin Fade".to_string(),
            price_cents: 4000,
            commission_cents: 1500,
            duration_minutes: Some(45),
        };
        let service = admin.update_service(&fx.haircut_id, &fade).await.unwrap();
        assert_eq!(service.name, "Skin Fade");
        assert_eq!((service.price_cents, service.commission_cents), (4000, 1500));

        admin.set_service_active(&fx.haircut_id, false).await.unwrap();
        assert!(admin.list_services(true).await.unwrap().is_empty());
        assert_eq!(admin.list_services(false).await.unwrap().len(), 1);

        let method = admin.rename_payment_method(&fx.cash_id, "Cash Drawer").await.unwrap();
        assert_eq!(method.name, "Cash Drawer");
        admin.set_payment_method_active(&fx.cash_id, false).await.unwrap();
        assert!(admin.list_payment_methods(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_operator_cannot_edit_catalog_rows() {
        let fx = fixture().await;
        let operator = fx.db.session(&fx.operator_id).await.unwrap();

        assert_eq!(operator.list_profiles().await.unwrap().len(), 2);

        let fade = NewService {
            name: "Skin Fade".to_string(),
            price_cents: 1,
            commission_cents: 0,
            duration_minutes: None,
        };
        assert!(is_denied(&operator.update_barber(&fx.barber_id, "Renamed", None).await));
        assert!(is_denied(&operator.update_service(&fx.haircut_id, &fade).await));
        assert!(is_denied(&operator.set_service_active(&fx.haircut_id, false).await));
        assert!(is_denied(&operator.rename_payment_method(&fx.cash_id, "Card").await));
        assert!(is_denied(&operator.set_payment_method_active(&fx.cash_id, false).await));

        let service = fx.db.services().get(&fx.haircut_id).await.unwrap().unwrap();
        assert_eq!((service.name.as_str(), service.is_active), ("Haircut", true));
        let method = fx.db.payment_methods().get(&fx.cash_id).await.unwrap().unwrap();
        assert_eq!((method.name.as_str(), method.is_active), ("Cash", true));
    }

    #[tokio::test]
    async fn test_profile_rename_is_self_or_admin() {
        let fx = fixture().await;
        let operator = fx.db.session(&fx.operator_id).await.unwrap();

        let me = operator.rename_profile(&fx.operator_id, "Desk 1").await.unwrap();
        assert_eq!(me.full_name, "Desk 1");
        assert!(is_denied(&operator.rename_profile(&fx.admin_id, "Boss").await));

        let admin = fx.db.session(&fx.admin_id).await.unwrap();
        admin.rename_profile(&fx.operator_id, "Desk 2").await.unwrap();
        assert_eq!(operator.me().await.unwrap().full_name, "Desk 2");
    }

    #[tokio::test]
    async fn test_only_admin_deletes_transactions() {
        let fx = fixture().await;
        let operator = fx.db.session(&fx.operator_id).await.unwrap();
        let admin = fx.db.session(&fx.admin_id).await.unwrap();

        let draft = CheckoutDraft {
            barber_id: fx.barber_id.clone(),
            payment_method_id: fx.cash_id.clone(),
            notes: None,
            lines: vec![LineItemDraft::service(
                &fx.haircut_id,
                Money::from_cents(3500),
                Quantity::from_units(1),
                Money::from_cents(1200),
            )],
        };
        let receipt = operator.checkout(&draft).await.unwrap();

        assert!(is_denied(&operator.delete_transaction(&receipt.transaction.id).await));
        admin.delete_transaction(&receipt.transaction.id).await.unwrap();
        assert!(matches!(
            operator.get_transaction(&receipt.transaction.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
