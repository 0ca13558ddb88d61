//! # Access Policy
//!
//! Role-based predicates deciding which operations a profile may perform on
//! which table. `clipper-db`'s `Session` evaluates these before every data
//! access, so no repository call is reachable without passing the gate.
//!
//! ## Permission Matrix
//! ```text
//! ┌────────────────────────┬──────────┬──────────────────┬──────────────────┐
//! │ table                  │ select   │ admin writes     │ operator writes  │
//! ├────────────────────────┼──────────┼──────────────────┼──────────────────┤
//! │ roles                  │ all      │ -                │ -                │
//! │ profiles               │ all      │ ins / upd / del  │ upd (own row)    │
//! │ barbers                │ all      │ ins / upd / del  │ -                │
//! │ services               │ all      │ ins / upd / del  │ -                │
//! │ payment_methods        │ all      │ ins / upd / del  │ -                │
//! │ transactions           │ all      │ ins / del        │ ins              │
//! │ transaction_items      │ all      │ ins              │ ins              │
//! │ inventory_items        │ all      │ ins / upd / del  │ upd              │
//! │ inventory_movements    │ all      │ ins              │ ins              │
//! └────────────────────────┴──────────┴──────────────────┴──────────────────┘
//! ```
//!
//! Transaction headers, their items and inventory movements are never
//! updated; items and movements are append-only for every role.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::Role;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub profile_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(profile_id: impl Into<String>, role: Role) -> Self {
        Actor {
            profile_id: profile_id.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Tables guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Roles,
    Profiles,
    Barbers,
    Services,
    PaymentMethods,
    Transactions,
    TransactionItems,
    InventoryItems,
    InventoryMovements,
}

impl Table {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Table::Roles => "roles",
            Table::Profiles => "profiles",
            Table::Barbers => "barbers",
            Table::Services => "services",
            Table::PaymentMethods => "payment_methods",
            Table::Transactions => "transactions",
            Table::TransactionItems => "transaction_items",
            Table::InventoryItems => "inventory_items",
            Table::InventoryMovements => "inventory_movements",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data operations, one per SQL verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluates the permission matrix.
///
/// `owns_row` is true when the target row belongs to the caller (only
/// meaningful for `profiles`).
pub fn permits(role: Role, table: Table, op: Operation, owns_row: bool) -> bool {
    use Operation::*;
    use Table::*;

    if op == Select {
        return true;
    }

    match (table, op) {
        // Seeded by migration, never edited at runtime.
        (Roles, _) => false,
        // Append-only audit and immutable sale lines.
        (TransactionItems | InventoryMovements, Insert) => true,
        (TransactionItems | InventoryMovements, _) => false,
        // A sale is registered, then only removed as a whole by an admin.
        (Transactions, Insert) => true,
        (Transactions, Update) => false,
        (Transactions, Delete) => role == Role::Admin,
        // Stock levels change through sales and manual movements.
        (InventoryItems, Update) => true,
        (Profiles, Update) => role == Role::Admin || owns_row,
        _ => role == Role::Admin,
    }
}

/// Authorizes an operation that does not target a caller-owned row.
pub fn authorize(actor: &Actor, table: Table, op: Operation) -> CoreResult<()> {
    check(actor, table, op, false)
}

/// Authorizes an operation on a row owned by `owner_id`.
pub fn authorize_owned(actor: &Actor, table: Table, op: Operation, owner_id: &str) -> CoreResult<()> {
    check(actor, table, op, actor.profile_id == owner_id)
}

fn check(actor: &Actor, table: Table, op: Operation, owns_row: bool) -> CoreResult<()> {
    if permits(actor.role, table, op, owns_row) {
        Ok(())
    } else {
        Err(CoreError::AccessDenied {
            role: actor.role,
            operation: op,
            table,
        })
    }
}
