//! # Inventory Commands
//!
//! Stock list, low-stock alert, item creation, manual movements and the
//! per-item movement history.
//!
//! ```text
//! backoffice inventory move <ITEM> in 12     ◄── delivery
//! backoffice inventory move <ITEM> out 1     ◄── used in the shop
//! backoffice inventory history <ITEM>        ◄── item + movements, newest first
//! ```

use clipper_core::{InventoryItem, InventoryMovement, MovementDirection, MovementDraft, Quantity};
use clipper_db::{NewInventoryItem, Session};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ItemHistory {
    pub item: InventoryItem,
    pub movements: Vec<InventoryMovement>,
}

/// Values for a new item, as given on the command line.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub name: String,
    pub sku: Option<String>,
    pub unit: Option<String>,
    pub quantity: Quantity,
    pub min_quantity: Option<Quantity>,
}

pub async fn list(session: &Session) -> Result<Vec<InventoryItem>, ApiError> {
    Ok(session.list_inventory().await?)
}

pub async fn low_stock(session: &Session) -> Result<Vec<InventoryItem>, ApiError> {
    Ok(session.low_stock().await?)
}

pub async fn add(session: &Session, input: AddItem) -> Result<InventoryItem, ApiError> {
    let mut new_item = NewInventoryItem::new(input.name, input.quantity);
    if let Some(sku) = input.sku {
        new_item = new_item.sku(sku);
    }
    if let Some(unit) = input.unit {
        new_item = new_item.unit(unit);
    }
    if let Some(min) = input.min_quantity {
        new_item = new_item.min_quantity(min);
    }

    Ok(session.create_inventory_item(&new_item).await?)
}

/// Records a manual movement and returns the item with its new quantity.
pub async fn move_stock(
    session: &Session,
    item_id: &str,
    direction: MovementDirection,
    quantity: Quantity,
    notes: Option<String>,
) -> Result<InventoryItem, ApiError> {
    let mut draft = MovementDraft::new(item_id, direction, quantity);
    if let Some(notes) = notes {
        draft = draft.with_notes(notes);
    }

    Ok(session.record_movement(&draft).await?)
}

pub async fn history(session: &Session, item_id: &str) -> Result<ItemHistory, ApiError> {
    let item = session.get_inventory_item(item_id).await?;
    let movements = session.movements(item_id).await?;
    Ok(ItemHistory { item, movements })
}
