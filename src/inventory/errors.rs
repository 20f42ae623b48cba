use uuid::Uuid;

use crate::store::StoreError;

// ============================================================================
// Inventory Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("not enough stock for item {item_id}: {available:.2} on hand, {requested:.2} requested")]
    InsufficientStock {
        item_id: Uuid,
        available: f64,
        requested: f64,
    },

    #[error("unknown catalog item: {0}")]
    UnknownItem(Uuid),

    #[error(transparent)]
    Store(StoreError),
}
