use std::sync::Arc;

use uuid::Uuid;

use crate::domain::catalog::CatalogItem;
use crate::metrics::Metrics;
use crate::store::{CatalogStore, StoreError};

pub mod errors;

pub use errors::InventoryError;

// ============================================================================
// Inventory Ledger - the authoritative stock record
// ============================================================================
//
// The cart's stock check reads a possibly-stale snapshot and can never be
// trusted; this ledger is where stock is actually committed. Reservations
// happen exactly once per accepted order line, at order-creation time, via
// the store's atomic check-and-decrement.
//
// ============================================================================

#[derive(Clone)]
pub struct InventoryLedger {
    catalog: Arc<dyn CatalogStore>,
    metrics: Arc<Metrics>,
}

impl InventoryLedger {
    pub fn new(catalog: Arc<dyn CatalogStore>, metrics: Arc<Metrics>) -> Self {
        Self { catalog, metrics }
    }

    /// Commit `canonical_quantity` of stock against an order line.
    ///
    /// Atomic with the availability check; a refused reservation leaves the
    /// stock untouched.
    pub async fn reserve(
        &self,
        item_id: Uuid,
        canonical_quantity: f64,
    ) -> Result<CatalogItem, InventoryError> {
        match self.catalog.reserve_stock(item_id, canonical_quantity).await {
            Ok(item) => {
                tracing::debug!(
                    item_id = %item_id,
                    reserved = canonical_quantity,
                    remaining = item.stock_quantity,
                    "stock reserved"
                );
                if item.stock_quantity <= item.reorder_threshold {
                    tracing::warn!(
                        item_id = %item_id,
                        item_name = %item.name,
                        remaining = item.stock_quantity,
                        threshold = item.reorder_threshold,
                        "stock at or below reorder threshold"
                    );
                }
                Ok(item)
            }
            Err(StoreError::InsufficientStock {
                item_id,
                available,
                requested,
            }) => {
                self.metrics.reservation_failures.inc();
                Err(InventoryError::InsufficientStock {
                    item_id,
                    available,
                    requested,
                })
            }
            Err(StoreError::NotFound { id, .. }) => Err(InventoryError::UnknownItem(id)),
            Err(err) => Err(InventoryError::Store(err)),
        }
    }

    /// Hand a reservation back, e.g. when an order cancels before
    /// fulfillment.
    pub async fn release(
        &self,
        item_id: Uuid,
        canonical_quantity: f64,
    ) -> Result<CatalogItem, InventoryError> {
        match self.catalog.release_stock(item_id, canonical_quantity).await {
            Ok(item) => {
                tracing::debug!(
                    item_id = %item_id,
                    released = canonical_quantity,
                    stock = item.stock_quantity,
                    "stock released"
                );
                Ok(item)
            }
            Err(StoreError::NotFound { id, .. }) => Err(InventoryError::UnknownItem(id)),
            Err(err) => Err(InventoryError::Store(err)),
        }
    }

    /// The store operator's manual correction: overwrite the level, no
    /// questions asked.
    pub async fn adjust(
        &self,
        item_id: Uuid,
        new_quantity: f64,
    ) -> Result<CatalogItem, InventoryError> {
        match self.catalog.set_stock(item_id, new_quantity).await {
            Ok(item) => {
                tracing::info!(
                    item_id = %item_id,
                    item_name = %item.name,
                    stock = item.stock_quantity,
                    "stock adjusted manually"
                );
                Ok(item)
            }
            Err(StoreError::NotFound { id, .. }) => Err(InventoryError::UnknownItem(id)),
            Err(err) => Err(InventoryError::Store(err)),
        }
    }
}
