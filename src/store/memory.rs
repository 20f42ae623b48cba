use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::catalog::CatalogItem;
use crate::domain::invoice::Invoice;
use crate::domain::order::{Order, OrderItem, PaymentMethod};
use crate::domain::rider::Rider;

use super::{
    CatalogStore, InvoiceStore, OrderFilter, OrderStore, PaymentMethodStore, RiderStore,
    StoreError,
};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Backs the demo binary and the tests. One RwLock over the whole state keeps
// the reserve/release primitives trivially atomic; contention is not a
// concern at single-store scale.
//
// Orders are stored the way the real schema stores them: header row and
// line rows separately, so a header whose lines never landed is observable
// here exactly as it would be in the database.
//
// ============================================================================

#[derive(Default)]
struct State {
    items: HashMap<Uuid, CatalogItem>,
    order_headers: HashMap<Uuid, Order>,
    order_lines: HashMap<Uuid, Vec<OrderItem>>,
    riders: HashMap<Uuid, Rider>,
    invoices: HashMap<Uuid, Invoice>, // keyed by order_id
    payment_methods: Vec<PaymentMethod>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the default payment methods.
    pub fn with_default_payment_methods() -> Self {
        let mut state = State::default();
        for name in ["Cash on delivery", "Card on delivery", "Bank transfer"] {
            state.payment_methods.push(PaymentMethod {
                id: Uuid::new_v4(),
                name: name.to_string(),
            });
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_items(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let state = self.state.read().await;
        Ok(state.items.values().cloned().collect())
    }

    async fn fetch_item(&self, item_id: Uuid) -> Result<CatalogItem, StoreError> {
        let state = self.state.read().await;
        state
            .items
            .get(&item_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "catalog item",
                id: item_id,
            })
    }

    async fn insert_item(&self, item: CatalogItem) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.items.insert(item.id, item);
        Ok(())
    }

    async fn update_item(&self, item: CatalogItem) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.items.contains_key(&item.id) {
            return Err(StoreError::NotFound {
                entity: "catalog item",
                id: item.id,
            });
        }
        state.items.insert(item.id, item);
        Ok(())
    }

    async fn delete_item(&self, item_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.items.remove(&item_id).ok_or(StoreError::NotFound {
            entity: "catalog item",
            id: item_id,
        })?;
        Ok(())
    }

    async fn reserve_stock(&self, item_id: Uuid, quantity: f64) -> Result<CatalogItem, StoreError> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&item_id).ok_or(StoreError::NotFound {
            entity: "catalog item",
            id: item_id,
        })?;

        if item.stock_quantity < quantity {
            return Err(StoreError::InsufficientStock {
                item_id,
                available: item.stock_quantity,
                requested: quantity,
            });
        }

        item.stock_quantity -= quantity;
        Ok(item.clone())
    }

    async fn release_stock(&self, item_id: Uuid, quantity: f64) -> Result<CatalogItem, StoreError> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&item_id).ok_or(StoreError::NotFound {
            entity: "catalog item",
            id: item_id,
        })?;
        item.stock_quantity += quantity;
        Ok(item.clone())
    }

    async fn set_stock(&self, item_id: Uuid, quantity: f64) -> Result<CatalogItem, StoreError> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&item_id).ok_or(StoreError::NotFound {
            entity: "catalog item",
            id: item_id,
        })?;
        item.stock_quantity = quantity;
        Ok(item.clone())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order_header(&self, order: &Order) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let mut header = order.clone();
        // Lines live in their own records; the header row carries none.
        header.items = Vec::new();
        state.order_headers.insert(header.id, header);
        Ok(())
    }

    async fn insert_order_lines(
        &self,
        order_id: Uuid,
        lines: &[OrderItem],
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.order_headers.contains_key(&order_id) {
            return Err(StoreError::NotFound {
                entity: "order",
                id: order_id,
            });
        }
        state.order_lines.insert(order_id, lines.to_vec());
        Ok(())
    }

    async fn delete_order_header(&self, order_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.order_headers.remove(&order_id);
        state.order_lines.remove(&order_id);
        Ok(())
    }

    async fn fetch_order(&self, order_id: Uuid) -> Result<Order, StoreError> {
        let state = self.state.read().await;
        let mut order = state
            .order_headers
            .get(&order_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "order",
                id: order_id,
            })?;
        order.items = state.order_lines.get(&order_id).cloned().unwrap_or_default();
        Ok(order)
    }

    async fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.order_headers.contains_key(&order.id) {
            return Err(StoreError::NotFound {
                entity: "order",
                id: order.id,
            });
        }
        let mut header = order.clone();
        header.items = Vec::new();
        state.order_headers.insert(header.id, header);
        Ok(())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .order_headers
            .values()
            .filter(|order| {
                filter.buyer_id.is_none_or(|id| order.buyer_id == id)
                    && filter.rider_id.is_none_or(|id| order.rider_id == Some(id))
                    && filter.status.is_none_or(|status| order.status == status)
            })
            .cloned()
            .map(|mut order| {
                order.items = state.order_lines.get(&order.id).cloned().unwrap_or_default();
                order
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn orphaned_headers(&self) -> Result<Vec<Uuid>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .order_headers
            .keys()
            .filter(|id| {
                state
                    .order_lines
                    .get(id)
                    .is_none_or(|lines| lines.is_empty())
            })
            .copied()
            .collect())
    }
}

#[async_trait]
impl RiderStore for MemoryStore {
    async fn insert_rider(&self, rider: &Rider) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.riders.insert(rider.id, rider.clone());
        Ok(())
    }

    async fn fetch_rider(&self, rider_id: Uuid) -> Result<Rider, StoreError> {
        let state = self.state.read().await;
        state
            .riders
            .get(&rider_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "rider",
                id: rider_id,
            })
    }

    async fn list_riders(&self) -> Result<Vec<Rider>, StoreError> {
        let state = self.state.read().await;
        let mut riders: Vec<Rider> = state.riders.values().cloned().collect();
        riders.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(riders)
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn insert_invoice_once(&self, invoice: &Invoice) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.invoices.contains_key(&invoice.order_id) {
            return Ok(false);
        }
        state.invoices.insert(invoice.order_id, invoice.clone());
        Ok(true)
    }

    async fn fetch_invoice_for_order(&self, order_id: Uuid) -> Result<Invoice, StoreError> {
        let state = self.state.read().await;
        state
            .invoices
            .get(&order_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "invoice",
                id: order_id,
            })
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        let state = self.state.read().await;
        let mut invoices: Vec<Invoice> = state.invoices.values().cloned().collect();
        invoices.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(invoices)
    }
}

#[async_trait]
impl PaymentMethodStore for MemoryStore {
    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError> {
        let state = self.state.read().await;
        Ok(state.payment_methods.clone())
    }
}
