use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalog::CatalogItem;
use crate::domain::invoice::Invoice;
use crate::domain::order::{Order, OrderItem, OrderStatus, PaymentMethod};
use crate::domain::rider::Rider;

mod memory;

pub use memory::MemoryStore;

// ============================================================================
// Storage Ports - the persistence seam of the core
// ============================================================================
//
// The surrounding platform (auth, UI, HTTP) talks to a real database; this
// core only sees these traits. The in-memory implementation backs the demo
// binary and the tests. The atomic stock primitives live here because the
// check-and-decrement must happen under the store's own write lock - the
// cart's advisory check can never be trusted.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transient transport failure; the only retryable store error.
    #[error("backing store unreachable: {0}")]
    Unavailable(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("not enough stock for item {item_id}: {available:.2} on hand, {requested:.2} requested")]
    InsufficientStock {
        item_id: Uuid,
        available: f64,
        requested: f64,
    },
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl crate::utils::Transient for StoreError {
    fn is_transient(&self) -> bool {
        StoreError::is_transient(self)
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_items(&self) -> Result<Vec<CatalogItem>, StoreError>;
    async fn fetch_item(&self, item_id: Uuid) -> Result<CatalogItem, StoreError>;
    async fn insert_item(&self, item: CatalogItem) -> Result<(), StoreError>;
    async fn update_item(&self, item: CatalogItem) -> Result<(), StoreError>;
    async fn delete_item(&self, item_id: Uuid) -> Result<(), StoreError>;

    /// Atomically check `stock_quantity >= quantity` and decrement, all
    /// under the store's write lock. Fails without mutating when stock is
    /// short. Returns the updated item.
    async fn reserve_stock(&self, item_id: Uuid, quantity: f64) -> Result<CatalogItem, StoreError>;

    /// Unconditional add-back of a prior reservation.
    async fn release_stock(&self, item_id: Uuid, quantity: f64) -> Result<CatalogItem, StoreError>;

    /// Unconditional overwrite; the store operator's manual correction.
    async fn set_stock(&self, item_id: Uuid, quantity: f64) -> Result<CatalogItem, StoreError>;
}

/// Filter for order listings; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub buyer_id: Option<Uuid>,
    pub rider_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// First half of the two-step order write. The header alone is not a
    /// valid order; until its lines land it is an orphan.
    async fn insert_order_header(&self, order: &Order) -> Result<(), StoreError>;

    /// Second half: the immutable line records.
    async fn insert_order_lines(
        &self,
        order_id: Uuid,
        lines: &[OrderItem],
    ) -> Result<(), StoreError>;

    /// Compensating delete for a header whose lines never landed.
    async fn delete_order_header(&self, order_id: Uuid) -> Result<(), StoreError>;

    async fn fetch_order(&self, order_id: Uuid) -> Result<Order, StoreError>;
    async fn update_order(&self, order: &Order) -> Result<(), StoreError>;

    /// Orders matching `filter`, newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Headers with zero line records - the detectable partial-failure
    /// signature.
    async fn orphaned_headers(&self) -> Result<Vec<Uuid>, StoreError>;
}

#[async_trait]
pub trait RiderStore: Send + Sync {
    async fn insert_rider(&self, rider: &Rider) -> Result<(), StoreError>;
    async fn fetch_rider(&self, rider_id: Uuid) -> Result<Rider, StoreError>;
    async fn list_riders(&self) -> Result<Vec<Rider>, StoreError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert keyed by `order_id`; returns false (and stores nothing) when
    /// an invoice for that order already exists.
    async fn insert_invoice_once(&self, invoice: &Invoice) -> Result<bool, StoreError>;
    async fn fetch_invoice_for_order(&self, order_id: Uuid) -> Result<Invoice, StoreError>;
    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError>;
}

#[async_trait]
pub trait PaymentMethodStore: Send + Sync {
    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError>;
}
