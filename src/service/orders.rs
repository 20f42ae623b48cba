use std::sync::Arc;

use uuid::Uuid;

use crate::config::StoreConfig;
use crate::domain::cart::CartAggregate;
use crate::domain::invoice::Invoice;
use crate::domain::order::{Order, OrderCommand, OrderRequest, OrderStatus};
use crate::domain::rider::RiderStatus;
use crate::inventory::InventoryLedger;
use crate::metrics::Metrics;
use crate::store::{InvoiceStore, OrderFilter, OrderStore, RiderStore, StoreError};
use crate::utils::retry_transient;

use super::errors::ServiceError;

// ============================================================================
// Order Service - command handler for the order lifecycle
// ============================================================================
//
// Orchestrates: request validation -> stock reservation -> two-step
// persistence -> lifecycle transitions with their side effects (invoice on
// delivery, stock release on cancellation).
//
// The header and line writes have no enclosing transaction. A failed line
// write is retried, then the header is compensated away; only when both
// fail does the caller see the orphan, as its own error.
//
// ============================================================================

/// Partial update for an order: either field may be set on its own.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub rider_id: Option<Uuid>,
}

pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    riders: Arc<dyn RiderStore>,
    invoices: Arc<dyn InvoiceStore>,
    ledger: InventoryLedger,
    config: StoreConfig,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        riders: Arc<dyn RiderStore>,
        invoices: Arc<dyn InvoiceStore>,
        ledger: InventoryLedger,
        config: StoreConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            orders,
            riders,
            invoices,
            ledger,
            config,
            metrics,
        }
    }

    /// Persist a submitted order request.
    ///
    /// The submitted total is re-validated against the line subtotals before
    /// anything is written. Stock is then reserved per line - this is the
    /// authoritative check; the cart's advisory check may have passed against
    /// a stale snapshot. A line that cannot be reserved hands back every
    /// reservation already taken for this request.
    pub async fn create(&self, request: OrderRequest) -> Result<Order, ServiceError> {
        let order = match Order::from_request(request) {
            Ok(order) => order,
            Err(err) => {
                self.metrics
                    .order_rejections
                    .with_label_values(&["validation"])
                    .inc();
                return Err(err.into());
            }
        };

        let mut reserved: Vec<(Uuid, f64)> = Vec::new();
        for line in &order.items {
            let quantity = line.canonical_quantity();
            match self.ledger.reserve(line.item_id, quantity).await {
                Ok(_) => reserved.push((line.item_id, quantity)),
                Err(err) => {
                    self.metrics
                        .order_rejections
                        .with_label_values(&["stock"])
                        .inc();
                    self.release_reservations(&reserved).await;
                    return Err(err.into());
                }
            }
        }

        if let Err(err) = self.orders.insert_order_header(&order).await {
            self.release_reservations(&reserved).await;
            return Err(err.into());
        }

        let backoff = self.config.line_write_backoff();
        let line_write = retry_transient(&backoff, "order line write", || {
            self.orders.insert_order_lines(order.id, &order.items)
        })
        .await;

        if let Err(line_err) = line_write {
            tracing::error!(
                order_id = %order.id,
                error = %line_err,
                "order line write failed, compensating header"
            );
            let compensation = retry_transient(&backoff, "order header compensation", || {
                self.orders.delete_order_header(order.id)
            })
            .await;
            self.release_reservations(&reserved).await;

            return match compensation {
                Ok(()) => {
                    self.metrics
                        .order_write_repairs
                        .with_label_values(&["compensated"])
                        .inc();
                    Err(ServiceError::Store(line_err))
                }
                Err(delete_err) => {
                    tracing::error!(
                        order_id = %order.id,
                        error = %delete_err,
                        "compensating delete failed, order header is orphaned"
                    );
                    self.metrics
                        .order_write_repairs
                        .with_label_values(&["orphaned"])
                        .inc();
                    Err(ServiceError::OrphanedOrder { order_id: order.id })
                }
            };
        }

        self.metrics.orders_created.inc();
        tracing::info!(
            order_id = %order.id,
            buyer_id = %order.buyer_id,
            line_count = order.items.len(),
            total = %order.total_price,
            "order created"
        );
        Ok(order)
    }

    /// Submit a cart and clear it - but only once the create has succeeded,
    /// so a rejected order leaves the basket intact for the buyer to fix.
    pub async fn checkout(
        &self,
        cart: &mut CartAggregate,
        buyer_id: Option<Uuid>,
        payment_method_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let request = cart.submit(buyer_id, payment_method_id)?;
        let order = self.create(request).await?;
        cart.clear();
        Ok(order)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        Ok(self.orders.fetch_order(order_id).await?)
    }

    /// Orders matching `filter`, newest first.
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.list_orders(&filter).await?)
    }

    /// Partial update: a status moves the lifecycle along, a bare rider id
    /// assigns without a status change, and an empty patch is a defined
    /// no-op that returns the order as stored.
    pub async fn update(&self, order_id: Uuid, patch: OrderPatch) -> Result<Order, ServiceError> {
        match patch {
            OrderPatch {
                status: Some(target),
                rider_id,
            } => self.transition(order_id, target, rider_id).await,
            OrderPatch {
                status: None,
                rider_id: Some(rider_id),
            } => self.assign_rider(order_id, rider_id).await,
            OrderPatch {
                status: None,
                rider_id: None,
            } => {
                tracing::debug!(order_id = %order_id, "empty order patch");
                self.get(order_id).await
            }
        }
    }

    pub async fn assign_rider(
        &self,
        order_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Order, ServiceError> {
        self.ensure_rider(rider_id).await?;

        let mut order = self.orders.fetch_order(order_id).await?;
        order.apply(&OrderCommand::AssignRider { rider_id })?;
        self.orders.update_order(&order).await?;

        tracing::info!(order_id = %order_id, rider_id = %rider_id, "rider assigned");
        Ok(order)
    }

    /// Move an order along its lifecycle, with side effects on arrival:
    /// reaching Delivered generates the invoice exactly once, reaching
    /// Cancelled hands every line's reservation back to stock.
    pub async fn transition(
        &self,
        order_id: Uuid,
        target: OrderStatus,
        rider_id: Option<Uuid>,
    ) -> Result<Order, ServiceError> {
        if let Some(rider_id) = rider_id {
            self.ensure_rider(rider_id).await?;
        }

        let mut order = self.orders.fetch_order(order_id).await?;
        let from = order.status;
        order.apply(&OrderCommand::Transition { target, rider_id })?;
        self.orders.update_order(&order).await?;

        match order.status {
            OrderStatus::Delivered => {
                let invoice = Invoice::for_order(&order, self.config.tax_rate);
                if self.invoices.insert_invoice_once(&invoice).await? {
                    tracing::info!(
                        order_id = %order.id,
                        invoice_id = %invoice.id,
                        total = %invoice.total,
                        "invoice generated"
                    );
                } else {
                    // The transition rules make this unreachable from a
                    // consistent store; keep the write idempotent anyway.
                    tracing::warn!(order_id = %order.id, "invoice already on file");
                }
                self.metrics.orders_delivered.inc();
            }
            OrderStatus::Cancelled => {
                for line in &order.items {
                    if let Err(err) = self
                        .ledger
                        .release(line.item_id, line.canonical_quantity())
                        .await
                    {
                        tracing::error!(
                            order_id = %order.id,
                            item_id = %line.item_id,
                            error = %err,
                            "failed to release stock for cancelled order"
                        );
                    }
                }
                self.metrics.orders_cancelled.inc();
            }
            _ => {}
        }

        tracing::info!(
            order_id = %order.id,
            from = ?from,
            to = ?order.status,
            "order transitioned"
        );
        Ok(order)
    }

    /// Sweep headers whose line records never landed (a crash between the
    /// two writes) and delete them. Stock debited by a crashed creator is
    /// reconciled through the operator's manual adjustment path.
    pub async fn repair_orphaned_orders(&self) -> Result<usize, ServiceError> {
        let orphans = self.orders.orphaned_headers().await?;
        for order_id in &orphans {
            tracing::warn!(order_id = %order_id, "deleting orphaned order header");
            self.orders.delete_order_header(*order_id).await?;
            self.metrics
                .order_write_repairs
                .with_label_values(&["swept"])
                .inc();
        }
        Ok(orphans.len())
    }

    async fn ensure_rider(&self, rider_id: Uuid) -> Result<(), ServiceError> {
        match self.riders.fetch_rider(rider_id).await {
            Ok(rider) => {
                if rider.status == RiderStatus::Inactive {
                    tracing::warn!(rider_id = %rider_id, "assigning an inactive rider");
                }
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Err(ServiceError::UnknownRider(rider_id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn release_reservations(&self, reserved: &[(Uuid, f64)]) {
        for (item_id, quantity) in reserved {
            if let Err(err) = self.ledger.release(*item_id, *quantity).await {
                tracing::error!(
                    item_id = %item_id,
                    error = %err,
                    "failed to hand back a reservation"
                );
            }
        }
    }
}
