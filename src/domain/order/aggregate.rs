use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderRequest, OrderStatus, PaymentStatus};

// ============================================================================
// Order Aggregate - lifecycle state machine
// ============================================================================
//
// Legal edges:
//
//   Pending -> EnRoute -> Delivered
//   Pending -> Cancelled
//   EnRoute -> Cancelled
//
// Delivered and Cancelled are terminal. Every command is validated before
// any field changes, so a rejected command leaves the order untouched.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,

    /// Immutable once created; prices are the ones captured in the cart.
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,

    pub status: OrderStatus,
    pub rider_id: Option<Uuid>,

    pub payment_method_id: Uuid,
    pub payment_status: PaymentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a new Pending order from a submitted cart request.
    ///
    /// Re-validates everything the client claims: non-empty lines, positive
    /// quantities, and that the submitted total equals the sum of line
    /// subtotals. A mismatch is rejected before any write happens.
    pub fn from_request(request: OrderRequest) -> Result<Self, OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        for item in &request.items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
        }

        let computed: Decimal = request.items.iter().map(OrderItem::subtotal).sum();
        if computed != request.total_price {
            return Err(OrderError::PriceMismatch {
                submitted: request.total_price,
                computed,
            });
        }

        let now = Utc::now();
        Ok(Self {
            // v7 ids sort by creation time, which keeps order listings cheap.
            id: Uuid::now_v7(),
            buyer_id: request.buyer_id,
            items: request.items,
            total_price: request.total_price,
            status: OrderStatus::Pending,
            rider_id: None,
            payment_method_id: request.payment_method_id,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, command: &OrderCommand) -> Result<(), OrderError> {
        match command {
            OrderCommand::AssignRider { rider_id } => self.assign_rider(*rider_id),
            OrderCommand::Transition { target, rider_id } => {
                self.transition(*target, *rider_id)
            }
        }
    }

    /// Attach a rider. Legal while the order is still in flight; does not
    /// change the status.
    pub fn assign_rider(&mut self, rider_id: Uuid) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Pending | OrderStatus::EnRoute => {
                self.rider_id = Some(rider_id);
                self.updated_at = Utc::now();
                Ok(())
            }
            status => Err(OrderError::AssignmentClosed(status)),
        }
    }

    /// Move the order to `target`, enforcing edge legality.
    ///
    /// Dispatching requires a rider: either one already assigned or one
    /// supplied here (a rider accepting the delivery). An edge that is not
    /// listed fails and mutates nothing.
    pub fn transition(
        &mut self,
        target: OrderStatus,
        rider_id: Option<Uuid>,
    ) -> Result<(), OrderError> {
        let from = self.status;
        match (from, target) {
            (OrderStatus::Delivered, OrderStatus::Delivered) => {
                return Err(OrderError::AlreadyDelivered)
            }
            (OrderStatus::Cancelled, OrderStatus::Cancelled) => {
                return Err(OrderError::AlreadyCancelled)
            }
            (OrderStatus::Pending, OrderStatus::EnRoute) => {
                let Some(rider) = rider_id.or(self.rider_id) else {
                    return Err(OrderError::InvalidTransition { from, to: target });
                };
                self.rider_id = Some(rider);
                self.status = OrderStatus::EnRoute;
            }
            (OrderStatus::EnRoute, OrderStatus::Delivered) => {
                self.status = OrderStatus::Delivered;
            }
            (OrderStatus::Pending | OrderStatus::EnRoute, OrderStatus::Cancelled) => {
                self.status = OrderStatus::Cancelled;
            }
            (from, to) => return Err(OrderError::InvalidTransition { from, to }),
        }

        self.updated_at = Utc::now();
        Ok(())
    }
}
