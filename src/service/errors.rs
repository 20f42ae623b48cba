use uuid::Uuid;

use crate::domain::cart::CartError;
use crate::domain::catalog::PricingError;
use crate::domain::order::OrderError;
use crate::domain::rider::RiderError;
use crate::inventory::InventoryError;
use crate::store::StoreError;

// ============================================================================
// Service Errors
// ============================================================================
//
// Every failure a command handler can produce, classified into the four
// contract categories callers dispatch on:
//
// - Validation:     rejected before any write; fix the request.
// - Conflict:       a read-check lost; refresh and retry.
// - PartialFailure: half-written order that could not be repaired.
// - Transport:      the backing store is unreachable.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    PartialFailure,
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Rider(#[from] RiderError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown rider: {0}")]
    UnknownRider(Uuid),

    /// The order header was written, the line write failed, and neither the
    /// retry nor the compensating delete got through.
    #[error("order {order_id} was written without its lines and could not be repaired")]
    OrphanedOrder { order_id: Uuid },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Pricing(_) => ErrorKind::Validation,

            ServiceError::Cart(err) => match err {
                CartError::InsufficientStock { .. } => ErrorKind::Conflict,
                CartError::Pricing(_) | CartError::EmptyCart | CartError::NotAuthenticated => {
                    ErrorKind::Validation
                }
            },

            ServiceError::Order(err) => match err {
                OrderError::EmptyItems
                | OrderError::InvalidQuantity(_)
                | OrderError::PriceMismatch { .. } => ErrorKind::Validation,
                OrderError::InvalidTransition { .. }
                | OrderError::AlreadyDelivered
                | OrderError::AlreadyCancelled
                | OrderError::AssignmentClosed(_) => ErrorKind::Conflict,
            },

            ServiceError::Rider(_) => ErrorKind::Validation,

            ServiceError::Inventory(err) => match err {
                InventoryError::InsufficientStock { .. } | InventoryError::UnknownItem(_) => {
                    ErrorKind::Conflict
                }
                InventoryError::Store(store) => store_kind(store),
            },

            ServiceError::Store(store) => store_kind(store),

            ServiceError::UnknownRider(_) => ErrorKind::Conflict,

            ServiceError::OrphanedOrder { .. } => ErrorKind::PartialFailure,
        }
    }
}

fn store_kind(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::Unavailable(_) => ErrorKind::Transport,
        StoreError::NotFound { .. } | StoreError::InsufficientStock { .. } => ErrorKind::Conflict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;

    #[test]
    fn classification_covers_the_contract() {
        assert_eq!(
            ServiceError::Cart(CartError::EmptyCart).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ServiceError::Cart(CartError::InsufficientStock {
                available: 1.0,
                requested: 2.0,
            })
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ServiceError::Order(OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            })
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ServiceError::Store(StoreError::Unavailable("down".into())).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            ServiceError::OrphanedOrder {
                order_id: Uuid::new_v4(),
            }
            .kind(),
            ErrorKind::PartialFailure
        );
    }
}
