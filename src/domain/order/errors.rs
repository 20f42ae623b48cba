use rust_decimal::Decimal;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order items cannot be empty")]
    EmptyItems,

    #[error("invalid line quantity: {0}")]
    InvalidQuantity(u32),

    #[error("submitted total {submitted} does not match computed total {computed}")]
    PriceMismatch {
        submitted: Decimal,
        computed: Decimal,
    },

    #[error("illegal order transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order was already delivered")]
    AlreadyDelivered,

    #[error("order was already cancelled")]
    AlreadyCancelled,

    #[error("cannot assign a rider to an order in status {0:?}")]
    AssignmentClosed(OrderStatus),
}
