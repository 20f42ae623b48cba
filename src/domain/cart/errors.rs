use crate::domain::catalog::PricingError;

// ============================================================================
// Cart Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("not enough stock: {available:.2} available, cart would hold {requested:.2}")]
    InsufficientStock { available: f64, requested: f64 },

    #[error("cart is empty")]
    EmptyCart,

    #[error("a signed-in buyer is required to place an order")]
    NotAuthenticated,
}
