// ============================================================================
// fresh_market - order-processing core for a perishable-goods store
// ============================================================================
//
// One store, three actors: buyers fill carts against a priced catalog,
// the store operator runs stock and dispatch, riders deliver. This crate
// is the engine behind that flow - pricing, the cart, the inventory
// ledger, and the order lifecycle - with persistence behind trait ports.
// Auth, UI, and transport are other people's problems.
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod inventory;
pub mod metrics;
pub mod service;
pub mod store;
pub mod utils;
