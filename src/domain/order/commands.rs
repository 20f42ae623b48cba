use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands - store/rider intent after creation
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    /// Attach a rider without touching the status.
    AssignRider { rider_id: Uuid },
    /// Move the order along its lifecycle. `rider_id` lets a rider accept
    /// the delivery in the same call that dispatches it.
    Transition {
        target: OrderStatus,
        rider_id: Option<Uuid>,
    },
}
