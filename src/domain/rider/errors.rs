use super::value_objects::VehicleKind;

// ============================================================================
// Rider Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RiderError {
    #[error("a plate number is required for {0:?} riders")]
    PlateRequired(VehicleKind),
}
