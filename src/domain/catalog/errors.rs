use super::value_objects::{MeasurementUnit, UnitKind};

// ============================================================================
// Pricing Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("item sold as {unit_kind:?} has no price for {requested:?}")]
    IncompatibleUnit {
        unit_kind: UnitKind,
        requested: MeasurementUnit,
    },
}
