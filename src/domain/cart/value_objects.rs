use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::{MeasurementUnit, PricingError, UnitKind};

// ============================================================================
// Cart Value Objects
// ============================================================================
//
// The measurement unit a line was added under is part of the line's type:
// a weighted selection carries its weight unit, a discrete or bundle
// selection has none to carry. Two lines for the same item under different
// units are distinct entities.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    Kilogram,
    Pound,
}

impl From<WeightUnit> for MeasurementUnit {
    fn from(unit: WeightUnit) -> Self {
        match unit {
            WeightUnit::Kilogram => MeasurementUnit::Kilogram,
            WeightUnit::Pound => MeasurementUnit::Pound,
        }
    }
}

/// What was selected and how often. `quantity` counts adds and is ≥ 1 for
/// any line that exists; a line that reaches zero is removed from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartSelection {
    Discrete { quantity: u32 },
    Weighted { unit: WeightUnit, quantity: u32 },
    Bundle { quantity: u32 },
}

impl CartSelection {
    /// A single add of `unit` against an item sold as `unit_kind`.
    pub fn single(unit_kind: UnitKind, unit: MeasurementUnit) -> Result<Self, PricingError> {
        match (unit_kind, unit) {
            (UnitKind::Discrete, MeasurementUnit::Unit) => Ok(Self::Discrete { quantity: 1 }),
            (UnitKind::Bundle, MeasurementUnit::Unit) => Ok(Self::Bundle { quantity: 1 }),
            (UnitKind::Weighted, MeasurementUnit::Kilogram) => Ok(Self::Weighted {
                unit: WeightUnit::Kilogram,
                quantity: 1,
            }),
            (UnitKind::Weighted, MeasurementUnit::Pound) => Ok(Self::Weighted {
                unit: WeightUnit::Pound,
                quantity: 1,
            }),
            (unit_kind, requested) => Err(PricingError::IncompatibleUnit {
                unit_kind,
                requested,
            }),
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            Self::Discrete { quantity }
            | Self::Weighted { quantity, .. }
            | Self::Bundle { quantity } => *quantity,
        }
    }

    pub fn measurement_unit(&self) -> MeasurementUnit {
        match self {
            Self::Discrete { .. } | Self::Bundle { .. } => MeasurementUnit::Unit,
            Self::Weighted { unit, .. } => MeasurementUnit::from(*unit),
        }
    }

    pub fn increment(&mut self) {
        match self {
            Self::Discrete { quantity }
            | Self::Weighted { quantity, .. }
            | Self::Bundle { quantity } => *quantity += 1,
        }
    }

    /// Returns the quantity left after the decrement.
    pub fn decrement(&mut self) -> u32 {
        match self {
            Self::Discrete { quantity }
            | Self::Weighted { quantity, .. }
            | Self::Bundle { quantity } => {
                *quantity = quantity.saturating_sub(1);
                *quantity
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: Uuid,
    /// Captured when the line is first added; later catalog price changes
    /// never touch an existing line.
    pub unit_price: Decimal,
    pub selection: CartSelection,
}

impl CartLine {
    pub fn quantity(&self) -> u32 {
        self.selection.quantity()
    }

    pub fn measurement_unit(&self) -> MeasurementUnit {
        self.selection.measurement_unit()
    }

    /// Stock this line holds, in the item's canonical unit.
    pub fn canonical_quantity(&self) -> f64 {
        f64::from(self.quantity()) * self.measurement_unit().canonical_per_add()
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::KG_TO_LB;
    use rust_decimal_macros::dec;

    #[test]
    fn selection_rejects_incompatible_pairings() {
        assert!(CartSelection::single(UnitKind::Discrete, MeasurementUnit::Kilogram).is_err());
        assert!(CartSelection::single(UnitKind::Weighted, MeasurementUnit::Unit).is_err());
        assert!(CartSelection::single(UnitKind::Bundle, MeasurementUnit::Pound).is_err());
    }

    #[test]
    fn weighted_line_converts_to_canonical_pounds() {
        let line = CartLine {
            item_id: Uuid::new_v4(),
            unit_price: dec!(4.00),
            selection: CartSelection::Weighted {
                unit: WeightUnit::Kilogram,
                quantity: 2,
            },
        };
        assert!((line.canonical_quantity() - 2.0 * KG_TO_LB).abs() < 1e-9);
        assert_eq!(line.line_total(), dec!(8.00));
    }

    #[test]
    fn increment_and_decrement_track_adds() {
        let mut selection = CartSelection::single(UnitKind::Bundle, MeasurementUnit::Unit).unwrap();
        selection.increment();
        assert_eq!(selection.quantity(), 2);
        assert_eq!(selection.decrement(), 1);
        assert_eq!(selection.decrement(), 0);
    }
}
