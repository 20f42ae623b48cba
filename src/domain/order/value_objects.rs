use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::MeasurementUnit;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    EnRoute,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and Cancelled absorb: no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Recorded on the order but never processed; settlement is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Pending,
}

/// One immutable order line, captured at submission time.
///
/// `quantity` counts cart adds; `measurement_unit` is kept so the stock
/// reservation (and its release on cancellation) can be converted back to
/// the item's canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub measurement_unit: MeasurementUnit,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Canonical stock this line holds: adds times the per-add factor.
    pub fn canonical_quantity(&self) -> f64 {
        f64::from(self.quantity) * self.measurement_unit.canonical_per_add()
    }
}

/// Immutable order-creation request emitted by a submitted cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub buyer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
    pub payment_method_id: Uuid,
}

/// A named way to pay, picked at checkout. Static lookup data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::EnRoute.is_terminal());
    }

    #[test]
    fn subtotal_is_price_times_quantity() {
        let line = OrderItem {
            item_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: dec!(2.50),
            measurement_unit: MeasurementUnit::Unit,
        };
        assert_eq!(line.subtotal(), dec!(7.50));
    }

    #[test]
    fn canonical_quantity_converts_kilogram_lines_to_pounds() {
        let line = OrderItem {
            item_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: dec!(4.00),
            measurement_unit: MeasurementUnit::Kilogram,
        };
        assert!((line.canonical_quantity() - 4.40924).abs() < 1e-9);
    }

    #[test]
    fn order_status_round_trips_through_json() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::EnRoute,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
        }
    }
}
