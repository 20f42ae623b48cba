use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::Order;

// ============================================================================
// Invoice - derived billing record for a delivered order
// ============================================================================

/// One-to-one with an order that reached Delivered. System-generated and
/// read-only: subtotal, tax, and total are computed from the order, never
/// edited directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub order_id: Uuid,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn for_order(order: &Order, tax_rate: Decimal) -> Self {
        let subtotal = order.total_price;
        let tax = subtotal * tax_rate;
        Self {
            id: Uuid::new_v4(),
            order_id: order.id,
            subtotal,
            tax,
            total: subtotal + tax,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::MeasurementUnit;
    use crate::domain::order::{OrderItem, OrderRequest};
    use rust_decimal_macros::dec;

    fn delivered_total(total: Decimal) -> Order {
        Order::from_request(OrderRequest {
            buyer_id: Uuid::new_v4(),
            items: vec![OrderItem {
                item_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: total,
                measurement_unit: MeasurementUnit::Unit,
            }],
            total_price: total,
            payment_method_id: Uuid::new_v4(),
        })
        .unwrap()
    }

    #[test]
    fn zero_tax_rate_keeps_total_equal_to_subtotal() {
        let order = delivered_total(dec!(13.00));
        let invoice = Invoice::for_order(&order, Decimal::ZERO);

        assert_eq!(invoice.order_id, order.id);
        assert_eq!(invoice.subtotal, dec!(13.00));
        assert_eq!(invoice.tax, dec!(0.00));
        assert_eq!(invoice.total, dec!(13.00));
    }

    #[test]
    fn configured_tax_rate_is_applied_on_top() {
        let order = delivered_total(dec!(100.00));
        let invoice = Invoice::for_order(&order, dec!(0.15));

        assert_eq!(invoice.tax, dec!(15.00));
        assert_eq!(invoice.total, dec!(115.00));
    }
}
