use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::{resolve_price, CatalogItem, MeasurementUnit};
use crate::domain::order::{OrderItem, OrderRequest};

use super::errors::CartError;
use super::value_objects::{CartLine, CartSelection};

// ============================================================================
// Cart Aggregate - the buyer's basket
// ============================================================================
//
// An ordered sequence of lines keyed by (item_id, measurement_unit).
// Repeated adds of the same key merge into one line; the same item under a
// different unit gets its own line. The stock check here is advisory only,
// against the caller's last-fetched catalog snapshot - the inventory ledger
// repeats it authoritatively at order-creation time.
//
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartAggregate {
    lines: Vec<CartLine>,
}

impl CartAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one `unit` of `item` to the cart.
    ///
    /// The price is resolved and captured now; the advisory stock check sums
    /// every line of this item across all measurement units in canonical
    /// units before letting the add through.
    pub fn add(&mut self, item: &CatalogItem, unit: MeasurementUnit) -> Result<(), CartError> {
        let unit_price = resolve_price(item, unit)?;

        let requested = unit.canonical_per_add();
        let reserved: f64 = self
            .lines
            .iter()
            .filter(|line| line.item_id == item.id)
            .map(CartLine::canonical_quantity)
            .sum();

        if reserved + requested > item.stock_quantity {
            return Err(CartError::InsufficientStock {
                available: item.stock_quantity,
                requested: reserved + requested,
            });
        }

        match self
            .lines
            .iter_mut()
            .find(|line| line.item_id == item.id && line.measurement_unit() == unit)
        {
            Some(line) => line.selection.increment(),
            None => self.lines.push(CartLine {
                item_id: item.id,
                unit_price,
                selection: CartSelection::single(item.unit_kind, unit)?,
            }),
        }

        Ok(())
    }

    /// Take one add back. Removing from a line the cart does not hold is a
    /// defined no-op, not an error.
    pub fn remove(&mut self, item_id: Uuid, unit: MeasurementUnit) {
        let Some(pos) = self
            .lines
            .iter()
            .position(|line| line.item_id == item_id && line.measurement_unit() == unit)
        else {
            return;
        };

        if self.lines[pos].selection.decrement() == 0 {
            self.lines.remove(pos);
        }
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Freeze the cart into an immutable order-creation request.
    ///
    /// The cart itself is not cleared here; the checkout caller clears it
    /// only once the downstream create has succeeded.
    pub fn submit(
        &self,
        buyer_id: Option<Uuid>,
        payment_method_id: Uuid,
    ) -> Result<OrderRequest, CartError> {
        if self.lines.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let buyer_id = buyer_id.ok_or(CartError::NotAuthenticated)?;

        let items = self
            .lines
            .iter()
            .map(|line| OrderItem {
                item_id: line.item_id,
                quantity: line.quantity(),
                unit_price: line.unit_price,
                measurement_unit: line.measurement_unit(),
            })
            .collect();

        Ok(OrderRequest {
            buyer_id,
            items,
            total_price: self.total(),
            payment_method_id,
        })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
