use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog Value Objects
// ============================================================================

/// Pounds per kilogram, used when converting a kilogram selection into an
/// item's canonical stock unit (weighted stock is tracked in pounds).
pub const KG_TO_LB: f64 = 2.20462;

/// How an item is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    /// Whole-unit count (e.g. one lettuce).
    Discrete,
    /// Sold by mass, priced per kilogram or per pound.
    Weighted,
    /// Fixed mixed-content package sold as a single discrete unit.
    Bundle,
}

/// The unit a buyer picks when adding an item to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementUnit {
    Unit,
    Kilogram,
    Pound,
}

impl MeasurementUnit {
    /// Canonical stock consumed by a single add in this unit.
    ///
    /// Weighted stock is tracked in pounds, so one kilogram add consumes
    /// `KG_TO_LB` pounds; every other unit maps one-to-one.
    pub fn canonical_per_add(&self) -> f64 {
        match self {
            MeasurementUnit::Kilogram => KG_TO_LB,
            MeasurementUnit::Unit | MeasurementUnit::Pound => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub unit_kind: UnitKind,

    // Only the price fields relevant to `unit_kind` are meaningful. The
    // others are carried as-is and ignored, never validated to zero.
    pub price_unit: Decimal,
    pub price_kilogram: Decimal,
    pub price_pound: Decimal,

    /// Stock in the item's canonical unit: pounds for weighted, count
    /// otherwise. Fractional for weighted items.
    pub stock_quantity: f64,
    pub reorder_threshold: f64,
    pub cost_basis: Decimal,

    pub expiry_date: Option<DateTime<Utc>>,
    pub is_listed: bool,
    pub created_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Label for the canonical stock unit, for operator-facing messages.
    pub fn canonical_unit_label(&self) -> &'static str {
        match self.unit_kind {
            UnitKind::Weighted => "lb",
            UnitKind::Discrete => "units",
            UnitKind::Bundle => "packages",
        }
    }
}

/// A catalog item with the freshness discount applied for one response.
///
/// Computed transiently on every catalog read and never persisted, so an
/// item crossing the freshness window changes price without any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedCatalogItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub discount_fraction: Option<Decimal>,
    pub reference_price: Option<Decimal>,
}

impl PricedCatalogItem {
    pub fn undiscounted(item: CatalogItem) -> Self {
        Self {
            item,
            discount_fraction: None,
            reference_price: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn weighted_item(stock_lb: f64) -> CatalogItem {
        CatalogItem {
            id: Uuid::new_v4(),
            name: "Pork shoulder".to_string(),
            description: "Fresh cut".to_string(),
            category: "Meat".to_string(),
            image_url: String::new(),
            unit_kind: UnitKind::Weighted,
            price_unit: Decimal::ZERO,
            price_kilogram: dec!(4.00),
            price_pound: dec!(1.81),
            stock_quantity: stock_lb,
            reorder_threshold: 5.0,
            cost_basis: dec!(1.10),
            expiry_date: None,
            is_listed: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn kilogram_add_consumes_pounds() {
        assert_eq!(MeasurementUnit::Kilogram.canonical_per_add(), KG_TO_LB);
        assert_eq!(MeasurementUnit::Pound.canonical_per_add(), 1.0);
        assert_eq!(MeasurementUnit::Unit.canonical_per_add(), 1.0);
    }

    #[test]
    fn canonical_unit_label_follows_unit_kind() {
        let mut item = weighted_item(10.0);
        assert_eq!(item.canonical_unit_label(), "lb");
        item.unit_kind = UnitKind::Discrete;
        assert_eq!(item.canonical_unit_label(), "units");
        item.unit_kind = UnitKind::Bundle;
        assert_eq!(item.canonical_unit_label(), "packages");
    }

    #[test]
    fn priced_item_serializes_flat() {
        let priced = PricedCatalogItem {
            item: weighted_item(2.0),
            discount_fraction: Some(dec!(0.30)),
            reference_price: Some(dec!(10.00)),
        };

        let json = serde_json::to_value(&priced).unwrap();
        assert!(json.get("name").is_some());
        assert!(json.get("discount_fraction").is_some());
    }
}
