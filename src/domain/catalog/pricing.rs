use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::errors::PricingError;
use super::value_objects::{CatalogItem, MeasurementUnit, PricedCatalogItem, UnitKind};

// ============================================================================
// Pricing Engine - unit price resolution and freshness discounts
// ============================================================================

/// Resolve the unit price of an item for the measurement unit the buyer
/// picked.
///
/// Discrete and bundle items only sell per unit; weighted items only sell
/// per kilogram or per pound. Any other pairing is a buyer error, not a
/// missing price.
pub fn resolve_price(
    item: &CatalogItem,
    unit: MeasurementUnit,
) -> Result<Decimal, PricingError> {
    match (item.unit_kind, unit) {
        (UnitKind::Discrete | UnitKind::Bundle, MeasurementUnit::Unit) => Ok(item.price_unit),
        (UnitKind::Weighted, MeasurementUnit::Kilogram) => Ok(item.price_kilogram),
        (UnitKind::Weighted, MeasurementUnit::Pound) => Ok(item.price_pound),
        (unit_kind, requested) => Err(PricingError::IncompatibleUnit {
            unit_kind,
            requested,
        }),
    }
}

/// Freshness-discount policy: items expiring inside the window are marked
/// down by `discount_fraction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreshnessPolicy {
    pub window_days: f64,
    pub discount_fraction: Decimal,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            window_days: 2.0,
            discount_fraction: dec!(0.30),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    policy: FreshnessPolicy,
}

impl PricingEngine {
    pub fn new(policy: FreshnessPolicy) -> Self {
        Self { policy }
    }

    /// Apply the freshness discount to one catalog item.
    ///
    /// Fires only while `0 < expiry_date - now < window` (fractional days).
    /// Already-expired items and items with no expiry date pass through
    /// unchanged. Only the flat unit price is marked down; per-kilogram and
    /// per-pound prices stay at the operator-set rate.
    ///
    /// Pure and side-effect-free: recomputed on every catalog read, so any
    /// refresh cadence is safe and no write happens when an item crosses the
    /// window boundary.
    pub fn apply_freshness_discount(
        &self,
        item: CatalogItem,
        now: DateTime<Utc>,
    ) -> PricedCatalogItem {
        let Some(expiry) = item.expiry_date else {
            return PricedCatalogItem::undiscounted(item);
        };

        let days_left = (expiry - now).num_seconds() as f64 / 86_400.0;
        if days_left <= 0.0 || days_left >= self.policy.window_days {
            return PricedCatalogItem::undiscounted(item);
        }

        let reference = item.price_unit;
        let mut item = item;
        item.price_unit = reference * (Decimal::ONE - self.policy.discount_fraction);

        PricedCatalogItem {
            item,
            discount_fraction: Some(self.policy.discount_fraction),
            reference_price: Some(reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn item(unit_kind: UnitKind) -> CatalogItem {
        CatalogItem {
            id: Uuid::new_v4(),
            name: "Tomatoes".to_string(),
            description: String::new(),
            category: "Vegetables".to_string(),
            image_url: String::new(),
            unit_kind,
            price_unit: dec!(10.00),
            price_kilogram: dec!(4.00),
            price_pound: dec!(1.81),
            stock_quantity: 10.0,
            reorder_threshold: 5.0,
            cost_basis: dec!(0.50),
            expiry_date: None,
            is_listed: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn discrete_items_price_per_unit() {
        let price = resolve_price(&item(UnitKind::Discrete), MeasurementUnit::Unit).unwrap();
        assert_eq!(price, dec!(10.00));
    }

    #[test]
    fn bundles_price_per_unit() {
        let price = resolve_price(&item(UnitKind::Bundle), MeasurementUnit::Unit).unwrap();
        assert_eq!(price, dec!(10.00));
    }

    #[test]
    fn weighted_items_price_per_mass_unit() {
        let it = item(UnitKind::Weighted);
        assert_eq!(
            resolve_price(&it, MeasurementUnit::Kilogram).unwrap(),
            dec!(4.00)
        );
        assert_eq!(
            resolve_price(&it, MeasurementUnit::Pound).unwrap(),
            dec!(1.81)
        );
    }

    #[test]
    fn kilogram_price_for_discrete_item_is_rejected() {
        let err = resolve_price(&item(UnitKind::Discrete), MeasurementUnit::Kilogram).unwrap_err();
        assert!(matches!(
            err,
            PricingError::IncompatibleUnit {
                unit_kind: UnitKind::Discrete,
                requested: MeasurementUnit::Kilogram,
            }
        ));
    }

    #[test]
    fn unit_price_for_weighted_item_is_rejected() {
        let err = resolve_price(&item(UnitKind::Weighted), MeasurementUnit::Unit).unwrap_err();
        assert!(matches!(err, PricingError::IncompatibleUnit { .. }));
    }

    #[test]
    fn item_expiring_tomorrow_is_discounted_thirty_percent() {
        let engine = PricingEngine::default();
        let now = Utc::now();

        let mut it = item(UnitKind::Discrete);
        it.expiry_date = Some(now + Duration::days(1));

        let priced = engine.apply_freshness_discount(it, now);
        assert_eq!(priced.item.price_unit, dec!(7.00));
        assert_eq!(priced.discount_fraction, Some(dec!(0.30)));
        assert_eq!(priced.reference_price, Some(dec!(10.00)));
    }

    #[test]
    fn weighted_prices_are_not_discounted() {
        let engine = PricingEngine::default();
        let now = Utc::now();

        let mut it = item(UnitKind::Weighted);
        it.expiry_date = Some(now + Duration::hours(30));

        let priced = engine.apply_freshness_discount(it, now);
        assert_eq!(priced.item.price_kilogram, dec!(4.00));
        assert_eq!(priced.item.price_pound, dec!(1.81));
        // The flat unit price is still scaled even though weighted items do
        // not sell by it.
        assert!(priced.discount_fraction.is_some());
    }

    #[test]
    fn item_outside_window_passes_through() {
        let engine = PricingEngine::default();
        let now = Utc::now();

        let mut it = item(UnitKind::Discrete);
        it.expiry_date = Some(now + Duration::days(3));

        let priced = engine.apply_freshness_discount(it, now);
        assert_eq!(priced.item.price_unit, dec!(10.00));
        assert_eq!(priced.discount_fraction, None);
        assert_eq!(priced.reference_price, None);
    }

    #[test]
    fn expired_item_is_not_discounted() {
        let engine = PricingEngine::default();
        let now = Utc::now();

        let mut it = item(UnitKind::Discrete);
        it.expiry_date = Some(now - Duration::hours(1));

        let priced = engine.apply_freshness_discount(it, now);
        assert_eq!(priced.item.price_unit, dec!(10.00));
        assert_eq!(priced.discount_fraction, None);
    }

    #[test]
    fn item_without_expiry_passes_through() {
        let engine = PricingEngine::default();
        let priced = engine.apply_freshness_discount(item(UnitKind::Discrete), Utc::now());
        assert_eq!(priced.item.price_unit, dec!(10.00));
        assert_eq!(priced.discount_fraction, None);
    }

    #[test]
    fn exact_window_boundary_is_excluded() {
        let engine = PricingEngine::default();
        let now = Utc::now();

        let mut it = item(UnitKind::Discrete);
        it.expiry_date = Some(now + Duration::days(2));

        let priced = engine.apply_freshness_discount(it, now);
        assert_eq!(priced.discount_fraction, None);
    }
}
