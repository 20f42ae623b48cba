use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::domain::catalog::{CatalogItem, PricedCatalogItem, PricingEngine};
use crate::inventory::InventoryLedger;
use crate::metrics::Metrics;
use crate::store::{CatalogStore, StoreError};
use crate::utils::CircuitBreaker;

use super::errors::ServiceError;

// ============================================================================
// Catalog Service - reads with graceful degradation, operator mutation
// ============================================================================
//
// The listing is priced on every read: freshness discounts are transient,
// so no write happens when an item ages into the markdown window. When the
// backing store misbehaves the read path degrades to the last refreshed
// snapshot behind a circuit breaker; the write path never degrades.
//
// ============================================================================

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    pricing: PricingEngine,
    ledger: InventoryLedger,
    breaker: CircuitBreaker,
    snapshot: Arc<RwLock<Option<Vec<CatalogItem>>>>,
    metrics: Arc<Metrics>,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        ledger: InventoryLedger,
        config: &StoreConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            pricing: PricingEngine::new(config.freshness.clone()),
            ledger,
            breaker: CircuitBreaker::new(config.breaker()),
            snapshot: Arc::new(RwLock::new(None)),
            metrics,
        }
    }

    /// The buyer-facing listing: listed items only, ordered by name, with
    /// the freshness discount applied. Falls back to the snapshot when the
    /// store is unreachable; only with no snapshot at all does the read
    /// fail.
    pub async fn list(&self) -> Result<Vec<PricedCatalogItem>, ServiceError> {
        if self.breaker.allow().await {
            match self.store.list_items().await {
                Ok(items) => {
                    self.breaker.record_success().await;
                    *self.snapshot.write().await = Some(items.clone());
                    return Ok(self.price_listing(items));
                }
                Err(err) => {
                    self.breaker.record_failure().await;
                    tracing::warn!(error = %err, "catalog read failed, serving snapshot");
                    return self.serve_snapshot(err).await;
                }
            }
        }

        self.serve_snapshot(StoreError::Unavailable("catalog circuit open".to_string()))
            .await
    }

    pub async fn get(&self, item_id: Uuid) -> Result<CatalogItem, ServiceError> {
        Ok(self.store.fetch_item(item_id).await?)
    }

    pub async fn create_item(&self, item: CatalogItem) -> Result<CatalogItem, ServiceError> {
        self.store.insert_item(item.clone()).await?;
        tracing::info!(item_id = %item.id, item_name = %item.name, "catalog item created");
        Ok(item)
    }

    /// Store-operator update. A changed `stock_quantity` is routed through
    /// the ledger's manual-adjustment path rather than written blindly, so
    /// the correction is logged like any other stock movement.
    pub async fn update_item(&self, item: CatalogItem) -> Result<CatalogItem, ServiceError> {
        let current = self.store.fetch_item(item.id).await?;
        let new_stock = item.stock_quantity;

        let mut updated = item;
        updated.stock_quantity = current.stock_quantity;
        self.store.update_item(updated.clone()).await?;

        if new_stock != current.stock_quantity {
            return Ok(self.ledger.adjust(updated.id, new_stock).await?);
        }
        Ok(updated)
    }

    pub async fn delete_item(&self, item_id: Uuid) -> Result<(), ServiceError> {
        self.store.delete_item(item_id).await?;
        tracing::info!(item_id = %item_id, "catalog item deleted");
        Ok(())
    }

    /// Items at or below their reorder threshold, for the operator's
    /// dashboard.
    pub async fn low_stock_report(&self) -> Result<Vec<CatalogItem>, ServiceError> {
        let items = self.store.list_items().await?;
        Ok(items
            .into_iter()
            .filter(|item| item.stock_quantity <= item.reorder_threshold)
            .collect())
    }

    /// Pull a fresh snapshot for the degraded read path.
    pub async fn refresh_snapshot(&self) -> Result<(), ServiceError> {
        let items = self.store.list_items().await?;
        *self.snapshot.write().await = Some(items);
        Ok(())
    }

    /// Fixed-interval polling; there is no push channel to subscribe to.
    pub fn spawn_snapshot_refresher(
        self: Arc<Self>,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let service = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = service.refresh_snapshot().await {
                    tracing::debug!(error = %err, "snapshot refresh failed");
                }
            }
        })
    }

    async fn serve_snapshot(
        &self,
        cause: StoreError,
    ) -> Result<Vec<PricedCatalogItem>, ServiceError> {
        match self.snapshot.read().await.clone() {
            Some(items) => {
                self.metrics.catalog_fallback_serves.inc();
                Ok(self.price_listing(items))
            }
            None => Err(ServiceError::Store(cause)),
        }
    }

    fn price_listing(&self, items: Vec<CatalogItem>) -> Vec<PricedCatalogItem> {
        let now = Utc::now();
        let mut listed: Vec<CatalogItem> =
            items.into_iter().filter(|item| item.is_listed).collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        listed
            .into_iter()
            .map(|item| self.pricing.apply_freshness_discount(item, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::UnitKind;
    use crate::service::errors::ErrorKind;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn item(name: &str, stock: f64) -> CatalogItem {
        CatalogItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            category: "Vegetables".to_string(),
            image_url: String::new(),
            unit_kind: UnitKind::Discrete,
            price_unit: dec!(10.00),
            price_kilogram: Decimal::ZERO,
            price_pound: Decimal::ZERO,
            stock_quantity: stock,
            reorder_threshold: 2.0,
            cost_basis: dec!(1.00),
            expiry_date: None,
            is_listed: true,
            created_at: Utc::now(),
        }
    }

    fn service_over(store: Arc<dyn CatalogStore>, config: &StoreConfig) -> CatalogService {
        let metrics = Arc::new(Metrics::new().unwrap());
        let ledger = InventoryLedger::new(store.clone(), metrics.clone());
        CatalogService::new(store, ledger, config, metrics)
    }

    #[tokio::test]
    async fn listing_is_name_ordered_discounted_and_listed_only() {
        let store = MemoryStore::new();
        let mut bananas = item("Bananas", 10.0);
        bananas.expiry_date = Some(Utc::now() + ChronoDuration::days(1));
        let apples = item("Apples", 10.0);
        let mut hidden = item("Cabbage", 10.0);
        hidden.is_listed = false;

        for it in [&bananas, &apples, &hidden] {
            store.insert_item(it.clone()).await.unwrap();
        }

        let service = service_over(Arc::new(store), &StoreConfig::default());
        let listing = service.list().await.unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].item.name, "Apples");
        assert_eq!(listing[1].item.name, "Bananas");

        assert_eq!(listing[0].discount_fraction, None);
        assert_eq!(listing[1].discount_fraction, Some(dec!(0.30)));
        assert_eq!(listing[1].item.price_unit, dec!(7.00));
        assert_eq!(listing[1].reference_price, Some(dec!(10.00)));
    }

    struct UnpluggableCatalog {
        inner: MemoryStore,
        down: AtomicBool,
    }

    #[async_trait]
    impl CatalogStore for UnpluggableCatalog {
        async fn list_items(&self) -> Result<Vec<CatalogItem>, StoreError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("unplugged".into()));
            }
            self.inner.list_items().await
        }

        async fn fetch_item(&self, item_id: Uuid) -> Result<CatalogItem, StoreError> {
            self.inner.fetch_item(item_id).await
        }

        async fn insert_item(&self, item: CatalogItem) -> Result<(), StoreError> {
            self.inner.insert_item(item).await
        }

        async fn update_item(&self, item: CatalogItem) -> Result<(), StoreError> {
            self.inner.update_item(item).await
        }

        async fn delete_item(&self, item_id: Uuid) -> Result<(), StoreError> {
            self.inner.delete_item(item_id).await
        }

        async fn reserve_stock(
            &self,
            item_id: Uuid,
            quantity: f64,
        ) -> Result<CatalogItem, StoreError> {
            self.inner.reserve_stock(item_id, quantity).await
        }

        async fn release_stock(
            &self,
            item_id: Uuid,
            quantity: f64,
        ) -> Result<CatalogItem, StoreError> {
            self.inner.release_stock(item_id, quantity).await
        }

        async fn set_stock(&self, item_id: Uuid, quantity: f64) -> Result<CatalogItem, StoreError> {
            self.inner.set_stock(item_id, quantity).await
        }
    }

    #[tokio::test]
    async fn dead_store_falls_back_to_the_snapshot() {
        let inner = MemoryStore::new();
        inner.insert_item(item("Apples", 10.0)).await.unwrap();
        let flaky = Arc::new(UnpluggableCatalog {
            inner,
            down: AtomicBool::new(false),
        });

        let service = service_over(flaky.clone(), &StoreConfig::default());

        // A healthy read takes the snapshot.
        assert_eq!(service.list().await.unwrap().len(), 1);

        flaky.down.store(true, Ordering::SeqCst);
        let listing = service.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].item.name, "Apples");
    }

    #[tokio::test]
    async fn dead_store_with_no_snapshot_fails_as_transport() {
        let flaky = Arc::new(UnpluggableCatalog {
            inner: MemoryStore::new(),
            down: AtomicBool::new(true),
        });
        let service = service_over(flaky, &StoreConfig::default());

        let err = service.list().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn open_circuit_serves_the_snapshot_without_touching_the_store() {
        let inner = MemoryStore::new();
        inner.insert_item(item("Apples", 10.0)).await.unwrap();
        let flaky = Arc::new(UnpluggableCatalog {
            inner,
            down: AtomicBool::new(false),
        });

        let config = StoreConfig {
            breaker_failure_threshold: 1,
            ..StoreConfig::default()
        };
        let service = service_over(flaky.clone(), &config);

        service.list().await.unwrap();
        flaky.down.store(true, Ordering::SeqCst);
        // This failure trips the breaker...
        service.list().await.unwrap();
        // ...and this read is served without a store call even though the
        // store is "up" again.
        flaky.down.store(false, Ordering::SeqCst);
        let listing = service.list().await.unwrap();
        assert_eq!(listing.len(), 1);
    }

    #[tokio::test]
    async fn stock_updates_route_through_the_ledger() {
        let store = Arc::new(MemoryStore::new());
        let original = item("Apples", 10.0);
        store.insert_item(original.clone()).await.unwrap();
        let service = service_over(store.clone(), &StoreConfig::default());

        let mut edited = original.clone();
        edited.name = "Green apples".to_string();
        edited.stock_quantity = 42.0;

        let updated = service.update_item(edited).await.unwrap();
        assert_eq!(updated.name, "Green apples");
        assert_eq!(updated.stock_quantity, 42.0);

        let stored = store.fetch_item(original.id).await.unwrap();
        assert_eq!(stored.stock_quantity, 42.0);
    }

    #[tokio::test]
    async fn low_stock_report_flags_items_at_threshold() {
        let store = Arc::new(MemoryStore::new());
        store.insert_item(item("Apples", 10.0)).await.unwrap();
        let mut short = item("Berries", 2.0);
        short.reorder_threshold = 2.0;
        store.insert_item(short.clone()).await.unwrap();

        let service = service_over(store, &StoreConfig::default());
        let report = service.low_stock_report().await.unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].id, short.id);
    }
}
