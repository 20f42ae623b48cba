use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus counters for the order core
// ============================================================================
//
// Registered against a private registry so the embedding process can mount
// it wherever its exporter lives; this core ships no HTTP endpoint.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Order lifecycle
    pub orders_created: IntCounter,
    pub orders_delivered: IntCounter,
    pub orders_cancelled: IntCounter,
    pub order_rejections: IntCounterVec,

    // Inventory
    pub reservation_failures: IntCounter,

    // Degraded paths
    pub catalog_fallback_serves: IntCounter,
    pub order_write_repairs: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Orders accepted")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_delivered = IntCounter::new("orders_delivered_total", "Orders delivered")?;
        registry.register(Box::new(orders_delivered.clone()))?;

        let orders_cancelled = IntCounter::new("orders_cancelled_total", "Orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let order_rejections = IntCounterVec::new(
            Opts::new("order_rejections_total", "Order requests rejected"),
            &["reason"],
        )?;
        registry.register(Box::new(order_rejections.clone()))?;

        let reservation_failures = IntCounter::new(
            "stock_reservation_failures_total",
            "Reservations refused for insufficient stock",
        )?;
        registry.register(Box::new(reservation_failures.clone()))?;

        let catalog_fallback_serves = IntCounter::new(
            "catalog_fallback_serves_total",
            "Catalog reads served from the snapshot",
        )?;
        registry.register(Box::new(catalog_fallback_serves.clone()))?;

        let order_write_repairs = IntCounterVec::new(
            Opts::new(
                "order_write_repairs_total",
                "Partial order writes by repair outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(order_write_repairs.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_delivered,
            orders_cancelled,
            order_rejections,
            reservation_failures,
            catalog_fallback_serves,
            order_write_repairs,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
