use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use fresh_market::config::StoreConfig;
use fresh_market::domain::cart::CartAggregate;
use fresh_market::domain::catalog::{CatalogItem, MeasurementUnit, UnitKind};
use fresh_market::domain::order::OrderStatus;
use fresh_market::domain::rider::{RiderProfile, VehicleKind};
use fresh_market::inventory::InventoryLedger;
use fresh_market::metrics::Metrics;
use fresh_market::service::{CatalogService, OrderService, RiderService};
use fresh_market::store::{InvoiceStore, MemoryStore, OrderFilter, PaymentMethodStore};

fn seed_item(
    name: &str,
    unit_kind: UnitKind,
    price_unit: Decimal,
    price_kilogram: Decimal,
    price_pound: Decimal,
    stock: f64,
    expires_in_days: Option<i64>,
) -> CatalogItem {
    CatalogItem {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{name} from the morning market"),
        category: "Produce".to_string(),
        image_url: String::new(),
        unit_kind,
        price_unit,
        price_kilogram,
        price_pound,
        stock_quantity: stock,
        reorder_threshold: 3.0,
        cost_basis: price_unit * dec!(0.5),
        expiry_date: expires_in_days.map(|days| Utc::now() + chrono::Duration::days(days)),
        is_listed: true,
        created_at: Utc::now(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fresh_market=debug")),
        )
        .init();

    tracing::info!("starting fresh_market order core demo");

    let config = StoreConfig::load()?;
    let store = MemoryStore::with_default_payment_methods();
    let metrics = Arc::new(Metrics::new()?);
    let ledger = InventoryLedger::new(Arc::new(store.clone()), metrics.clone());

    let catalog = Arc::new(CatalogService::new(
        Arc::new(store.clone()),
        ledger.clone(),
        &config,
        metrics.clone(),
    ));
    let orders = OrderService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        ledger,
        config.clone(),
        metrics.clone(),
    );
    let riders = RiderService::new(Arc::new(store.clone()));

    // === Seed the catalog ===
    let tomatoes = catalog
        .create_item(seed_item(
            "Tomatoes",
            UnitKind::Discrete,
            dec!(10.00),
            Decimal::ZERO,
            Decimal::ZERO,
            20.0,
            Some(1), // expiring tomorrow: listed at 30% off
        ))
        .await?;
    let pork = catalog
        .create_item(seed_item(
            "Pork shoulder",
            UnitKind::Weighted,
            Decimal::ZERO,
            dec!(4.00),
            dec!(1.81),
            12.0,
            None,
        ))
        .await?;
    catalog
        .create_item(seed_item(
            "Breakfast bundle",
            UnitKind::Bundle,
            dec!(15.00),
            Decimal::ZERO,
            Decimal::ZERO,
            3.0,
            None,
        ))
        .await?;

    let _refresher = catalog.clone().spawn_snapshot_refresher(config.snapshot_refresh());

    // === Buyer browses the priced listing ===
    let listing = catalog.list().await?;
    for priced in &listing {
        match priced.discount_fraction {
            Some(fraction) => tracing::info!(
                item = %priced.item.name,
                price = %priced.item.price_unit,
                discount = %fraction,
                "listed with freshness markdown"
            ),
            None => tracing::info!(item = %priced.item.name, "listed"),
        }
    }

    // === A rider signs up ===
    let rider = riders
        .register(RiderProfile {
            full_name: "Ana Flores".to_string(),
            id_number: "0801-1990-01234".to_string(),
            phone: "9999-0000".to_string(),
            email: "ana@example.com".to_string(),
            vehicle_kind: VehicleKind::Motorcycle,
            plate_number: Some("HAB-1234".to_string()),
        })
        .await?;

    // === Buyer fills a cart from the priced listing ===
    let buyer_id = Uuid::new_v4();
    let payment_methods = store.list_payment_methods().await?;
    let payment_method = payment_methods
        .first()
        .ok_or_else(|| anyhow::anyhow!("no payment methods seeded"))?;

    let discounted_tomatoes = listing
        .iter()
        .find(|priced| priced.item.id == tomatoes.id)
        .map(|priced| priced.item.clone())
        .ok_or_else(|| anyhow::anyhow!("tomatoes missing from listing"))?;

    let mut cart = CartAggregate::new();
    cart.add(&discounted_tomatoes, MeasurementUnit::Unit)?;
    cart.add(&discounted_tomatoes, MeasurementUnit::Unit)?;
    cart.add(&pork, MeasurementUnit::Kilogram)?;
    tracing::info!(total = %cart.total(), lines = cart.lines().len(), "cart ready");

    let order = orders
        .checkout(&mut cart, Some(buyer_id), payment_method.id)
        .await?;

    // === Store dispatches, rider delivers ===
    orders
        .transition(order.id, OrderStatus::EnRoute, Some(rider.id))
        .await?;
    orders.transition(order.id, OrderStatus::Delivered, None).await?;

    let invoice = store.fetch_invoice_for_order(order.id).await?;
    tracing::info!(
        invoice_id = %invoice.id,
        subtotal = %invoice.subtotal,
        tax = %invoice.tax,
        total = %invoice.total,
        "invoice on file"
    );

    // === A second order is cancelled and its stock comes back ===
    let mut cart = CartAggregate::new();
    cart.add(&pork, MeasurementUnit::Pound)?;
    let cancelled = orders
        .checkout(&mut cart, Some(buyer_id), payment_method.id)
        .await?;
    orders
        .transition(cancelled.id, OrderStatus::Cancelled, None)
        .await?;

    let open_orders = orders
        .list(OrderFilter {
            status: Some(OrderStatus::Pending),
            ..OrderFilter::default()
        })
        .await?;
    tracing::info!(pending = open_orders.len(), "open order queue");

    for short in catalog.low_stock_report().await? {
        tracing::warn!(
            item = %short.name,
            stock = short.stock_quantity,
            threshold = short.reorder_threshold,
            "needs reordering"
        );
    }

    tracing::info!(
        metric_families = metrics.registry().gather().len(),
        "demo complete"
    );
    Ok(())
}
