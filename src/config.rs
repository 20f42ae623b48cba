use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::FreshnessPolicy;
use crate::utils::{BackoffPolicy, BreakerConfig};

// ============================================================================
// Store Configuration
// ============================================================================

/// Operator-tunable knobs. Defaults reproduce the store's live behavior:
/// no tax, 30% markdown inside a two-day freshness window.
///
/// Set `FRESH_MARKET_CONFIG` to a JSON file path to override; every field
/// falls back to its default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Applied to the order subtotal when the invoice is generated.
    pub tax_rate: Decimal,

    pub freshness: FreshnessPolicy,

    /// Fixed polling interval for the catalog snapshot, in seconds.
    pub snapshot_refresh_secs: u64,

    /// Attempts for the order line write before the header is compensated
    /// away.
    pub line_write_attempts: u32,

    pub breaker_failure_threshold: u32,
    pub breaker_cooldown_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::ZERO,
            freshness: FreshnessPolicy::default(),
            snapshot_refresh_secs: 30,
            line_write_attempts: 3,
            breaker_failure_threshold: 3,
            breaker_cooldown_secs: 30,
        }
    }
}

impl StoreConfig {
    /// Config from `FRESH_MARKET_CONFIG` if set, defaults otherwise.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("FRESH_MARKET_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn snapshot_refresh(&self) -> Duration {
        Duration::from_secs(self.snapshot_refresh_secs)
    }

    pub fn line_write_backoff(&self) -> BackoffPolicy {
        BackoffPolicy::quick(self.line_write_attempts)
    }

    pub fn breaker(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.breaker_failure_threshold,
            cooldown: Duration::from_secs(self.breaker_cooldown_secs),
            ..BreakerConfig::default()
        }
    }
}
