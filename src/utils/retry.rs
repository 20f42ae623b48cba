use std::time::Duration;

use tokio::time::sleep;

// ============================================================================
// Exponential Backoff Retry
// ============================================================================
//
// Used on the order-write path, where a transient store failure is worth a
// few more attempts but a permanent one must surface immediately.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Tight policy for inline write repair: short delays so the caller is
    /// not kept waiting behind a dead store.
    pub fn quick(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

/// Errors that are worth retrying. Everything else fails on first sight.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Run `operation` until it succeeds, the error turns out permanent, or the
/// attempt budget runs out. Returns the last error in the failure cases.
pub async fn retry_transient<F, Fut, T, E>(
    policy: &BackoffPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + Transient,
{
    let mut delay = policy.initial_delay;
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        attempt = attempt,
                        "operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(error) if !error.is_transient() => {
                tracing::error!(
                    operation = operation_name,
                    error = %error,
                    "permanent failure, not retrying"
                );
                return Err(error);
            }
            Err(error) if attempt == attempts => {
                tracing::error!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    "operation failed after all retries"
                );
                return Err(error);
            }
            Err(error) => {
                tracing::warn!(
                    operation = operation_name,
                    attempt = attempt,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "transient failure, retrying after delay"
                );
                sleep(delay).await;
                delay = Duration::from_millis(
                    ((delay.as_millis() as f64) * policy.multiplier) as u64,
                )
                .min(policy.max_delay);
            }
        }
    }

    unreachable!("max_attempts is at least 1")
}
