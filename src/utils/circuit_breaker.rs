use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Guards the catalog read path: once the backing store keeps failing, stop
// hammering it and let the caller serve its snapshot until the cooldown
// lapses. Closed lets calls through, Open refuses them, HalfOpen probes with
// live traffic after the cooldown.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerStatus {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before probing again.
    pub cooldown: Duration,
    /// Successful probes needed to close from half-open.
    pub success_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug)]
enum State {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen { successes: u32 },
}

#[derive(Clone)]
pub struct CircuitBreaker {
    state: Arc<Mutex<State>>,
    config: BreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::Closed { failures: 0 })),
            config,
        }
    }

    /// Whether a call may go to the protected resource right now. Flips an
    /// expired Open circuit to HalfOpen as a side effect.
    pub async fn allow(&self) -> bool {
        let mut state = self.state.lock().await;
        match *state {
            State::Closed { .. } | State::HalfOpen { .. } => true,
            State::Open { since } => {
                if since.elapsed() >= self.config.cooldown {
                    tracing::info!("circuit breaker cooldown elapsed, probing");
                    *state = State::HalfOpen { successes: 0 };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.state.lock().await;
        match *state {
            State::Closed { .. } => {
                *state = State::Closed { failures: 0 };
            }
            State::HalfOpen { successes } => {
                let successes = successes + 1;
                if successes >= self.config.success_threshold {
                    tracing::info!(successes, "circuit breaker closing");
                    *state = State::Closed { failures: 0 };
                } else {
                    *state = State::HalfOpen { successes };
                }
            }
            State::Open { .. } => {}
        }
    }

    pub async fn record_failure(&self) {
        let mut state = self.state.lock().await;
        match *state {
            State::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.config.failure_threshold {
                    tracing::warn!(failures, "circuit breaker opening");
                    *state = State::Open {
                        since: Instant::now(),
                    };
                } else {
                    *state = State::Closed { failures };
                }
            }
            State::HalfOpen { .. } => {
                tracing::warn!("probe failed, circuit breaker reopening");
                *state = State::Open {
                    since: Instant::now(),
                };
            }
            State::Open { .. } => {
                *state = State::Open {
                    since: Instant::now(),
                };
            }
        }
    }

    pub async fn status(&self) -> BreakerStatus {
        match *self.state.lock().await {
            State::Closed { .. } => BreakerStatus::Closed,
            State::Open { .. } => BreakerStatus::Open,
            State::HalfOpen { .. } => BreakerStatus::HalfOpen,
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(failure_threshold: u32, cooldown: Duration) -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig {
            failure_threshold,
            cooldown,
            success_threshold: 1,
        })
    }

    #[tokio::test]
    async fn opens_after_consecutive_failures() {
        let cb = breaker(2, Duration::from_secs(60));

        assert!(cb.allow().await);
        cb.record_failure().await;
        assert!(cb.allow().await);
        cb.record_failure().await;

        assert_eq!(cb.status().await, BreakerStatus::Open);
        assert!(!cb.allow().await);
    }

    #[tokio::test]
    async fn success_resets_the_failure_streak() {
        let cb = breaker(2, Duration::from_secs(60));

        cb.record_failure().await;
        cb.record_success().await;
        cb.record_failure().await;

        assert_eq!(cb.status().await, BreakerStatus::Closed);
    }

    #[tokio::test]
    async fn probes_after_cooldown_and_closes_on_success() {
        let cb = breaker(1, Duration::from_millis(20));

        cb.record_failure().await;
        assert!(!cb.allow().await);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cb.allow().await);
        assert_eq!(cb.status().await, BreakerStatus::HalfOpen);

        cb.record_success().await;
        assert_eq!(cb.status().await, BreakerStatus::Closed);
    }

    #[tokio::test]
    async fn failed_probe_reopens() {
        let cb = breaker(1, Duration::from_millis(20));

        cb.record_failure().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cb.allow().await);

        cb.record_failure().await;
        assert_eq!(cb.status().await, BreakerStatus::Open);
        assert!(!cb.allow().await);
    }
}
