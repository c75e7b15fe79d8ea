//! Retry with exponential backoff and a per-attempt timeout.

use crate::error::{EngineError, StoreError, StoreResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Default number of attempts per store call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry; doubled for each later one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default timeout for a single store call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// How store calls are retried.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt `attempt` (0-based): `base * 2^attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or runs out of
    /// attempts. Each attempt is bounded by `self.timeout`.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, EngineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let outcome = match timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(self.timeout)),
            };
            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    return Err(EngineError::Store {
                        operation,
                        source: err,
                    })
                }
                Err(err) => err,
            };

            attempt += 1;
            if attempt >= attempts {
                log::error!("{} failed after {} attempts: {}", operation, attempt, err);
                return Err(EngineError::Exhausted {
                    operation,
                    attempts: attempt,
                    source: err,
                });
            }
            let delay = self.delay(attempt - 1);
            log::warn!("{} failed ({}), retrying in {:?}", operation, err, delay);
            sleep(delay).await;
        }
    }
}
