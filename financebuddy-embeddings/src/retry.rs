//! Exponential backoff helper for transient embedding-provider failures.

use std::time::Duration;
use tracing::{debug, warn};

/// Bounded exponential backoff policy.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            multiplier: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Run `op` up to `max_attempts` times, sleeping with exponential
    /// backoff between attempts whenever `is_transient` returns true for
    /// the error. Returns the last error if all attempts are exhausted.
    pub async fn retry<T, E, F, Fut, IsTransient>(
        &self,
        mut op: F,
        is_transient: IsTransient,
    ) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, E>>,
        IsTransient: Fn(&E) -> bool,
    {
        let mut delay = self.base_delay;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < self.max_attempts && is_transient(&e) => {
                    warn!(attempt, ?delay, "transient failure, retrying");
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f64(self.multiplier);
                }
                Err(e) => {
                    debug!(attempt, "retry budget exhausted or permanent failure");
                    return Err(e);
                }
            }
        }
    }
}
