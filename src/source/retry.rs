//! Bounded retry with quadratic backoff

use std::future::Future;
use std::time::Duration;

use super::error::{SourceError, SourceResult};

/// Default number of attempts before a fetch is reported as a connection error
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry budget for data source round-trips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Base delay; attempt `n` (0-based) waits `base_delay * n²` before running
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Policy without backoff, mostly useful in tests
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Delay before the given 0-based attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt.saturating_mul(attempt)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the budget is spent. Exhaustion yields [`SourceError::Connection`].
    pub async fn run<T, F, Fut>(&self, target: &str, mut operation: F) -> SourceResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        let mut last_error = String::from("no attempts made");

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.delay_for(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(target_name = %target, attempt = attempt + 1, "Data source recovered");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        target_name = %target,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Data source attempt failed"
                    );
                    last_error = match e {
                        SourceError::Transient(message) => message,
                        other => other.to_string(),
                    };
                }
                Err(e) => return Err(e),
            }
        }

        Err(SourceError::Connection {
            target: target.to_string(),
            attempts: self.max_attempts,
            message: last_error,
        })
    }
}
