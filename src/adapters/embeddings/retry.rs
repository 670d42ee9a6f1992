//! Retry policy with exponential backoff for embedding API requests.
//!
//! Backoff doubles with each retry and is capped at `max_backoff_ms`.
//! Every sleep is deadline-aware: if the next backoff would cross the
//! supplied deadline, the call fails fast with `DeadlineExceeded`
//! instead of sleeping past the pipeline's global budget.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::EmbeddingApiError;
use crate::domain::models::RetryConfig;

/// Retry policy configuration for handling transient errors
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Execute an operation with exponential backoff retry logic.
    ///
    /// Transient errors are retried up to `max_retries` times; permanent
    /// errors propagate immediately. When `deadline` is set, a backoff
    /// that would outlast it short-circuits with `DeadlineExceeded`.
    pub async fn execute<F, Fut, T>(
        &self,
        deadline: Option<Instant>,
        mut operation: F,
    ) -> Result<T, EmbeddingApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EmbeddingApiError>>,
    {
        let mut attempt = 0;

        loop {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(EmbeddingApiError::DeadlineExceeded);
                }
            }

            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !self.should_retry(&err, attempt) {
                        if attempt >= self.max_retries {
                            warn!("Operation failed after {} attempts: {}", attempt + 1, err);
                        } else {
                            debug!("Permanent error, not retrying: {}", err);
                        }
                        return Err(err);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    if let Some(deadline) = deadline {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        if backoff >= remaining {
                            warn!(
                                "Backoff of {:?} would exceed deadline ({:?} remaining), failing fast",
                                backoff, remaining
                            );
                            return Err(EmbeddingApiError::DeadlineExceeded);
                        }
                    }

                    warn!(
                        "Attempt {} failed with transient error: {}. Retrying in {:?}...",
                        attempt + 1,
                        err,
                        backoff
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Exponential backoff for a given attempt:
    /// `min(initial_backoff * 2^attempt, max_backoff)`.
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &EmbeddingApiError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000, 60_000)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }
}
