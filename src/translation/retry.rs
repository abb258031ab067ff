/*!
 * Retry with classified exponential backoff.
 *
 * `RateLimit` and `Transient` errors are retried with `base * 2^attempt + jitter`.
 * A provider-announced reset time overrides the computed wait (capped at one minute),
 * and rate limits without such a hint are held to a steeper floor.
 * `Hard` errors are returned immediately.
 */

use log::warn;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::ProviderError;
use crate::translation::classifier::{ErrorClass, classify_error, rate_limit_reset};

/// Retry configuration for provider calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first call
    pub max_attempts: u32,
    /// Base delay, doubled on each retry
    pub base_delay: Duration,
    /// Upper bound (exclusive) of the random jitter added to each wait
    pub max_jitter: Duration,
    /// Base of the `floor * 1.5^attempt` minimum wait for rate limits without a reset hint
    pub rate_limit_floor: Duration,
    /// Longest wait honoured for a provider-announced reset time
    pub max_reset_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            base_delay: Duration::from_millis(2000),
            max_jitter: Duration::from_millis(1000),
            rate_limit_floor: Duration::from_millis(5000),
            max_reset_wait: Duration::from_millis(60_000),
        }
    }
}

/// Ephemeral state of one retried call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Number of failed attempts so far
    pub attempt: u32,
    /// Wait before the next attempt
    pub next_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given attempts and base delay, other values default
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Compute the wait before retrying after the `attempt`-th failure (0-based).
    ///
    /// `reset_at_ms` and `now_ms` are epoch milliseconds.
    pub fn backoff_delay(
        &self,
        attempt: u32,
        class: ErrorClass,
        reset_at_ms: Option<i64>,
        now_ms: i64,
        jitter: Duration,
    ) -> Duration {
        let exponent = 2_f64.powi(attempt.min(30) as i32);
        let mut wait_ms = self.base_delay.as_millis() as f64 * exponent + jitter.as_millis() as f64;

        match reset_at_ms {
            Some(reset) => {
                if reset > now_ms {
                    let until_reset = (reset - now_ms + 1000) as f64;
                    wait_ms = until_reset.min(self.max_reset_wait.as_millis() as f64);
                }
            }
            None if class == ErrorClass::RateLimit => {
                let floor = self.rate_limit_floor.as_millis() as f64 * 1.5_f64.powi(attempt.min(30) as i32);
                wait_ms = wait_ms.max(floor);
            }
            None => {}
        }

        Duration::from_millis(wait_ms as u64)
    }

    fn jitter(&self) -> Duration {
        let max = self.max_jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..max))
    }

    /// Run `operation` until it succeeds, fails hard, exhausts the attempts or is cancelled.
    ///
    /// The last error is returned once the attempts are exhausted.
    pub async fn run<F, Fut, T>(&self, cancel: &CancellationToken, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut state = RetryState {
            attempt: 0,
            next_delay: Duration::ZERO,
        };

        loop {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }

            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let class = classify_error(&error);
            if !class.is_retryable() {
                return Err(error);
            }

            state.attempt += 1;
            if state.attempt >= self.max_attempts {
                warn!(
                    "Giving up after {} attempts: {}",
                    state.attempt,
                    truncate(&error.to_string(), 200)
                );
                return Err(error);
            }

            state.next_delay = self.backoff_delay(
                state.attempt - 1,
                class,
                rate_limit_reset(&error),
                chrono::Utc::now().timestamp_millis(),
                self.jitter(),
            );

            warn!(
                "API request failed ({:?}, attempt {}/{}). Retrying in {}ms: {}",
                class,
                state.attempt,
                self.max_attempts,
                state.next_delay.as_millis(),
                truncate(&error.to_string(), 100)
            );

            tokio::select! {
                _ = tokio::time::sleep(state.next_delay) => {}
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut short: String = text.chars().take(max_chars).collect();
        short.push_str("...");
        short
    } else {
        text.to_string()
    }
}
