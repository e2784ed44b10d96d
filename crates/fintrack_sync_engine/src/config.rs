//! Configuration for the sync engine.

use fintrack_store::REMOTE_WRITE_BATCH_LIMIT;
use std::time::Duration;

/// Configuration for sync passes.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum records per remote batched write. Clamped to the remote
    /// store's hard limit.
    pub max_write_batch: usize,
    /// Retry behavior for transient failures.
    pub retry: RetryConfig,
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            max_write_batch: REMOTE_WRITE_BATCH_LIMIT,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the batch size, clamped to [`REMOTE_WRITE_BATCH_LIMIT`].
    pub fn with_max_write_batch(mut self, size: usize) -> Self {
        self.max_write_batch = size.clamp(1, REMOTE_WRITE_BATCH_LIMIT);
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Retry behavior for transient failures on a single batch operation.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum attempts per batch operation, counting the first. The
    /// default budget of 3 makes three calls with two backoff sleeps
    /// (1s, 2s) between them; the surfaced retry count equals the
    /// attempts made.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the backoff delay.
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Creates a retry configuration with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(30_000),
        }
    }

    /// A configuration that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the backoff cap.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Backoff delay before retrying after failed attempt `attempt`
    /// (0-indexed): `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_doubles_from_one_second() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(retry.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(retry.delay_for_attempt(2), Duration::from_secs(4));
    }

    #[test]
    fn backoff_is_capped_at_thirty_seconds() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for_attempt(5), Duration::from_secs(30));
        assert_eq!(retry.delay_for_attempt(40), Duration::from_secs(30));
    }

    #[test]
    fn batch_size_is_clamped_to_remote_limit() {
        let config = EngineConfig::new().with_max_write_batch(10_000);
        assert_eq!(config.max_write_batch, REMOTE_WRITE_BATCH_LIMIT);

        let config = EngineConfig::new().with_max_write_batch(0);
        assert_eq!(config.max_write_batch, 1);
    }

    #[test]
    fn default_retry_budget_is_three_attempts() {
        assert_eq!(RetryConfig::default().max_attempts, 3);
        assert_eq!(RetryConfig::no_retry().max_attempts, 1);
    }
}
