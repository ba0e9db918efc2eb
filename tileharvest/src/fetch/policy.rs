//! Retry and timeout policy for tile fetches.

use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Per-attempt bounds for fetching one tile.
///
/// A tile gets at most `max_retries + 1` attempts. Attempt `k > 0` waits
/// `retry_delay * 2^(k-1)` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration, request_timeout: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
            request_timeout,
        }
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Sleep before attempt number `attempt` (0-based). Zero for the first.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor)
    }

    /// Sum of every backoff sleep a tile that never succeeds goes through.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts())
            .map(|attempt| self.backoff_delay(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: crate::provider::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
