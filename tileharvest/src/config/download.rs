//! Download run configuration.

use super::defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_DELAY_MS, MAX_CONCURRENCY, MIN_CONCURRENCY,
};
use crate::fetch::RetryPolicy;
use std::time::Duration;

/// Parameters of one download run: admission capacity and the per-tile
/// retry policy.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tileharvest::config::DownloadConfig;
///
/// // Using defaults
/// let config = DownloadConfig::default();
/// assert_eq!(config.concurrency(), 200);
/// assert_eq!(config.max_retries(), 3);
/// assert_eq!(config.retry_delay(), Duration::from_secs(1));
///
/// // Custom configuration
/// let config = DownloadConfig::new()
///     .with_concurrency(16)
///     .with_max_retries(5)
///     .with_retry_delay(Duration::from_millis(250));
/// assert_eq!(config.concurrency(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Maximum number of tiles fetched at once
    concurrency: usize,
    /// Retries after the first attempt
    max_retries: u32,
    /// Base backoff delay, doubled on each retry
    retry_delay: Duration,
    /// Bound on a single attempt
    request_timeout: Duration,
}

impl DownloadConfig {
    /// Create a new download configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the admission capacity, clamped to
    /// [`MIN_CONCURRENCY`]..=[`MAX_CONCURRENCY`].
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY);
        self
    }

    /// Set the number of retries after the first attempt.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Per-tile policy handed to the fetch executor.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay, self.request_timeout)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
