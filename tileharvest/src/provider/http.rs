//! HTTP client abstraction for testability

use super::types::ProviderError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default User-Agent string for HTTP requests.
/// Some tile servers reject requests without a browser-like User-Agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for asynchronous HTTP client operations.
///
/// Implementations must classify a 404 as [`ProviderError::NotFound`] so the
/// caller can tell a missing tile from a transient failure.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with the default timeout and User-Agent.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_options(DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Creates a new client with a custom timeout and User-Agent.
    ///
    /// Optimized for many small parallel requests against one host:
    /// - Large idle connection pool
    /// - TCP keepalive to maintain warm connections
    /// - TCP nodelay for reduced latency
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(256)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::Transport(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl Default for AsyncReqwestClient {
    fn default() -> Self {
        Self::new().expect("Failed to create default async HTTP client")
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) if e.is_timeout() => {
                debug!(url = url, "HTTP request timed out");
                return Err(ProviderError::Timeout {
                    url: url.to_string(),
                });
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_request = e.is_request(),
                    "HTTP request failed"
                );
                return Err(ProviderError::Transport(format!("Request failed: {}", e)));
            }
        };

        check_status(response.status(), url)?;

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) if e.is_timeout() => Err(ProviderError::Timeout {
                url: url.to_string(),
            }),
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(ProviderError::Transport(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

/// Only a 200 carries a tile. A 404 means the tile does not exist; every other
/// status, including other 2xx codes, is an error worth retrying.
fn check_status(status: reqwest::StatusCode, url: &str) -> Result<(), ProviderError> {
    if status == reqwest::StatusCode::OK {
        return Ok(());
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound {
            url: url.to_string(),
        });
    }
    warn!(url = url, status = status.as_u16(), "Unexpected HTTP status");
    Err(ProviderError::HttpStatus {
        status: status.as_u16(),
        url: url.to_string(),
    })
}
