//! Provider types and traits

use crate::coord::TileCoord;
use std::future::Future;
use thiserror::Error;

/// Errors that can occur while fetching a tile from a remote source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The server answered 404: the tile does not exist
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// Any other non-success HTTP status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The request did not complete within the per-request timeout
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// Connection, TLS or body-read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint template is unusable
    #[error("Invalid URL template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

impl ProviderError {
    /// A 404 is permanent for a given tile and must not be retried.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

/// A remote source of raster tiles addressed by (zoom, x, y).
///
/// Implementors perform exactly one request per call; retry and timeout
/// policy live in the fetch executor.
pub trait TileSource: Send + Sync {
    /// Fetches the raw bytes of one tile.
    fn fetch(&self, tile: TileCoord) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Human-readable source name for logs and run summaries.
    fn name(&self) -> &str;

    /// Endpoint template with `{z}`, `{x}` and `{y}` placeholders.
    fn url_template(&self) -> &str;
}
