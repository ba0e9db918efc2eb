//! Remote tile source abstraction
//!
//! This module provides the [`TileSource`] trait consumed by the fetch
//! executor, an [`HttpTileSource`] for XYZ-templated tile servers, and the
//! [`AsyncHttpClient`] seam that keeps the network out of unit tests.
//!
//! ```ignore
//! use tileharvest::provider::{AsyncReqwestClient, HttpTileSource};
//!
//! let client = AsyncReqwestClient::new()?;
//! let source = HttpTileSource::gsi_japan(client);
//! ```

mod http;
mod template;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT};
pub use template::{validate_template, HttpTileSource, DEFAULT_SOURCE_NAME, DEFAULT_URL_TEMPLATE};
pub use types::{ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
