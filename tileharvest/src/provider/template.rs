//! XYZ template tile source.

use super::http::AsyncHttpClient;
use super::types::{ProviderError, TileSource};
use crate::coord::TileCoord;

/// Default tile endpoint: GSI Japan standard map.
pub const DEFAULT_URL_TEMPLATE: &str = "https://cyberjapandata.gsi.go.jp/xyz/std/{z}/{x}/{y}.png";

/// Default tile source name.
pub const DEFAULT_SOURCE_NAME: &str = "GSI Japan";

const PLACEHOLDERS: [&str; 3] = ["{z}", "{x}", "{y}"];

/// Tile source for any server following the `{z}/{x}/{y}` URL convention.
pub struct HttpTileSource<C: AsyncHttpClient> {
    http_client: C,
    name: String,
    url_template: String,
}

impl<C: AsyncHttpClient> HttpTileSource<C> {
    /// Creates a source for the given endpoint template.
    ///
    /// The template must contain `{z}`, `{x}` and `{y}`.
    pub fn new(
        http_client: C,
        name: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let url_template = url_template.into();
        validate_template(&url_template)?;

        Ok(Self {
            http_client,
            name: name.into(),
            url_template,
        })
    }

    /// Creates a source for the default GSI Japan endpoint.
    pub fn gsi_japan(http_client: C) -> Self {
        Self {
            http_client,
            name: DEFAULT_SOURCE_NAME.to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }

    /// Builds the request URL for one tile.
    pub fn tile_url(&self, tile: TileCoord) -> String {
        self.url_template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

/// Checks that an endpoint template carries every coordinate placeholder.
pub fn validate_template(template: &str) -> Result<(), ProviderError> {
    let missing: Vec<&str> = PLACEHOLDERS
        .iter()
        .copied()
        .filter(|p| !template.contains(p))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::InvalidTemplate {
            template: template.to_string(),
            reason: format!("missing placeholder(s) {}", missing.join(", ")),
        })
    }
}

impl<C: AsyncHttpClient> TileSource for HttpTileSource<C> {
    async fn fetch(&self, tile: TileCoord) -> Result<Vec<u8>, ProviderError> {
        let url = self.tile_url(tile);
        self.http_client.get(&url).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn url_template(&self) -> &str {
        &self.url_template
    }
}
