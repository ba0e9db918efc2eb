//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::provider::{DEFAULT_SOURCE_NAME, DEFAULT_URL_TEMPLATE, DEFAULT_USER_AGENT};

pub use crate::fetch::DEFAULT_MAX_RETRIES;
pub use crate::gate::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};

/// Lowest accepted concurrency.
pub const MIN_CONCURRENCY: usize = 1;

/// Base backoff delay (1 second).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Artifact file extension.
pub const DEFAULT_EXTENSION: &str = "png";

/// Name of the config directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".tileharvest";

/// Clamps concurrency to the accepted range and logs a warning if clamped.
pub(super) fn clamp_concurrency(value: usize) -> usize {
    let clamped = value.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY);
    if clamped != value {
        tracing::warn!(
            requested = value,
            min = MIN_CONCURRENCY,
            max = MAX_CONCURRENCY,
            "concurrency out of range, clamping to {}",
            clamped
        );
    }
    clamped
}

/// Default artifact root: `~/tileharvest/map_tiles`.
pub fn default_storage_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tileharvest")
        .join("map_tiles")
}

// =============================================================================
// ConfigFile::default()
// =============================================================================

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            source: SourceSettings {
                name: DEFAULT_SOURCE_NAME.to_string(),
                url_template: DEFAULT_URL_TEMPLATE.to_string(),
                extension: DEFAULT_EXTENSION.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            storage: StorageSettings {
                directory: default_storage_directory(),
            },
            download: DownloadSettings {
                concurrency: DEFAULT_CONCURRENCY,
                max_retries: DEFAULT_MAX_RETRIES,
                retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
                timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            logging: LoggingSettings {
                file: config_dir.join("logs").join("tileharvest.log"),
            },
            regions: Vec::new(),
        }
    }
}
