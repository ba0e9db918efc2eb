//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::region::Region;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Remote tile server
    pub source: SourceSettings,
    /// Where tiles and summaries are written
    pub storage: StorageSettings,
    /// Concurrency, retry and timeout settings
    pub download: DownloadSettings,
    pub logging: LoggingSettings,
    /// User-defined regions, added to the built-in catalog
    pub regions: Vec<Region>,
}

/// Tile source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    /// Human-readable name recorded in run summaries
    pub name: String,
    /// Endpoint with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    /// Artifact file extension, without the dot
    pub extension: String,
    pub user_agent: String,
}

/// Artifact storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Root of the `{z}/{x}/{y}` tree
    pub directory: PathBuf,
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Maximum tiles fetched at once
    pub concurrency: usize,
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    /// Per-request timeout in seconds
    pub timeout: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}
