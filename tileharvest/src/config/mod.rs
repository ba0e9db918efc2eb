//! Configuration for TileHarvest.
//!
//! Two layers:
//!
//! - [`ConfigFile`]: the user's `~/.tileharvest/config.ini`, one settings
//!   struct per `[section]`.
//! - [`DownloadConfig`]: the engine-facing parameters of a run, built from
//!   the file and overridden by command-line flags.
//!
//! # Example
//!
//! ```
//! use tileharvest::config::{ConfigFile, DownloadConfig};
//!
//! let file = ConfigFile::default();
//! let download: DownloadConfig = file.download_config().with_max_retries(1);
//! assert_eq!(download.max_retries(), 1);
//! ```

mod defaults;
mod download;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    default_storage_directory, CONFIG_DIR_NAME, DEFAULT_CONCURRENCY, DEFAULT_EXTENSION,
    DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_DELAY_MS, MAX_CONCURRENCY,
    MIN_CONCURRENCY,
};
pub use download::DownloadConfig;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DownloadSettings, LoggingSettings, SourceSettings, StorageSettings};
