//! TileHarvest - Region-based map tile downloader
//!
//! This library turns a named geographic region and a zoom range into the
//! exact set of Web Mercator tiles covering it, fetches them from an XYZ tile
//! server under a fixed concurrency cap with per-tile retry and backoff, and
//! stores them as `<root>/<z>/<x>/<y>.<ext>` with a JSON summary per run.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use tileharvest::config::ConfigFile;
//! use tileharvest::service::HarvestService;
//!
//! let service = HarvestService::from_config(&ConfigFile::load()?)?;
//! let handle = service.start_run(service.request("九州", 5, 8))?;
//!
//! // Poll progress while the run is in flight
//! println!("{}", service.current_status().progress_line());
//! let report = handle.wait().await?;
//! ```

pub mod config;
pub mod coord;
pub mod fetch;
pub mod gate;
pub mod logging;
pub mod provider;
pub mod region;
pub mod run;
pub mod service;
pub mod store;

/// Version of the TileHarvest library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
