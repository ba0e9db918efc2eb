//! Download runs: one region over one zoom range.
//!
//! The [`RunOrchestrator`] expands a region into tiles, admits them through a
//! [`ConcurrencyGate`](crate::gate::ConcurrencyGate), folds each
//! [`TileOutcome`](crate::fetch::TileOutcome) into the [`RunTracker`] as it
//! arrives and finally writes a [`RunSummary`].

mod orchestrator;
mod state;
mod summary;
mod tracker;

pub use orchestrator::{RunHandle, RunOrchestrator};
pub use state::{LogLevel, RunLogEntry, RunSnapshot, RunState};
pub use summary::{RunSummary, SUMMARY_TIME_FORMAT};
pub use tracker::{RunTracker, PROGRESS_LOG_INTERVAL};

use crate::config::DownloadConfig;
use crate::region::RegionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default lowest zoom level of a run.
pub const DEFAULT_ZOOM_MIN: u8 = 5;

/// Default highest zoom level of a run.
pub const DEFAULT_ZOOM_MAX: u8 = 8;

/// Inclusive zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_MIN, DEFAULT_ZOOM_MAX)
    }
}

impl fmt::Display for ZoomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum RunError {
    /// Another run is still in progress; it is left untouched
    #[error("A download is already running for region '{region}'")]
    AlreadyActive { region: String },

    /// Unknown region or unusable zoom range
    #[error(transparent)]
    Region(#[from] RegionError),

    /// The background run task ended abnormally
    #[error("Run task failed: {0}")]
    Task(String),
}

/// What to download and how.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub region: String,
    pub zoom: ZoomRange,
    pub download: DownloadConfig,
}

impl RunRequest {
    pub fn new(region: impl Into<String>, zoom_min: u8, zoom_max: u8) -> Self {
        Self {
            region: region.into(),
            zoom: ZoomRange::new(zoom_min, zoom_max),
            download: DownloadConfig::default(),
        }
    }

    pub fn with_download(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }
}

/// Final accounting of a run, returned to the caller that started it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub region: String,
    pub zoom: ZoomRange,
    pub total: u64,
    pub success: u64,
    pub skipped_existing: u64,
    pub not_found: u64,
    pub failed: u64,
    pub retries: u64,
    pub bytes: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
    /// Highest number of tiles fetched at the same time
    pub peak_in_flight: usize,
    /// Where the summary was written, if it was
    pub summary_path: Option<PathBuf>,
    /// Why the summary could not be written, if it failed
    pub summary_error: Option<String>,
}

impl RunReport {
    /// Both skip kinds together.
    pub fn skipped(&self) -> u64 {
        self.skipped_existing + self.not_found
    }

    /// Tiles that received an outcome.
    pub fn completed(&self) -> u64 {
        self.success + self.skipped() + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_range() {
        let range = ZoomRange::new(5, 8);
        assert_eq!(range.to_string(), "5 - 8");
        assert_eq!(ZoomRange::default(), range);
    }

    #[test]
    fn test_request_defaults() {
        let request = RunRequest::new("九州", 5, 5);
        assert_eq!(request.zoom, ZoomRange::new(5, 5));
        assert_eq!(request.download, DownloadConfig::default());
    }

    #[test]
    fn test_already_active_message() {
        let err = RunError::AlreadyActive {
            region: "関東".to_string(),
        };
        assert!(err.to_string().contains("already running"));
    }
}
