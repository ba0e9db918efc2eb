//! Durable record of a completed run.

use super::state::RunState;
use super::ZoomRange;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format of [`RunSummary::download_time`].
pub const SUMMARY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Written once per completed run, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub region: String,
    pub zoom_levels: ZoomRange,
    pub total_tiles: u64,
    /// Local completion time, `YYYY-MM-DD HH:MM:SS`
    pub download_time: String,
    pub tile_source: String,
    pub base_url: String,
    pub directory_structure: String,
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub failed: u64,
}

impl RunSummary {
    /// Builds a summary from a finished run's state.
    pub fn from_state(
        state: &RunState,
        zoom_levels: ZoomRange,
        tile_source: &str,
        base_url: &str,
        directory_structure: String,
    ) -> Self {
        let completed_at = state.finished_at.unwrap_or_else(Local::now);
        Self {
            region: state.region.clone().unwrap_or_default(),
            zoom_levels,
            total_tiles: state.total,
            download_time: completed_at.format(SUMMARY_TIME_FORMAT).to_string(),
            tile_source: tile_source.to_string(),
            base_url: base_url.to_string(),
            directory_structure,
            success: state.success,
            skipped: state.skipped,
            failed: state.failed,
        }
    }
}
