//! Observable state of the current (or last) run.

use super::ZoomRange;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Success => write!(f, "success"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// One timestamped line of the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    /// Wall-clock time, `HH:MM:SS`
    pub time: String,
    pub message: String,
    #[serde(rename = "type")]
    pub level: LogLevel,
}

impl RunLogEntry {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            time: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            level,
        }
    }
}

/// Progress counters, log and lifecycle flags of a run.
///
/// Exactly one exists per tracker. Readers get copies through
/// [`RunTracker::snapshot`](super::RunTracker::snapshot).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunState {
    pub region: Option<String>,
    pub zoom: Option<ZoomRange>,
    pub total: u64,
    pub success: u64,
    /// Both skip kinds together
    pub skipped: u64,
    pub skipped_existing: u64,
    pub not_found: u64,
    pub failed: u64,
    pub completed: u64,
    /// `floor(completed * 100 / total)`
    pub progress: u8,
    pub retries: u64,
    pub bytes: u64,
    pub log: Vec<RunLogEntry>,
    pub active: bool,
    pub cancelled: bool,
    pub started_at: Option<DateTime<Local>>,
    pub finished_at: Option<DateTime<Local>>,
}

/// A point-in-time copy of [`RunState`].
pub type RunSnapshot = RunState;

impl RunState {
    /// Whether a run has ever been started on this tracker.
    pub fn has_run(&self) -> bool {
        self.region.is_some()
    }

    /// The `done/total (pct%) | ok | skip | fail` line used in progress logs.
    pub fn progress_line(&self) -> String {
        format!(
            "Progress: {}/{} ({}%) | ok {} | skipped {} | failed {}",
            self.completed, self.total, self.progress, self.success, self.skipped, self.failed
        )
    }
}

/// Integer percentage, floored. An empty run is complete.
pub(crate) fn percent(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (completed.min(total) * 100 / total) as u8
}
