//! Run progress tracking.
//!
//! ```text
//! Orchestrator                 RunTracker                  Callers
//!    │ begin(...)                  │                          │
//!    ├────────────────────────────►│ reset, active = true     │
//!    │ record_outcome(outcome)     │                          │
//!    ├────────────────────────────►│ counters, progress, log  │
//!    │                             │ snapshot()               │
//!    │                             │◄──────────────────────────┤
//!    │                             ├──────────────────────────►│ RunSnapshot
//!    │ end()                       │                          │
//!    ├────────────────────────────►│ active = false           │
//! ```
//!
//! All writes go through one lock, so a snapshot never observes a
//! half-applied outcome.

use super::state::{percent, LogLevel, RunLogEntry, RunSnapshot, RunState};
use super::{RunError, ZoomRange};
use crate::fetch::{RetryPolicy, TileOutcome};
use chrono::Local;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};
use tracing::{error, info};

/// A progress line is logged after this many completions.
pub const PROGRESS_LOG_INTERVAL: u64 = 50;

/// Owner of the single [`RunState`].
#[derive(Debug, Default)]
pub struct RunTracker {
    state: RwLock<RunState>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> RwLockWriteGuard<'_, RunState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new run, discarding the previous run's state.
    ///
    /// Fails with [`RunError::AlreadyActive`] and leaves the current run
    /// untouched if one is in progress.
    pub fn begin(
        &self,
        region: &str,
        zoom: ZoomRange,
        total: u64,
        policy: &RetryPolicy,
    ) -> Result<(), RunError> {
        let mut state = self.write();
        check_idle(&state)?;

        *state = RunState {
            region: Some(region.to_string()),
            zoom: Some(zoom),
            total,
            active: true,
            started_at: Some(Local::now()),
            ..RunState::default()
        };
        if total == 0 {
            state.progress = 100;
        }

        push_log(&mut state, LogLevel::Info, format!("Starting download of region {}", region));
        push_log(&mut state, LogLevel::Info, format!("Zoom levels: {}", zoom));
        push_log(
            &mut state,
            LogLevel::Info,
            format!(
                "Retry policy: up to {} retries, base delay {}s",
                policy.max_retries,
                policy.retry_delay.as_secs_f64()
            ),
        );
        push_log(&mut state, LogLevel::Info, format!("Tiles to fetch: {}", total));
        Ok(())
    }

    /// Appends a free-form log entry.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        push_log(&mut self.write(), level, message.into());
    }

    /// Folds one tile outcome into the counters.
    pub fn record_outcome(&self, outcome: &TileOutcome) {
        let mut state = self.write();

        match outcome {
            TileOutcome::Success { .. } => state.success += 1,
            TileOutcome::SkippedExisting { .. } => {
                state.skipped += 1;
                state.skipped_existing += 1;
            }
            TileOutcome::SkippedNotFound { .. } => {
                state.skipped += 1;
                state.not_found += 1;
            }
            TileOutcome::Failed { .. } => state.failed += 1,
        }
        state.retries += u64::from(outcome.retries());
        state.bytes += outcome.bytes();
        state.completed += 1;
        state.progress = percent(state.completed, state.total);

        if outcome.is_failed() {
            push_log(&mut state, LogLevel::Error, outcome.to_string());
        }

        if state.completed % PROGRESS_LOG_INTERVAL == 0 || state.completed == state.total {
            let line = state.progress_line();
            push_log(&mut state, LogLevel::Info, line);
        }
    }

    /// Marks the run complete.
    pub fn end(&self) {
        let mut state = self.write();
        push_log(&mut state, LogLevel::Success, "Download complete".to_string());
        state.active = false;
        state.finished_at = Some(Local::now());
    }

    /// Marks the run as stopped before every tile was admitted.
    pub fn end_cancelled(&self) {
        let mut state = self.write();
        let message = format!(
            "Download cancelled after {}/{} tiles",
            state.completed, state.total
        );
        push_log(&mut state, LogLevel::Error, message);
        state.active = false;
        state.cancelled = true;
        state.finished_at = Some(Local::now());
    }

    /// Fails with [`RunError::AlreadyActive`] while a run is in progress.
    pub fn ensure_idle(&self) -> Result<(), RunError> {
        check_idle(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_active(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active
    }

    /// Returns a consistent copy of the current state.
    pub fn snapshot(&self) -> RunSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn check_idle(state: &RunState) -> Result<(), RunError> {
    if state.active {
        return Err(RunError::AlreadyActive {
            region: state.region.clone().unwrap_or_default(),
        });
    }
    Ok(())
}

fn push_log(state: &mut RunState, level: LogLevel, message: String) {
    let region = state.region.as_deref().unwrap_or("-");
    match level {
        LogLevel::Error => error!(region = %region, "{}", message),
        LogLevel::Info | LogLevel::Success => info!(region = %region, "{}", message),
    }
    state.log.push(RunLogEntry::now(level, message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::fetch::FetchError;
    use std::sync::Arc;
    use std::time::Duration;

    fn tile(y: u32) -> TileCoord {
        TileCoord::new(10, 900, y)
    }

    fn begin(tracker: &RunTracker, total: u64) {
        tracker
            .begin("九州", ZoomRange::new(5, 8), total, &RetryPolicy::default())
            .unwrap();
    }

    fn failed(y: u32) -> TileOutcome {
        TileOutcome::Failed {
            tile: tile(y),
            attempts: 4,
            error: FetchError::Timeout(Duration::from_secs(10)),
        }
    }

    #[test]
    fn test_begin_resets_and_logs() {
        let tracker = RunTracker::new();
        begin(&tracker, 10);

        let snap = tracker.snapshot();
        assert!(snap.active);
        assert_eq!(snap.region.as_deref(), Some("九州"));
        assert_eq!(snap.total, 10);
        assert_eq!(snap.completed, 0);
        assert_eq!(snap.log.len(), 4);
        assert!(snap.log.iter().all(|e| e.level == LogLevel::Info));
        assert!(snap.started_at.is_some());
    }

    #[test]
    fn test_begin_while_active_is_rejected() {
        let tracker = RunTracker::new();
        begin(&tracker, 10);
        tracker.record_outcome(&TileOutcome::SkippedExisting { tile: tile(0) });
        let before = tracker.snapshot();

        let err = tracker
            .begin("大阪", ZoomRange::new(5, 5), 3, &RetryPolicy::default())
            .unwrap_err();

        assert!(matches!(err, RunError::AlreadyActive { ref region } if region == "九州"));
        assert_eq!(tracker.snapshot(), before);
    }

    #[test]
    fn test_ensure_idle_follows_lifecycle() {
        let tracker = RunTracker::new();
        assert!(tracker.ensure_idle().is_ok());

        begin(&tracker, 10);
        let err = tracker.ensure_idle().unwrap_err();
        assert!(matches!(err, RunError::AlreadyActive { ref region } if region == "九州"));

        tracker.end();
        assert!(tracker.ensure_idle().is_ok());
    }

    #[test]
    fn test_begin_after_end_clears_previous_run() {
        let tracker = RunTracker::new();
        begin(&tracker, 1);
        tracker.record_outcome(&failed(0));
        tracker.end();

        tracker
            .begin("大阪", ZoomRange::new(5, 5), 3, &RetryPolicy::default())
            .unwrap();
        let snap = tracker.snapshot();
        assert_eq!(snap.failed, 0);
        assert_eq!(snap.region.as_deref(), Some("大阪"));
        assert!(snap.log.iter().all(|e| e.level != LogLevel::Error));
        assert!(snap.finished_at.is_none());
    }

    #[test]
    fn test_record_outcome_counts() {
        let tracker = RunTracker::new();
        begin(&tracker, 4);

        tracker.record_outcome(&TileOutcome::Success {
            tile: tile(0),
            retries: 2,
            bytes: 100,
        });
        tracker.record_outcome(&TileOutcome::SkippedExisting { tile: tile(1) });
        tracker.record_outcome(&TileOutcome::SkippedNotFound { tile: tile(2) });
        tracker.record_outcome(&failed(3));

        let snap = tracker.snapshot();
        assert_eq!(snap.success, 1);
        assert_eq!(snap.skipped, 2);
        assert_eq!(snap.skipped_existing, 1);
        assert_eq!(snap.not_found, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.completed, 4);
        assert_eq!(snap.progress, 100);
        assert_eq!(snap.retries, 2 + 3);
        assert_eq!(snap.bytes, 100);
    }

    #[test]
    fn test_progress_floors() {
        let tracker = RunTracker::new();
        begin(&tracker, 3);
        tracker.record_outcome(&TileOutcome::SkippedExisting { tile: tile(0) });
        assert_eq!(tracker.snapshot().progress, 33);
        tracker.record_outcome(&TileOutcome::SkippedExisting { tile: tile(1) });
        assert_eq!(tracker.snapshot().progress, 66);
    }

    #[test]
    fn test_every_failure_logged_as_error() {
        let tracker = RunTracker::new();
        begin(&tracker, 100);
        for y in 0..3 {
            tracker.record_outcome(&failed(y));
        }
        tracker.record_outcome(&TileOutcome::SkippedNotFound { tile: tile(9) });

        let errors: Vec<_> = tracker
            .snapshot()
            .log
            .into_iter()
            .filter(|e| e.level == LogLevel::Error)
            .collect();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].message.contains("10/900/0"));
    }

    #[test]
    fn test_progress_logged_every_fifty_and_at_end() {
        let tracker = RunTracker::new();
        begin(&tracker, 120);
        let baseline = tracker.snapshot().log.len();

        for y in 0..120 {
            tracker.record_outcome(&TileOutcome::SkippedExisting { tile: tile(y) });
        }

        let snap = tracker.snapshot();
        let progress: Vec<_> = snap.log[baseline..]
            .iter()
            .filter(|e| e.message.starts_with("Progress:"))
            .collect();
        assert_eq!(progress.len(), 3); // 50, 100, 120
        assert!(progress[2].message.contains("120/120 (100%)"));
    }

    #[test]
    fn test_end_freezes_run() {
        let tracker = RunTracker::new();
        begin(&tracker, 1);
        tracker.record_outcome(&TileOutcome::SkippedExisting { tile: tile(0) });
        tracker.end();

        let snap = tracker.snapshot();
        assert!(!snap.active);
        assert!(!snap.cancelled);
        assert!(snap.finished_at.is_some());
        assert_eq!(snap.log.last().unwrap().level, LogLevel::Success);
    }

    #[test]
    fn test_end_cancelled() {
        let tracker = RunTracker::new();
        begin(&tracker, 10);
        tracker.end_cancelled();

        let snap = tracker.snapshot();
        assert!(!snap.active);
        assert!(snap.cancelled);
    }

    #[test]
    fn test_empty_run_is_complete() {
        let tracker = RunTracker::new();
        begin(&tracker, 0);
        assert_eq!(tracker.snapshot().progress, 100);
    }

    #[test]
    fn test_snapshots_consistent_under_concurrent_writes() {
        let tracker = Arc::new(RunTracker::new());
        begin(&tracker, 4000);

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for y in 0..1000 {
                        tracker.record_outcome(&TileOutcome::SkippedExisting {
                            tile: tile(w * 1000 + y),
                        });
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            let snap = tracker.snapshot();
            assert_eq!(snap.success + snap.skipped + snap.failed, snap.completed);
            assert_eq!(snap.progress, percent(snap.completed, snap.total));
        }

        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(tracker.snapshot().completed, 4000);
    }
}
