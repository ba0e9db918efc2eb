//! Run orchestration with permit-bounded spawning.
//!
//! Tiles wait in a queue and are spawned onto a `JoinSet` only while a gate
//! permit is held, so at most `concurrency` fetch tasks exist at any time:
//!
//! ```text
//! pending tiles ──try_acquire──► JoinSet (≤ N tasks) ──join_next──► RunTracker
//!      ▲                               │
//!      └───────── permit released ◄────┘
//! ```
//!
//! Cancellation is checked whenever a permit would be taken. Tiles already
//! in flight run to completion; nothing new is admitted.

use super::state::LogLevel;
use super::summary::RunSummary;
use super::tracker::RunTracker;
use super::{RunError, RunReport, RunRequest};
use crate::coord::TileCoord;
use crate::fetch::{FetchError, TileFetcher, TileOutcome};
use crate::gate::{ConcurrencyGate, GatePermit};
use crate::provider::TileSource;
use crate::region::RegionCatalog;
use crate::store::{SummaryStore, TileStore};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Composes geodesy, the gate, the fetch executor and the tracker into runs.
pub struct RunOrchestrator<S, T, M> {
    catalog: Arc<RegionCatalog>,
    source: Arc<S>,
    store: Arc<T>,
    summaries: Arc<M>,
    tracker: Arc<RunTracker>,
}

impl<S, T, M> Clone for RunOrchestrator<S, T, M> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            summaries: Arc::clone(&self.summaries),
            tracker: Arc::clone(&self.tracker),
        }
    }
}

/// A validated run whose tracker state has already been started.
struct PreparedRun {
    request: RunRequest,
}

impl<S, T, M> RunOrchestrator<S, T, M>
where
    S: TileSource + 'static,
    T: TileStore + 'static,
    M: SummaryStore + 'static,
{
    pub fn new(
        catalog: Arc<RegionCatalog>,
        source: Arc<S>,
        store: Arc<T>,
        summaries: Arc<M>,
        tracker: Arc<RunTracker>,
    ) -> Self {
        Self {
            catalog,
            source,
            store,
            summaries,
            tracker,
        }
    }

    pub fn tracker(&self) -> &Arc<RunTracker> {
        &self.tracker
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Runs to completion on the current task.
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, RunError> {
        let prepared = self.prepare(request)?;
        Ok(self.execute(prepared, CancellationToken::new()).await)
    }

    /// Validates and starts a run, then drives it on a spawned task.
    ///
    /// Errors (unknown region, bad zoom range, run already active) are
    /// returned here, before anything is spawned.
    pub fn start(&self, request: RunRequest) -> Result<RunHandle, RunError> {
        let prepared = self.prepare(request)?;
        let cancel = CancellationToken::new();

        let orchestrator = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { orchestrator.execute(prepared, token).await });

        Ok(RunHandle {
            task,
            cancel,
            tracker: Arc::clone(&self.tracker),
        })
    }

    /// Checks for an active run, then sizes the request and begins it.
    ///
    /// The tile list itself is only built once the run has been admitted.
    fn prepare(&self, request: RunRequest) -> Result<PreparedRun, RunError> {
        self.tracker.ensure_idle()?;

        let total = self
            .catalog
            .tile_count(&request.region, request.zoom.min, request.zoom.max)?;

        self.tracker.begin(
            &request.region,
            request.zoom,
            total,
            &request.download.retry_policy(),
        )?;
        self.tracker.log(
            LogLevel::Info,
            format!("Saving to {}", self.store.layout_descriptor()),
        );

        Ok(PreparedRun { request })
    }

    async fn execute(&self, prepared: PreparedRun, cancel: CancellationToken) -> RunReport {
        let PreparedRun { request } = prepared;
        let started = Instant::now();

        // Region and zoom range were validated by prepare
        let expanded = self
            .catalog
            .tile_set(&request.region, request.zoom.min, request.zoom.max);
        let (tiles, mut cancelled) = match expanded {
            Ok(tiles) => (tiles, false),
            Err(e) => {
                let message = format!("Failed to expand tile set: {}", e);
                self.tracker.log(LogLevel::Error, message);
                (Vec::new(), true)
            }
        };
        let total = tiles.len();

        let gate = ConcurrencyGate::new(request.download.concurrency());
        let fetcher = Arc::new(TileFetcher::new(
            Arc::clone(&self.source),
            Arc::clone(&self.store),
            request.download.retry_policy(),
        ));

        info!(
            region = %request.region,
            tiles = total,
            concurrency = gate.capacity(),
            "Run started"
        );

        let mut pending: VecDeque<TileCoord> = tiles.into();
        let mut in_flight: HashSet<TileCoord> = HashSet::new();
        let mut active: JoinSet<TileOutcome> = JoinSet::new();

        while !pending.is_empty() || !active.is_empty() {
            if !cancelled && cancel.is_cancelled() {
                debug!(
                    region = %request.region,
                    pending = pending.len(),
                    active = active.len(),
                    "Run cancelled, no new tiles admitted"
                );
                cancelled = true;
            }

            // Admit as many pending tiles as there are free permits
            while !cancelled && !pending.is_empty() {
                let Some(permit) = gate.try_acquire() else {
                    break;
                };
                spawn_fetch(&mut active, &mut pending, &mut in_flight, &fetcher, permit);
            }

            if !active.is_empty() {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled(), if !cancelled => {
                        cancelled = true;
                    }

                    Some(result) = active.join_next() => {
                        match result {
                            Ok(outcome) => {
                                in_flight.remove(&outcome.tile());
                                self.tracker.record_outcome(&outcome);
                            }
                            Err(join_err) => {
                                warn!(error = %join_err, "Fetch task panicked");
                            }
                        }
                    }
                }
            } else if !pending.is_empty() && !cancelled {
                // Nothing running and no free permit: wait for one
                match gate.acquire_or_cancel(&cancel).await {
                    Some(permit) => {
                        spawn_fetch(&mut active, &mut pending, &mut in_flight, &fetcher, permit)
                    }
                    None => cancelled = true,
                }
            } else {
                break;
            }
        }

        // Tiles whose task died without reporting still get exactly one outcome
        for tile in in_flight.drain() {
            self.tracker.record_outcome(&TileOutcome::Failed {
                tile,
                attempts: 0,
                error: FetchError::Aborted("task panicked".to_string()),
            });
        }

        let mut summary_path = None;
        let mut summary_error = None;

        if cancelled {
            self.tracker.end_cancelled();
        } else {
            self.tracker.end();

            let summary = RunSummary::from_state(
                &self.tracker.snapshot(),
                request.zoom,
                self.source.name(),
                self.source.url_template(),
                self.store.layout_descriptor(),
            );
            match self.summaries.write(&summary).await {
                Ok(path) => {
                    let message = format!("Metadata saved to {}", path.display());
                    self.tracker.log(LogLevel::Success, message);
                    summary_path = Some(path);
                }
                Err(e) => {
                    error!(region = %request.region, error = %e, "Failed to write run summary");
                    summary_error = Some(e.to_string());
                }
            }
        }

        let state = self.tracker.snapshot();
        let report = RunReport {
            region: request.region,
            zoom: request.zoom,
            total: state.total,
            success: state.success,
            skipped_existing: state.skipped_existing,
            not_found: state.not_found,
            failed: state.failed,
            retries: state.retries,
            bytes: state.bytes,
            cancelled,
            elapsed: started.elapsed(),
            peak_in_flight: gate.peak_in_flight(),
            summary_path,
            summary_error,
        };

        info!(
            region = %report.region,
            success = report.success,
            skipped = report.skipped(),
            failed = report.failed,
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Run finished"
        );
        report
    }
}

fn spawn_fetch<S, T>(
    active: &mut JoinSet<TileOutcome>,
    pending: &mut VecDeque<TileCoord>,
    in_flight: &mut HashSet<TileCoord>,
    fetcher: &Arc<TileFetcher<S, T>>,
    permit: GatePermit,
) where
    S: TileSource + 'static,
    T: TileStore + 'static,
{
    // An empty queue drops the permit unused
    let Some(tile) = pending.pop_front() else {
        return;
    };
    in_flight.insert(tile);
    let fetcher = Arc::clone(fetcher);
    active.spawn(async move {
        let _permit = permit;
        fetcher.fetch(tile).await
    });
}

/// Handle to a run driven on a background task.
#[derive(Debug)]
pub struct RunHandle {
    task: JoinHandle<RunReport>,
    cancel: CancellationToken,
    tracker: Arc<RunTracker>,
}

impl RunHandle {
    /// Stops admitting new tiles. Tiles already in flight finish normally.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the run to end and returns its report.
    pub async fn wait(self) -> Result<RunReport, RunError> {
        match self.task.await {
            Ok(report) => Ok(report),
            Err(e) => {
                // Keep later runs startable
                if self.tracker.is_active() {
                    self.tracker.end_cancelled();
                }
                Err(RunError::Task(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{MemoryTileStore, Reply, ScriptedSource};
    use crate::run::{RunSummary, ZoomRange};
    use crate::config::DownloadConfig;
    use crate::region::Region;
    use crate::store::StoreError;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct RecordingSummaries {
        written: Mutex<Vec<RunSummary>>,
        fail: bool,
    }

    impl SummaryStore for RecordingSummaries {
        async fn write(&self, summary: &RunSummary) -> Result<PathBuf, StoreError> {
            if self.fail {
                return Err(StoreError::Task("summary disk gone".to_string()));
            }
            self.written.lock().unwrap().push(summary.clone());
            Ok(PathBuf::from(format!("metadata_{}.json", summary.region)))
        }
    }

    type TestOrchestrator = RunOrchestrator<ScriptedSource, MemoryTileStore, RecordingSummaries>;

    fn orchestrator(source: ScriptedSource, store: MemoryTileStore) -> TestOrchestrator {
        orchestrator_with(source, store, RecordingSummaries::default())
    }

    fn orchestrator_with(
        source: ScriptedSource,
        store: MemoryTileStore,
        summaries: RecordingSummaries,
    ) -> TestOrchestrator {
        let catalog = RegionCatalog::with_builtins().with_region(
            Region::from_corners("grid", [-80.0, -170.0], [80.0, 170.0]).unwrap(),
        );
        RunOrchestrator::new(
            Arc::new(catalog),
            Arc::new(source),
            Arc::new(store),
            Arc::new(summaries),
            Arc::new(RunTracker::new()),
        )
    }

    fn fast() -> DownloadConfig {
        DownloadConfig::new()
            .with_retry_delay(Duration::from_millis(1))
            .with_request_timeout(Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_kyushu_fresh_run() {
        let orch = orchestrator(ScriptedSource::ok(), MemoryTileStore::new());

        let report = orch
            .run(RunRequest::new("九州", 5, 5).with_download(fast()))
            .await
            .unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.success + report.failed + report.not_found, 2);
        assert_eq!(report.skipped_existing, 0);
        assert!(!report.cancelled);
        assert!(report.summary_path.is_some());

        let mut requested = orch.source.requested();
        requested.sort();
        assert_eq!(
            requested,
            vec![TileCoord::new(5, 27, 12), TileCoord::new(5, 27, 13)]
        );

        let summaries = orch.summaries.written.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].region, "九州");
        assert_eq!(summaries[0].zoom_levels, ZoomRange::new(5, 5));
        assert_eq!(summaries[0].total_tiles, 2);
        assert_eq!(summaries[0].directory_structure, "memory/{z}/{x}/{y}");
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let orch = orchestrator(ScriptedSource::ok(), MemoryTileStore::new());
        let request = RunRequest::new("九州", 5, 6).with_download(fast());

        let first = orch.run(request.clone()).await.unwrap();
        let calls_after_first = orch.source.calls();
        let second = orch.run(request).await.unwrap();

        assert_eq!(first.success, first.total);
        assert_eq!(second.skipped_existing, second.total);
        assert_eq!(second.success, 0);
        assert_eq!(orch.source.calls(), calls_after_first);
    }

    #[tokio::test]
    async fn test_unknown_region_changes_nothing() {
        let orch = orchestrator(ScriptedSource::ok(), MemoryTileStore::new());

        let err = orch
            .run(RunRequest::new("Atlantis", 5, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Region(_)));
        assert!(err.to_string().contains("九州"));
        assert!(!orch.tracker().snapshot().has_run());
        assert_eq!(orch.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_inverted_zoom_range_rejected() {
        let orch = orchestrator(ScriptedSource::ok(), MemoryTileStore::new());
        let err = orch.run(RunRequest::new("九州", 8, 5)).await.unwrap_err();
        assert!(matches!(err, RunError::Region(_)));
        assert!(!orch.tracker().is_active());
    }

    #[tokio::test]
    async fn test_peak_in_flight_bounded_by_concurrency() {
        let source = ScriptedSource::always(Reply::Delayed(
            Duration::from_millis(5),
            b"tile".to_vec(),
        ));
        let orch = orchestrator(source, MemoryTileStore::new());

        let report = orch
            .run(RunRequest::new("grid", 3, 3).with_download(fast().with_concurrency(4)))
            .await
            .unwrap();

        assert_eq!(report.total, 64);
        assert_eq!(report.success, 64);
        assert!(report.peak_in_flight <= 4);
        assert!(report.peak_in_flight >= 2);
    }

    #[tokio::test]
    async fn test_failures_and_missing_tiles_do_not_abort() {
        let source = ScriptedSource::new(
            vec![Reply::not_found()],
            Reply::server_error(),
        );
        let orch = orchestrator(source, MemoryTileStore::new());

        let report = orch
            .run(
                RunRequest::new("九州", 5, 5)
                    .with_download(fast().with_concurrency(1).with_max_retries(1)),
            )
            .await
            .unwrap();

        assert_eq!(report.not_found, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.completed(), 2);
        // 1 call for the 404, 2 for the failing tile
        assert_eq!(orch.source.calls(), 3);

        let snap = orch.tracker().snapshot();
        let errors = snap.log.iter().filter(|e| e.level == LogLevel::Error).count();
        assert_eq!(errors, 1);
    }

    #[tokio::test]
    async fn test_summary_failure_is_reported_not_raised() {
        let summaries = RecordingSummaries {
            fail: true,
            ..Default::default()
        };
        let orch = orchestrator_with(ScriptedSource::ok(), MemoryTileStore::new(), summaries);

        let report = orch
            .run(RunRequest::new("九州", 5, 5).with_download(fast()))
            .await
            .unwrap();

        assert_eq!(report.success, 2);
        assert!(report.summary_path.is_none());
        assert!(report.summary_error.unwrap().contains("summary disk gone"));
        assert!(!orch.tracker().is_active());
    }

    #[tokio::test]
    async fn test_summary_write_is_logged() {
        let orch = orchestrator(ScriptedSource::ok(), MemoryTileStore::new());

        let report = orch
            .run(RunRequest::new("九州", 5, 5).with_download(fast()))
            .await
            .unwrap();

        let path = report.summary_path.unwrap();
        let snap = orch.tracker().snapshot();
        assert!(snap.log.iter().any(|e| {
            e.level == LogLevel::Success && e.message.contains(&path.display().to_string())
        }));
    }

    #[tokio::test]
    async fn test_summary_failure_not_logged_as_saved() {
        let summaries = RecordingSummaries {
            fail: true,
            ..Default::default()
        };
        let orch = orchestrator_with(ScriptedSource::ok(), MemoryTileStore::new(), summaries);

        orch.run(RunRequest::new("九州", 5, 5).with_download(fast()))
            .await
            .unwrap();

        let snap = orch.tracker().snapshot();
        assert!(!snap.log.iter().any(|e| e.message.starts_with("Metadata saved")));
    }

    #[tokio::test]
    async fn test_active_run_rejects_unknown_region() {
        let orch = orchestrator(ScriptedSource::always(Reply::Hang), MemoryTileStore::new());
        let download = fast().with_request_timeout(Duration::from_secs(3600));

        let handle = orch
            .start(RunRequest::new("九州", 5, 5).with_download(download))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let before = orch.tracker().snapshot();

        let err = orch
            .start(RunRequest::new("Atlantis", 5, 5).with_download(download))
            .unwrap_err();

        assert!(matches!(err, RunError::AlreadyActive { ref region } if region == "九州"));
        let after = orch.tracker().snapshot();
        assert_eq!(after.region, before.region);
        assert_eq!(after.total, before.total);
        assert_eq!(after.log.len(), before.log.len());

        handle.task.abort();
    }

    #[tokio::test]
    async fn test_active_run_rejects_oversized_request_without_expanding() {
        let orch = orchestrator(ScriptedSource::always(Reply::Hang), MemoryTileStore::new());
        let download = fast().with_request_timeout(Duration::from_secs(3600));

        let handle = orch
            .start(RunRequest::new("九州", 5, 5).with_download(download))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Billions of tiles; only rejected promptly if never expanded
        let err = orch
            .start(RunRequest::new("全球", 0, 18).with_download(download))
            .unwrap_err();

        assert!(matches!(err, RunError::AlreadyActive { .. }));
        assert_eq!(orch.tracker().snapshot().total, 2);

        handle.task.abort();
    }

    #[tokio::test]
    async fn test_start_while_active_is_rejected() {
        let orch = orchestrator(ScriptedSource::always(Reply::Hang), MemoryTileStore::new());
        let download = fast().with_request_timeout(Duration::from_secs(3600));

        let handle = orch
            .start(RunRequest::new("九州", 5, 5).with_download(download))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let before = orch.tracker().snapshot();

        let err = orch
            .start(RunRequest::new("大阪", 5, 5).with_download(download))
            .unwrap_err();

        assert!(matches!(err, RunError::AlreadyActive { ref region } if region == "九州"));
        let after = orch.tracker().snapshot();
        assert_eq!(after.region, before.region);
        assert_eq!(after.completed, before.completed);
        assert!(after.active);

        handle.task.abort();
    }

    #[tokio::test]
    async fn test_cancel_stops_admission() {
        let source = ScriptedSource::always(Reply::Delayed(
            Duration::from_millis(20),
            b"tile".to_vec(),
        ));
        let orch = orchestrator(source, MemoryTileStore::new());

        let handle = orch
            .start(RunRequest::new("grid", 4, 4).with_download(fast().with_concurrency(2)))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.cancel();
        let report = handle.wait().await.unwrap();

        assert!(report.cancelled);
        assert!(report.completed() < report.total);
        assert!(report.summary_path.is_none());
        assert!(orch.summaries.written.lock().unwrap().is_empty());

        let snap = orch.tracker().snapshot();
        assert!(!snap.active);
        assert!(snap.cancelled);

        // A new run can start once the cancelled one has ended
        let next = orch
            .run(RunRequest::new("九州", 5, 5).with_download(fast()))
            .await
            .unwrap();
        assert_eq!(next.total, 2);
    }

    #[tokio::test]
    async fn test_start_then_wait() {
        let orch = orchestrator(ScriptedSource::ok(), MemoryTileStore::new());
        let handle = orch
            .start(RunRequest::new("九州", 5, 5).with_download(fast()))
            .unwrap();

        let report = handle.wait().await.unwrap();

        assert_eq!(report.success, 2);
        assert!(!orch.tracker().is_active());
    }
}
