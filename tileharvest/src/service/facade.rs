//! TileHarvest service facade implementation.

use super::error::ServiceError;
use crate::config::{ConfigFile, DownloadConfig};
use crate::coord::TileCoord;
use crate::provider::{AsyncReqwestClient, HttpTileSource, TileSource};
use crate::region::{Region, RegionCatalog};
use crate::run::{RunHandle, RunOrchestrator, RunReport, RunRequest, RunSnapshot, RunTracker};
use crate::store::{DiskTileStore, JsonSummaryStore, StorageStats};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Tile source used by the default service.
pub type DefaultTileSource = HttpTileSource<AsyncReqwestClient>;

/// High-level facade for TileHarvest operations.
///
/// Wires the region catalog, tile source, disk store, summary store and run
/// tracker together and exposes the operations a front end needs.
///
/// # Example
///
/// ```ignore
/// use tileharvest::config::ConfigFile;
/// use tileharvest::service::HarvestService;
///
/// let service = HarvestService::from_config(&ConfigFile::load()?)?;
/// let handle = service.start_run(service.request("九州", 5, 8))?;
/// let report = handle.wait().await?;
/// ```
pub struct HarvestService<S = DefaultTileSource> {
    orchestrator: RunOrchestrator<S, DiskTileStore, JsonSummaryStore>,
    store: Arc<DiskTileStore>,
    download: DownloadConfig,
}

impl HarvestService<DefaultTileSource> {
    /// Create a service from the user's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the endpoint
    /// template is invalid.
    pub fn from_config(config: &ConfigFile) -> Result<Self, ServiceError> {
        let http_client = AsyncReqwestClient::with_options(
            Duration::from_secs(config.download.timeout),
            &config.source.user_agent,
        )?;
        let source = HttpTileSource::new(
            http_client,
            config.source.name.clone(),
            config.source.url_template.clone(),
        )?;

        info!(
            source = %config.source.name,
            url_template = %config.source.url_template,
            directory = %config.storage.directory.display(),
            "Harvest service configured"
        );

        Ok(Self::with_source(
            source,
            config.region_catalog(),
            &config.storage.directory,
            &config.source.extension,
            config.download_config(),
        ))
    }
}

impl<S> HarvestService<S>
where
    S: TileSource + 'static,
{
    /// Create a service around any tile source.
    pub fn with_source(
        source: S,
        catalog: RegionCatalog,
        directory: &Path,
        extension: &str,
        download: DownloadConfig,
    ) -> Self {
        let store = Arc::new(DiskTileStore::new(directory, extension));
        let orchestrator = RunOrchestrator::new(
            Arc::new(catalog),
            Arc::new(source),
            Arc::clone(&store),
            Arc::new(JsonSummaryStore::new(directory)),
            Arc::new(RunTracker::new()),
        );

        Self {
            orchestrator,
            store,
            download,
        }
    }

    /// Sorted names of every known region.
    pub fn list_regions(&self) -> Vec<String> {
        self.orchestrator.catalog().names()
    }

    /// Every known region in name order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.orchestrator.catalog().iter()
    }

    /// Default download parameters for new runs.
    pub fn download_config(&self) -> DownloadConfig {
        self.download
    }

    /// A run request using the service's download parameters.
    pub fn request(&self, region: &str, zoom_min: u8, zoom_max: u8) -> RunRequest {
        RunRequest::new(region, zoom_min, zoom_max).with_download(self.download)
    }

    /// Starts a run in the background.
    ///
    /// Rejected with [`ServiceError::RunAlreadyActive`] while another run is
    /// in progress, or [`ServiceError::Region`] for unknown regions.
    pub fn start_run(&self, request: RunRequest) -> Result<RunHandle, ServiceError> {
        Ok(self.orchestrator.start(request)?)
    }

    /// Runs to completion on the current task.
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, ServiceError> {
        Ok(self.orchestrator.run(request).await?)
    }

    /// Snapshot of the current (or last) run.
    pub fn current_status(&self) -> RunSnapshot {
        self.orchestrator.tracker().snapshot()
    }

    /// Per-zoom tile counts and sizes of the artifact store.
    pub async fn storage_stats(&self) -> Result<StorageStats, ServiceError> {
        Ok(self.store.stats().await?)
    }

    /// Tiles a run over `region` would cover, without fetching anything.
    pub fn tile_set(
        &self,
        region: &str,
        zoom_min: u8,
        zoom_max: u8,
    ) -> Result<Vec<TileCoord>, ServiceError> {
        Ok(self
            .orchestrator
            .catalog()
            .tile_set(region, zoom_min, zoom_max)?)
    }

    /// Root of the artifact store.
    pub fn store_root(&self) -> &Path {
        self.store.root()
    }

    /// Path of the summary file a run over `region` writes.
    pub fn summary_path(&self, region: &str) -> PathBuf {
        JsonSummaryStore::new(self.store.root()).summary_path(region)
    }
}
