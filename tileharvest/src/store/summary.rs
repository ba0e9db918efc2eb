//! JSON run-summary persistence.

use super::{StoreError, SummaryStore};
use crate::run::RunSummary;
use std::path::PathBuf;
use tracing::info;

/// Writes one pretty-printed `metadata_<region>.json` file per region.
///
/// A later run over the same region replaces the earlier file.
#[derive(Debug, Clone)]
pub struct JsonSummaryStore {
    directory: PathBuf,
}

impl JsonSummaryStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Full path of the summary file for a region.
    pub fn summary_path(&self, region: &str) -> PathBuf {
        self.directory.join(summary_file_name(region))
    }
}

/// File name for a region's summary. Path separators in the region name are
/// replaced so the file always lands directly in the summary directory.
pub fn summary_file_name(region: &str) -> String {
    let safe: String = region
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("metadata_{}.json", safe)
}

impl SummaryStore for JsonSummaryStore {
    async fn write(&self, summary: &RunSummary) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| StoreError::io(&self.directory, e))?;

        let json = serde_json::to_string_pretty(summary)?;
        let path = self.summary_path(&summary.region);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        info!(path = %path.display(), region = %summary.region, "Run summary saved");
        Ok(path)
    }
}
