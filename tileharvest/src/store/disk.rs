//! Filesystem-backed tile store.

use super::path::{layout_descriptor, tile_path};
use super::stats::StorageStats;
use super::{StoreError, TileStore};
use crate::coord::TileCoord;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Stores tiles as `<root>/<zoom>/<x>/<y>.<ext>`.
#[derive(Debug, Clone)]
pub struct DiskTileStore {
    root: PathBuf,
    extension: String,
}

impl DiskTileStore {
    /// Creates a store rooted at `root` using the given file extension
    /// (without the leading dot).
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the artifact for one tile.
    pub fn tile_path(&self, tile: &TileCoord) -> PathBuf {
        tile_path(&self.root, tile, &self.extension)
    }

    /// Creates a directory and all of its parents.
    pub async fn ensure_directory(&self, dir: &Path) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StoreError::io(dir, e))
    }

    /// Scans the store and tallies tiles and bytes per zoom level.
    ///
    /// The directory walk runs on the blocking pool.
    pub async fn stats(&self) -> Result<StorageStats, StoreError> {
        let root = self.root.clone();
        let extension = self.extension.clone();
        tokio::task::spawn_blocking(move || {
            StorageStats::scan(&root, &extension).map_err(|e| StoreError::io(&root, e))
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

impl TileStore for DiskTileStore {
    async fn exists(&self, tile: TileCoord) -> bool {
        let path = self.tile_path(&tile);
        tokio::fs::try_exists(&path).await.unwrap_or(false)
    }

    async fn write(&self, tile: TileCoord, data: &[u8]) -> Result<(), StoreError> {
        let path = self.tile_path(&tile);
        if let Some(parent) = path.parent() {
            self.ensure_directory(parent).await?;
        }

        // Write atomically via temp file
        let temp_path = path.with_extension(format!("{}.part", self.extension));
        tokio::fs::write(&temp_path, data)
            .await
            .map_err(|e| StoreError::io(&temp_path, e))?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::io(&path, e));
        }

        trace!(tile = %tile, bytes = data.len(), "Tile written");
        Ok(())
    }

    fn layout_descriptor(&self) -> String {
        layout_descriptor(&self.root, &self.extension)
    }
}
