//! Local persistence for tiles and run summaries.
//!
//! Tiles are stored hierarchically under a root directory:
//! ```text
//! <root>/<zoom>/<x>/<y>.<ext>
//! ```
//! Distinct tiles never share a path, so concurrent writers need no locking.
//! Writes go to a temporary sibling and are renamed into place, so a later
//! existence check never mistakes a partial file for a complete tile.

mod disk;
mod path;
mod stats;
mod summary;

pub use disk::DiskTileStore;
pub use path::{layout_descriptor, tile_path};
pub use stats::{bytes_to_mb, StorageStats, ZoomLevelStats};
pub use summary::{summary_file_name, JsonSummaryStore};

use crate::coord::TileCoord;
use crate::run::RunSummary;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by tile and summary stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Summary could not be serialized
    #[error("Failed to serialize run summary: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A blocking helper task failed to complete
    #[error("Background task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Byte store for tile artifacts keyed by tile coordinate.
pub trait TileStore: Send + Sync {
    /// Checks whether a complete artifact exists for the tile.
    fn exists(&self, tile: TileCoord) -> impl Future<Output = bool> + Send;

    /// Writes the whole artifact for a tile, creating directories as needed.
    fn write(&self, tile: TileCoord, data: &[u8])
        -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Layout string recorded in run summaries, e.g. `map_tiles/{z}/{x}/{y}.png`.
    fn layout_descriptor(&self) -> String;
}

/// Durable, human-inspectable record of completed runs.
pub trait SummaryStore: Send + Sync {
    /// Persists one summary, returning where it was written.
    fn write(&self, summary: &RunSummary)
        -> impl Future<Output = Result<PathBuf, StoreError>> + Send;
}
