//! Storage statistics gathered by scanning the tile directory tree.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Tile count and byte total for one zoom level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoomLevelStats {
    pub zoom: u8,
    pub count: u64,
    pub bytes: u64,
}

impl ZoomLevelStats {
    /// Size in megabytes, rounded to two decimals.
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.bytes)
    }
}

/// Per-zoom and overall totals for the artifact store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// One entry per zoom directory, ascending by zoom
    pub levels: Vec<ZoomLevelStats>,
    pub total_files: u64,
    pub total_bytes: u64,
}

impl StorageStats {
    /// Walks `<root>/<zoom>/...` and counts files with the given extension.
    ///
    /// Only top-level directories with a numeric name are treated as zoom
    /// levels. A missing root yields empty statistics.
    pub fn scan(root: &Path, extension: &str) -> io::Result<Self> {
        let mut stats = StorageStats::default();
        if !root.is_dir() {
            return Ok(stats);
        }

        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(zoom) = entry.file_name().to_str().and_then(|n| n.parse::<u8>().ok())
            else {
                continue;
            };

            let mut level = ZoomLevelStats {
                zoom,
                count: 0,
                bytes: 0,
            };
            tally_dir(&entry.path(), extension, &mut level)?;

            stats.total_files += level.count;
            stats.total_bytes += level.bytes;
            stats.levels.push(level);
        }

        stats.levels.sort_by_key(|l| l.zoom);
        Ok(stats)
    }

    /// Total size in megabytes, rounded to two decimals.
    pub fn total_size_mb(&self) -> f64 {
        bytes_to_mb(self.total_bytes)
    }
}

fn tally_dir(dir: &Path, extension: &str, level: &mut ZoomLevelStats) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            tally_dir(&path, extension, level)?;
        } else if file_type.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(extension)
        {
            level.count += 1;
            level.bytes += entry.metadata()?.len();
        }
    }
    Ok(())
}

/// Converts bytes to megabytes rounded to two decimal places.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
}
