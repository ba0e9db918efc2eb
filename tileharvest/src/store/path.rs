//! Tile path construction.

use crate::coord::TileCoord;
use std::path::{Path, PathBuf};

/// Construct the full path for a stored tile.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use tileharvest::coord::TileCoord;
/// use tileharvest::store::tile_path;
///
/// let path = tile_path(&PathBuf::from("/tiles"), &TileCoord::new(5, 27, 12), "png");
/// assert_eq!(path, PathBuf::from("/tiles/5/27/12.png"));
/// ```
pub fn tile_path(root: &Path, tile: &TileCoord, extension: &str) -> PathBuf {
    root.join(tile.zoom.to_string())
        .join(tile.x.to_string())
        .join(format!("{}.{}", tile.y, extension))
}

/// Describes the on-disk layout, e.g. `map_tiles/{z}/{x}/{y}.png`.
pub fn layout_descriptor(root: &Path, extension: &str) -> String {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());
    format!("{}/{{z}}/{{x}}/{{y}}.{}", root_name, extension)
}
