//! Coordinate type definitions

use std::fmt;
use thiserror::Error;

/// Latitude bounds. Both are exclusive: the secant term diverges at the poles.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range (inclusive)
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Supported zoom levels. 2^22 still fits comfortably in a `u32` index.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// Tile coordinates in the Web Mercator / Slippy Map system.
///
/// The same triple addresses both the remote resource (`{z}/{x}/{y}`) and the
/// local artifact path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Zoom level
    pub zoom: u8,
    /// X coordinate (west to east), 0 at the antimeridian
    pub x: u32,
    /// Y coordinate (north to south), 0 at the northern Mercator limit
    pub y: u32,
}

impl TileCoord {
    /// Creates a tile coordinate.
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Number of tiles along one axis at this tile's zoom level.
    #[inline]
    pub fn axis_len(&self) -> u32 {
        1u32 << self.zoom
    }

    /// Checks that x and y lie inside the grid for this zoom level.
    pub fn is_valid(&self) -> bool {
        self.zoom <= MAX_ZOOM && self.x < self.axis_len() && self.y < self.axis_len()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is not strictly inside (-90, 90)
    #[error("Invalid latitude: {0} (must be strictly between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),

    /// Longitude is outside [-180, 180]
    #[error("Invalid longitude: {0} (must be between {MIN_LON} and {MAX_LON})")]
    InvalidLongitude(f64),

    /// Zoom level is above the supported maximum
    #[error("Invalid zoom level: {0} (must be between {MIN_ZOOM} and {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Minimum zoom is greater than maximum zoom
    #[error("Invalid zoom range: {min}..={max} (min must not exceed max)")]
    InvalidZoomRange { min: u8, max: u8 },
}
