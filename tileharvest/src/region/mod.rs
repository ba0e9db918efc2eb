//! Named geographic regions.
//!
//! A [`Region`] pairs a unique name with a [`BoundingBox`]. The
//! [`RegionCatalog`] holds every region known to the process: the built-in
//! Japanese areas plus any user-defined regions from the `[regions]` config
//! section.

mod catalog;

pub use catalog::{builtin_regions, RegionCatalog};

use crate::coord::{BoundingBox, CoordError};
use thiserror::Error;

/// A named bounding box. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    bounds: BoundingBox,
}

impl Region {
    /// Creates a region. Bounds are validated by [`BoundingBox::new`].
    pub fn new(name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    /// Creates a region from `[[south, west], [north, east]]` corners.
    pub fn from_corners(
        name: impl Into<String>,
        south_west: [f64; 2],
        north_east: [f64; 2],
    ) -> Result<Self, RegionError> {
        let name = name.into();
        let bounds = BoundingBox::from_corners(south_west, north_east).map_err(|source| {
            RegionError::InvalidBounds {
                name: name.clone(),
                source,
            }
        })?;
        Ok(Self { name, bounds })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

/// Errors raised while resolving regions or expanding them into tiles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// No region with this name exists
    #[error("Unknown region: '{name}'. Available: {}", available.join(", "))]
    Unknown { name: String, available: Vec<String> },

    /// A region was defined with invalid bounds
    #[error("Invalid bounds for region '{name}': {source}")]
    InvalidBounds {
        name: String,
        #[source]
        source: CoordError,
    },

    /// Tile expansion failed (e.g. inverted zoom range)
    #[error(transparent)]
    Coord(#[from] CoordError),
}
