//! Geographic bounding boxes.

use super::types::{CoordError, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use std::fmt;

/// A latitude/longitude rectangle, stored as (south, west, north, east).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Creates a bounding box, validating each edge and the edge ordering.
    ///
    /// Latitudes must lie strictly inside (-90, 90) and longitudes inside
    /// [-180, 180]. `south < north` and `west < east` must hold.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, CoordError> {
        for lat in [south, north] {
            if !(lat > MIN_LAT && lat < MAX_LAT) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        for lon in [west, east] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        if south >= north {
            return Err(CoordError::InvalidLatitude(south));
        }
        if west >= east {
            return Err(CoordError::InvalidLongitude(west));
        }

        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Creates a bounding box from `[[south, west], [north, east]]` corners.
    pub fn from_corners(south_west: [f64; 2], north_east: [f64; 2]) -> Result<Self, CoordError> {
        Self::new(south_west[0], south_west[1], north_east[0], north_east[1])
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] - [{}, {}]",
            self.south, self.west, self.north, self.east
        )
    }
}
