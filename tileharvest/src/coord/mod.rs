//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, and expands a bounding box over a zoom
//! range into the full set of tiles covering it.

mod bounds;
mod types;


pub use bounds::BoundingBox;
pub use types::{CoordError, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees, strictly between -90 and 90
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to [`MAX_ZOOM`])
///
/// Indices are clamped into `[0, 2^zoom)`: longitude 180 maps onto the last
/// column, and latitudes past the Mercator limit (~85.0511) onto the first or
/// last row.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(lat > MIN_LAT && lat < MAX_LAT) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = n - 1.0;

    let x = ((lon + 180.0) / 360.0 * n).floor();

    // ln(tan φ + sec φ) is the Mercator ordinate of φ
    let lat_rad = lat.to_radians();
    let mercator = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    let y = ((1.0 - mercator / PI) / 2.0 * n).floor();

    Ok(TileCoord {
        zoom,
        x: x.clamp(0.0, max_index) as u32,
        y: y.clamp(0.0, max_index) as u32,
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    (lat_rad.to_degrees(), lon)
}

/// Expands a bounding box into every tile covering it for each zoom level in
/// `zoom_min..=zoom_max`.
///
/// Both corners are projected and the index ranges are taken as min/max per
/// axis, because north latitudes map to *smaller* y indices. Tiles come out
/// ordered by zoom, then x, then y.
pub fn tile_set(
    bounds: &BoundingBox,
    zoom_min: u8,
    zoom_max: u8,
) -> Result<Vec<TileCoord>, CoordError> {
    if zoom_min > zoom_max {
        return Err(CoordError::InvalidZoomRange {
            min: zoom_min,
            max: zoom_max,
        });
    }

    let mut tiles = Vec::new();
    for zoom in zoom_min..=zoom_max {
        let south_west = to_tile_coords(bounds.south, bounds.west, zoom)?;
        let north_east = to_tile_coords(bounds.north, bounds.east, zoom)?;

        let (x_min, x_max) = min_max(south_west.x, north_east.x);
        let (y_min, y_max) = min_max(south_west.y, north_east.y);

        tiles.reserve(((x_max - x_min + 1) as usize) * ((y_max - y_min + 1) as usize));
        for x in x_min..=x_max {
            for y in y_min..=y_max {
                tiles.push(TileCoord { zoom, x, y });
            }
        }
    }

    Ok(tiles)
}

/// Number of tiles [`tile_set`] would produce, without allocating the list.
pub fn tile_count(bounds: &BoundingBox, zoom_min: u8, zoom_max: u8) -> Result<u64, CoordError> {
    if zoom_min > zoom_max {
        return Err(CoordError::InvalidZoomRange {
            min: zoom_min,
            max: zoom_max,
        });
    }

    let mut total = 0u64;
    for zoom in zoom_min..=zoom_max {
        let south_west = to_tile_coords(bounds.south, bounds.west, zoom)?;
        let north_east = to_tile_coords(bounds.north, bounds.east, zoom)?;
        let columns = south_west.x.abs_diff(north_east.x) as u64 + 1;
        let rows = south_west.y.abs_diff(north_east.y) as u64 + 1;
        total += columns * rows;
    }
    Ok(total)
}

#[inline]
fn min_max(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
