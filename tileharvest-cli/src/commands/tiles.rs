//! Tiles command - count the tiles a region covers without downloading.

use tileharvest::config::ConfigFile;
use tileharvest::coord::{tile_count, BoundingBox};
use tileharvest::region::RegionError;

use crate::error::CliError;

/// Run the tiles command.
pub fn run(region: &str, zoom_min: u8, zoom_max: u8) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let catalog = config.region_catalog();
    let region = catalog.get(region)?;

    let counts = counts_per_zoom(region.bounds(), zoom_min, zoom_max)?;
    let total: u64 = counts.iter().map(|(_, count)| count).sum();

    println!("Region: {}", region.name());
    println!();
    println!("  {:<6} {:>12}", "Zoom", "Tiles");
    for (zoom, count) in &counts {
        println!("  {:<6} {:>12}", zoom, count);
    }
    println!("  {:<6} {:>12}", "Total", total);

    Ok(())
}

/// Tile count at each zoom level of the range.
fn counts_per_zoom(
    bounds: &BoundingBox,
    zoom_min: u8,
    zoom_max: u8,
) -> Result<Vec<(u8, u64)>, RegionError> {
    // Validates the range as a whole before counting level by level
    tile_count(bounds, zoom_min, zoom_max)?;

    (zoom_min..=zoom_max)
        .map(|zoom| {
            tile_count(bounds, zoom, zoom)
                .map(|count| (zoom, count))
                .map_err(RegionError::from)
        })
        .collect()
}
