//! Regions command - list the region catalog.

use tileharvest::config::ConfigFile;
use tileharvest::region::Region;

use crate::error::CliError;

/// Run the regions command.
pub fn run() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let catalog = config.region_catalog();

    println!("Known regions ({})", catalog.len());
    println!();

    for region in catalog.iter() {
        println!("  {}", format_region(region));
    }

    Ok(())
}

/// One catalog line: name followed by its south-west and north-east corners.
fn format_region(region: &Region) -> String {
    let b = region.bounds();
    format!(
        "{:<12} [{:.4}, {:.4}] - [{:.4}, {:.4}]",
        region.name(),
        b.south,
        b.west,
        b.north,
        b.east
    )
}
