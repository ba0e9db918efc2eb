//! Region catalog: lookup by name and tile expansion.

use super::{Region, RegionError};
use crate::coord::{self, TileCoord};
use std::collections::BTreeMap;

/// Built-in region table as `(name, [south, west], [north, east])`.
const BUILTIN_REGIONS: &[(&str, [f64; 2], [f64; 2])] = &[
    ("全日本", [24.0, 122.0], [46.0, 149.0]),
    ("关东", [34.8, 138.3], [37.2, 141.0]),
    ("关西", [33.3, 134.0], [36.0, 137.0]),
    ("北海道", [41.0, 139.0], [46.0, 146.5]),
    ("九州", [30.9, 129.5], [34.0, 132.1]),
    ("东京周边", [35.4, 139.2], [36.0, 140.0]),
    ("大阪", [34.4, 135.3], [34.9, 135.7]),
    ("名古屋", [35.0, 136.7], [35.3, 137.1]),
    ("京都", [34.9, 135.6], [35.15, 135.9]),
    ("横滨", [35.3, 139.5], [35.6, 139.7]),
    ("福冈", [33.4, 130.2], [33.8, 130.6]),
    ("札幌", [42.8, 141.1], [43.2, 141.6]),
    ("全球", [-85.0, -180.0], [85.0, 180.0]),
];

/// Returns the built-in regions.
pub fn builtin_regions() -> Vec<Region> {
    BUILTIN_REGIONS
        .iter()
        .filter_map(|(name, sw, ne)| Region::from_corners(*name, *sw, *ne).ok())
        .collect()
}

/// Every region known to the process, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: BTreeMap<String, Region>,
}

impl RegionCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog containing the built-in regions.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for region in builtin_regions() {
            catalog.insert(region);
        }
        catalog
    }

    /// Adds a region, replacing any existing region with the same name.
    pub fn insert(&mut self, region: Region) {
        self.regions.insert(region.name().to_string(), region);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_region(mut self, region: Region) -> Self {
        self.insert(region);
        self
    }

    /// Region names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }

    /// Iterates over the regions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Looks up a region by name.
    pub fn get(&self, name: &str) -> Result<&Region, RegionError> {
        self.regions.get(name).ok_or_else(|| RegionError::Unknown {
            name: name.to_string(),
            available: self.names(),
        })
    }

    /// Expands a named region into its tile set over `zoom_min..=zoom_max`.
    pub fn tile_set(
        &self,
        name: &str,
        zoom_min: u8,
        zoom_max: u8,
    ) -> Result<Vec<TileCoord>, RegionError> {
        let region = self.get(name)?;
        Ok(coord::tile_set(region.bounds(), zoom_min, zoom_max)?)
    }

    /// Size of [`RegionCatalog::tile_set`] without building the list.
    pub fn tile_count(
        &self,
        name: &str,
        zoom_min: u8,
        zoom_max: u8,
    ) -> Result<u64, RegionError> {
        let region = self.get(name)?;
        Ok(coord::tile_count(region.bounds(), zoom_min, zoom_max)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::CoordError;

    #[test]
    fn test_builtins_are_all_valid() {
        assert_eq!(builtin_regions().len(), BUILTIN_REGIONS.len());
    }

    #[test]
    fn test_names_sorted_and_unique() {
        let catalog = RegionCatalog::with_builtins();
        let names = catalog.names();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert_eq!(catalog.len(), BUILTIN_REGIONS.len());
    }

    #[test]
    fn test_kyushu_lookup() {
        let catalog = RegionCatalog::with_builtins();
        let region = catalog.get("九州").unwrap();
        assert_eq!(region.bounds().south, 30.9);
        assert_eq!(region.bounds().north, 34.0);
    }

    #[test]
    fn test_kyushu_tile_set_is_deterministic() {
        let catalog = RegionCatalog::with_builtins();
        let first = catalog.tile_set("九州", 5, 5).unwrap();
        let second = catalog.tile_set("九州", 5, 5).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_tile_count_matches_tile_set() {
        let catalog = RegionCatalog::with_builtins();
        let tiles = catalog.tile_set("九州", 5, 7).unwrap();
        assert_eq!(catalog.tile_count("九州", 5, 7).unwrap(), tiles.len() as u64);
        assert!(catalog.tile_count("Atlantis", 5, 7).is_err());
    }

    #[test]
    fn test_unknown_region_is_an_error() {
        let catalog = RegionCatalog::with_builtins();
        let err = catalog.tile_set("Atlantis", 5, 6).unwrap_err();
        match err {
            RegionError::Unknown { name, available } => {
                assert_eq!(name, "Atlantis");
                assert!(available.contains(&"九州".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inverted_zoom_range_surfaces_coord_error() {
        let catalog = RegionCatalog::with_builtins();
        let err = catalog.tile_set("九州", 9, 5).unwrap_err();
        assert_eq!(
            err,
            RegionError::Coord(CoordError::InvalidZoomRange { min: 9, max: 5 })
        );
    }

    #[test]
    fn test_custom_region_overrides_builtin() {
        let custom = Region::from_corners("九州", [32.0, 130.0], [32.1, 130.1]).unwrap();
        let catalog = RegionCatalog::with_builtins().with_region(custom.clone());
        assert_eq!(catalog.get("九州").unwrap(), &custom);
        assert_eq!(catalog.len(), BUILTIN_REGIONS.len());
    }

    #[test]
    fn test_invalid_region_bounds() {
        let err = Region::from_corners("bad", [40.0, 10.0], [30.0, 20.0]).unwrap_err();
        assert!(matches!(err, RegionError::InvalidBounds { .. }));
    }
}
