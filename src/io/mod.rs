//! IO module for format-specific reading and writing operations.
//!
//! Each format module handles reading and/or writing for one file format:
//!
//! - `csv` - attribute tables and per-edge results (via polars)
//! - `geojson` - region boundaries and road networks
//! - `shp` - road networks from ESRI shapefiles
//! - `json` - effect means and outcome counts
//! - `svg` - map export

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod json;
pub(crate) mod shp;
pub(crate) mod svg;

use std::path::Path;

use anyhow::Result;
use geo::Geometry;

/// Read road geometries, choosing the reader from the file extension
/// (`.shp` for shapefiles, anything else as GeoJSON).
pub fn read_roads(path: &Path) -> Result<Vec<Geometry<f64>>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("shp") => shp::read_road_shapefile(path),
        _ => geojson::read_road_geometries(path),
    }
}
