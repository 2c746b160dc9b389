//! Shapefile reading for road networks.

use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, Geometry, LineString, MultiLineString, Point};
use shapefile::{Reader, Shape};
use tracing::{info, warn};

/// Read road geometries from a shapefile (`.shp` with its `.dbf`).
/// Polylines become line strings (multi-part ones multi line strings);
/// points are kept; everything else is dropped.
pub fn read_road_shapefile(path: &Path) -> Result<Vec<Geometry<f64>>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut geometries = Vec::new();
    let mut dropped = 0usize;
    for result in reader.iter_shapes_and_records() {
        let (shape, _) = result.with_context(|| format!("[io::shp] Error reading shape from {}", path.display()))?;
        match shape_to_geometry(&shape) {
            Some(geometry) => geometries.push(geometry),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("[io::shp] dropped {dropped} shapes that are neither polylines nor points");
    }
    info!("[io::shp] read {} road geometries from {}", geometries.len(), path.display());
    Ok(geometries)
}

fn shape_to_geometry(shape: &Shape) -> Option<Geometry<f64>> {
    match shape {
        Shape::Polyline(line) => Some(parts_to_geometry(line.parts(), |p: &shapefile::Point| Coord { x: p.x, y: p.y })),
        Shape::PolylineM(line) => Some(parts_to_geometry(line.parts(), |p: &shapefile::PointM| Coord { x: p.x, y: p.y })),
        Shape::PolylineZ(line) => Some(parts_to_geometry(line.parts(), |p: &shapefile::PointZ| Coord { x: p.x, y: p.y })),
        Shape::Point(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
        Shape::PointM(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
        Shape::PointZ(p) => Some(Geometry::Point(Point::new(p.x, p.y))),
        _ => None,
    }
}

fn parts_to_geometry<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> Coord<f64>) -> Geometry<f64> {
    let mut lines = parts.iter()
        .map(|part| LineString(part.iter().map(&xy).collect()))
        .collect::<Vec<_>>();

    if lines.len() == 1 {
        Geometry::LineString(lines.remove(0))
    } else {
        Geometry::MultiLineString(MultiLineString(lines))
    }
}
