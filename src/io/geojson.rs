//! GeoJSON reading for region boundaries and road networks.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::region::{columns, parse_numeric, RegionShape};

/// Parse a GeoJSON file into a `serde_json::Value`.
fn read_geojson(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("[io::geojson] Failed to parse GeoJSON in {}", path.display()))
}

/// The features of a FeatureCollection (or a single Feature).
fn features(value: &Value) -> Result<Vec<&Value>> {
    match value["type"].as_str() {
        Some("FeatureCollection") => Ok(value["features"].as_array()
            .ok_or_else(|| anyhow!("[io::geojson] FeatureCollection has no 'features' array"))?
            .iter()
            .collect()),
        Some("Feature") => Ok(vec![value]),
        Some(other) => bail!("[io::geojson] Expected a FeatureCollection, found '{other}'"),
        None => bail!("[io::geojson] Missing 'type' member"),
    }
}

/// Read named region polygons from a GeoJSON FeatureCollection.
///
/// Each feature needs a `name` property and a Polygon or MultiPolygon
/// geometry; other features are skipped. Numeric properties are kept.
pub fn read_region_shapes(path: &Path) -> Result<Vec<RegionShape>> {
    let value = read_geojson(path)?;
    let shapes = region_shapes_from_value(&value)
        .with_context(|| format!("[io::geojson] Invalid region file {}", path.display()))?;
    info!("[io::geojson] read {} regions from {}", shapes.len(), path.display());
    Ok(shapes)
}

pub(crate) fn region_shapes_from_value(value: &Value) -> Result<Vec<RegionShape>> {
    let mut shapes = Vec::new();

    for (i, feature) in features(value)?.into_iter().enumerate() {
        let empty = Map::new();
        let properties = feature["properties"].as_object().unwrap_or(&empty);

        let Some(name) = properties.get(columns::NAME).and_then(property_name) else {
            warn!("[io::geojson] skipping feature {i}: no '{}' property", columns::NAME);
            continue;
        };

        let shape = match parse_geometry(&feature["geometry"]).with_context(|| format!("[io::geojson] feature {i} ('{name}')"))? {
            Some(Geometry::Polygon(polygon)) => MultiPolygon(vec![polygon]),
            Some(Geometry::MultiPolygon(multi)) => multi,
            _ => {
                warn!("[io::geojson] skipping feature {i} ('{name}'): not a polygon");
                continue;
            }
        };

        let properties = properties.iter()
            .filter(|(key, _)| key.as_str() != columns::NAME)
            .filter_map(|(key, value)| numeric_property(value).map(|v| (key.clone(), v)))
            .collect::<BTreeMap<_, _>>();

        shapes.push(RegionShape { name, shape, properties });
    }

    Ok(shapes)
}

/// Read road geometries from a GeoJSON FeatureCollection.
/// Features without a geometry are skipped.
pub fn read_road_geometries(path: &Path) -> Result<Vec<Geometry<f64>>> {
    let value = read_geojson(path)?;
    let geometries = road_geometries_from_value(&value)
        .with_context(|| format!("[io::geojson] Invalid road file {}", path.display()))?;
    info!("[io::geojson] read {} road geometries from {}", geometries.len(), path.display());
    Ok(geometries)
}

pub(crate) fn road_geometries_from_value(value: &Value) -> Result<Vec<Geometry<f64>>> {
    let mut geometries = Vec::new();
    for (i, feature) in features(value)?.into_iter().enumerate() {
        match parse_geometry(&feature["geometry"]).with_context(|| format!("[io::geojson] feature {i}"))? {
            Some(geometry) => geometries.push(geometry),
            None => debug!("[io::geojson] feature {i} has no geometry"),
        }
    }
    Ok(geometries)
}

/// Names may be stored as strings or numbers.
fn property_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn numeric_property(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Parse a GeoJSON geometry object. `null` geometries yield `None`.
fn parse_geometry(value: &Value) -> Result<Option<Geometry<f64>>> {
    if value.is_null() { return Ok(None) }

    let coords = &value["coordinates"];
    let geometry = match value["type"].as_str() {
        Some("Point") => Geometry::Point(Point(parse_coord(coords)?)),
        Some("MultiPoint") => Geometry::MultiPoint(MultiPoint(
            array(coords)?.iter().map(|c| parse_coord(c).map(Point)).collect::<Result<_>>()?,
        )),
        Some("LineString") => Geometry::LineString(parse_line(coords)?),
        Some("MultiLineString") => Geometry::MultiLineString(MultiLineString(
            array(coords)?.iter().map(parse_line).collect::<Result<_>>()?,
        )),
        Some("Polygon") => Geometry::Polygon(parse_polygon(coords)?),
        Some("MultiPolygon") => Geometry::MultiPolygon(MultiPolygon(
            array(coords)?.iter().map(parse_polygon).collect::<Result<_>>()?,
        )),
        Some("GeometryCollection") => Geometry::GeometryCollection(geo::GeometryCollection(
            array(&value["geometries"])?.iter()
                .filter_map(|g| parse_geometry(g).transpose())
                .collect::<Result<_>>()?,
        )),
        Some(other) => bail!("[io::geojson] Unsupported geometry type '{other}'"),
        None => bail!("[io::geojson] Geometry has no 'type'"),
    };
    Ok(Some(geometry))
}

fn array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("[io::geojson] Expected an array, found {value}"))
}

/// `[x, y]` or `[x, y, z]`; extra ordinates are ignored.
fn parse_coord(value: &Value) -> Result<Coord<f64>> {
    let position = array(value)?;
    ensure!(position.len() >= 2, "[io::geojson] Position needs at least two numbers");
    let x = position[0].as_f64().ok_or_else(|| anyhow!("[io::geojson] Non-numeric x ordinate"))?;
    let y = position[1].as_f64().ok_or_else(|| anyhow!("[io::geojson] Non-numeric y ordinate"))?;
    Ok(Coord { x, y })
}

fn parse_line(value: &Value) -> Result<LineString<f64>> {
    Ok(LineString(array(value)?.iter().map(parse_coord).collect::<Result<_>>()?))
}

/// First ring is the exterior, the rest are holes.
fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let mut rings = array(value)?.iter().map(parse_line).collect::<Result<Vec<_>>>()?.into_iter();
    let exterior = rings.next().ok_or_else(|| anyhow!("[io::geojson] Polygon has no rings"))?;
    Ok(Polygon::new(exterior, rings.collect()))
}
