use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};
use serde::{Deserialize, Serialize};

/// PROJ.4 string for the source geographic CRS (GeoJSON lon/lat).
const SOURCE_GEOG_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// PROJ.4 string for World Mercator (EPSG:3395).
const WORLD_MERCATOR_PROJ4: &str = "+proj=merc +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs +type=crs";

/// Target reference system for planar distance and area calculations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCrs {
    /// Coordinates are already planar; leave them untouched.
    None,
    /// UTM zone chosen from the centre of the data (meters).
    #[default]
    Utm,
    /// World Mercator, EPSG:3395 (meters, area inflated away from the equator).
    Mercator,
}

impl fmt::Display for MetricCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricCrs::None => write!(f, "none"),
            MetricCrs::Utm => write!(f, "utm"),
            MetricCrs::Mercator => write!(f, "mercator"),
        }
    }
}

impl FromStr for MetricCrs {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(MetricCrs::None),
            "utm" => Ok(MetricCrs::Utm),
            "mercator" | "epsg:3395" | "3395" => Ok(MetricCrs::Mercator),
            other => bail!("Unknown CRS '{other}' (expected none, utm or mercator)"),
        }
    }
}

/// Build PROJ.4 string for the target UTM CRS, chosen from a lon/lat center.
/// - WGS84: 326zz (north) / 327zz (south)
fn utm_proj4(center: Coord<f64>) -> String {
    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    let south = if center.y >= 0.0 { "" } else { " +south" };

    format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
}

/// Projection from WGS84 lon/lat into a metric CRS.
pub struct MetricProjection {
    crs: MetricCrs,
    target: Option<String>,
    transform: Option<(Proj4, Proj4)>,
}

impl fmt::Debug for MetricProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricProjection")
            .field("crs", &self.crs)
            .field("target", &self.target)
            .finish()
    }
}

impl MetricProjection {
    /// Build a projection into `crs`; `bounds` (lon/lat) picks the UTM zone.
    pub fn new(crs: MetricCrs, bounds: Option<Rect<f64>>) -> Result<Self> {
        let target = match crs {
            MetricCrs::None => None,
            MetricCrs::Utm => {
                let center = bounds
                    .ok_or_else(|| anyhow!("[geom::proj] Cannot pick a UTM zone without data bounds"))?
                    .center();
                Some(utm_proj4(center))
            }
            MetricCrs::Mercator => Some(WORLD_MERCATOR_PROJ4.to_string()),
        };

        let transform = match &target {
            None => None,
            Some(proj_string) => {
                let from = Proj4::from_proj_string(SOURCE_GEOG_PROJ4)
                    .with_context(|| anyhow!("failed to build source PROJ.4: {SOURCE_GEOG_PROJ4}"))?;
                let to = Proj4::from_proj_string(proj_string)
                    .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?;
                Some((from, to))
            }
        };

        Ok(Self { crs, target, transform })
    }

    /// Identity projection, for inputs that are already planar.
    pub fn identity() -> Self {
        Self { crs: MetricCrs::None, target: None, transform: None }
    }

    /// The target reference system.
    #[inline] pub fn crs(&self) -> MetricCrs { self.crs }

    /// The target PROJ.4 definition, if any.
    #[inline] pub fn target(&self) -> Option<&str> { self.target.as_deref() }

    /// Project a single lon/lat coordinate (degrees in, meters out).
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let Some((from, to)) = &self.transform else { return Ok(coord) };

        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(from, to, &mut point)
            .map_err(|e| anyhow!("[geom::proj] CRS transform failed at ({}, {}): {e:?}", coord.x, coord.y))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Project every coordinate of a geometry.
    pub fn project<G>(&self, geometry: &G) -> Result<G>
    where
        G: MapCoords<f64, f64, Output = G> + Clone,
    {
        if self.transform.is_none() { return Ok(geometry.clone()) }
        geometry.try_map_coords(|coord| self.project_coord(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn la_bounds() -> Rect<f64> {
        Rect::new(Coord { x: -118.9, y: 33.7 }, Coord { x: -117.6, y: 34.8 })
    }

    #[test]
    fn parses_crs_names() {
        assert_eq!("UTM".parse::<MetricCrs>().unwrap(), MetricCrs::Utm);
        assert_eq!("epsg:3395".parse::<MetricCrs>().unwrap(), MetricCrs::Mercator);
        assert_eq!("none".parse::<MetricCrs>().unwrap(), MetricCrs::None);
        assert!("lambert".parse::<MetricCrs>().is_err());
    }

    #[test]
    fn utm_zone_follows_data_center() {
        let projection = MetricProjection::new(MetricCrs::Utm, Some(la_bounds())).unwrap();
        assert!(projection.target().unwrap().contains("+zone=11"));
        assert!(!projection.target().unwrap().contains("+south"));
    }

    #[test]
    fn utm_requires_bounds() {
        assert!(MetricProjection::new(MetricCrs::Utm, None).is_err());
    }

    #[test]
    fn utm_projects_to_meters() {
        let projection = MetricProjection::new(MetricCrs::Utm, Some(la_bounds())).unwrap();
        let downtown = projection.project_coord(Coord { x: -118.25, y: 34.05 }).unwrap();
        assert!(downtown.x > 370_000.0 && downtown.x < 400_000.0, "easting {}", downtown.x);
        assert!(downtown.y > 3_700_000.0 && downtown.y < 3_800_000.0, "northing {}", downtown.y);

        // 0.01 degrees of latitude is roughly 1.1 km.
        let north = projection.project_coord(Coord { x: -118.25, y: 34.06 }).unwrap();
        let d = (north.x - downtown.x).hypot(north.y - downtown.y);
        assert!(d > 1_090.0 && d < 1_130.0, "distance {d}");
    }

    #[test]
    fn mercator_matches_equatorial_scale() {
        let projection = MetricProjection::new(MetricCrs::Mercator, None).unwrap();
        let p = projection.project_coord(Coord { x: 1.0, y: 0.0 }).unwrap();
        assert!((p.x - 111_319.49).abs() < 1.0, "x {}", p.x);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn identity_leaves_geometry_untouched() {
        let projection = MetricProjection::identity();
        let line = geo::LineString::from(vec![(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(projection.project(&line).unwrap(), line);
    }
}
