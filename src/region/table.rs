use std::collections::BTreeMap;

use anyhow::Result;
use geo::{Line, MultiPolygon, Rect};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::{common::mean_present, geom::{Geometries, MetricProjection}};
use super::attrs::{AttributeRow, AttributeTable};

/// A named polygon as read from the boundary file, before the attribute merge.
#[derive(Debug, Clone)]
pub struct RegionShape {
    pub name: String,
    pub shape: MultiPolygon<f64>,
    /// Numeric properties carried by the boundary file itself (e.g. `total_pop`).
    pub properties: BTreeMap<String, f64>,
}

/// A named area with its attached attribute row.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub properties: BTreeMap<String, f64>,
    /// Empty when the attribute table had no row for this name.
    pub attributes: AttributeRow,
}

/// The merged region set: polygons, attributes, and a spatial index.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: Vec<Region>,
    geoms: Geometries,
}

impl RegionTable {
    /// Left-join attribute rows onto shapes by region name.
    /// Every shape is kept; shapes without a matching row get an empty row.
    pub fn merge(shapes: Vec<RegionShape>, attributes: &AttributeTable) -> Self {
        let mut polygons = Vec::with_capacity(shapes.len());
        let mut regions = Vec::with_capacity(shapes.len());
        let mut unmatched = 0usize;

        for RegionShape { name, shape, properties } in shapes {
            let attributes = match attributes.get(&name) {
                Some(row) => row.clone(),
                None => {
                    unmatched += 1;
                    debug!("[region] no attribute row for '{name}'");
                    AttributeRow::new()
                }
            };
            polygons.push(shape);
            regions.push(Region { name, properties, attributes });
        }

        info!("[region] merged {} regions ({} without attributes)", regions.len(), unmatched);
        Self { regions, geoms: Geometries::new(polygons) }
    }

    /// Get the number of regions.
    #[inline] pub fn len(&self) -> usize { self.regions.len() }

    /// Check if there are no regions.
    #[inline] pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    /// Get all regions, in input order.
    #[inline] pub fn regions(&self) -> &[Region] { &self.regions }

    /// Get a region by index.
    #[inline] pub fn region(&self, idx: usize) -> &Region { &self.regions[idx] }

    /// Get all region polygons, aligned with `regions()`.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { self.geoms.shapes() }

    /// Bounding rectangle of all region polygons.
    #[inline] pub fn bounds(&self) -> Option<Rect<f64>> { self.geoms.bounds() }

    /// Polygon areas, in squared coordinate units.
    #[inline] pub fn areas(&self) -> Vec<f64> { self.geoms.areas() }

    /// Find the index of the first region with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|region| region.name == name)
    }

    /// Indices of regions whose polygon intersects the segment, ascending.
    #[inline]
    pub fn intersecting(&self, line: &Line<f64>) -> SmallVec<[usize; 4]> {
        self.geoms.intersecting(line)
    }

    /// Mean of `column` over the selected regions that have a value for it.
    /// Returns `None` when none of them does.
    pub fn mean(&self, indices: &[usize], column: &str) -> Option<f64> {
        mean_present(indices.iter().map(|&i| self.regions[i].attributes.get(column)))
    }

    /// A copy of this table with every polygon reprojected.
    pub fn reproject(&self, projection: &MetricProjection) -> Result<Self> {
        let polygons = self.geoms.shapes().iter()
            .map(|shape| projection.project(shape))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { regions: self.regions.clone(), geoms: Geometries::new(polygons) })
    }
}
