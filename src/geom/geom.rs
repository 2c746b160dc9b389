use geo::{Area, BoundingRect, Coord, Intersects, Line, MultiPolygon, Rect};
use rstar::{RTree, AABB};
use smallvec::SmallVec;

use super::BoundingBox;

/// Geometries holds a collection of MultiPolygons behind an R-tree of their bounding boxes.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes are kept (so indices line up) but never returned by queries.
    pub(crate) fn new(polygons: Vec<MultiPolygon<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                polygons.iter().enumerate()
                    .filter_map(|(i, polygon)| polygon.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            shapes: polygons,
        }
    }

    /// Get the number of MultiPolygons.
    #[cfg(test)]
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[cfg(test)]
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub(crate) fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Indices of shapes whose polygon intersects the segment, ascending.
    pub(crate) fn intersecting(&self, line: &Line<f64>) -> SmallVec<[usize; 4]> {
        let rect = line.bounding_rect();
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());

        let mut hits = self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.idx())
            .filter(|&idx| self.shapes[idx].intersects(line))
            .collect::<SmallVec<[usize; 4]>>();

        // R-tree traversal order is an implementation detail; keep means reproducible.
        hits.sort_unstable();
        hits
    }

    /// Unsigned area of each MultiPolygon, in squared coordinate units.
    pub(crate) fn areas(&self) -> Vec<f64> {
        self.shapes.iter().map(|shape| shape.unsigned_area()).collect()
    }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|polygon| polygon.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }
}
