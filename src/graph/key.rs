use geo::Coord;

/// Default node-merging tolerance, in projected units (1 mm in a metric CRS).
pub const DEFAULT_NODE_TOLERANCE: f64 = 1e-3;

/// A coordinate quantized onto a grid of `tolerance` spacing.
/// Two vertices share a graph node iff their keys are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeKey(pub i64, pub i64);

impl NodeKey {
    #[inline]
    pub fn new(coord: &Coord<f64>, tolerance: f64) -> Self {
        Self((coord.x / tolerance).round() as i64, (coord.y / tolerance).round() as i64)
    }
}
