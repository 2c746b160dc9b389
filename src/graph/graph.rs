use std::fmt;

use ahash::AHashMap;
use geo::{Coord, Geometry, Line, LineString, Rect};
use tracing::{debug, info, warn};

use super::key::{NodeKey, DEFAULT_NODE_TOLERANCE};

/// Index of a node (a distinct road vertex) in a `RoadGraph`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Index of an undirected edge (a road sub-segment) in a `RoadGraph`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "n{}", self.0) }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "e{}", self.0) }
}

/// An undirected edge; endpoints are stored in canonical `(min, max)` order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub length: f64,
}

/// An undirected road graph whose nodes are (quantized) coordinates and whose
/// edges are consecutive vertex pairs of the input polylines.
///
/// Connectivity only comes from shared vertices: this is a union of polylines,
/// not a noded network, so two segments that cross without sharing a vertex
/// stay disconnected.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    tolerance: f64,
    node_index: AHashMap<NodeKey, NodeId>,
    nodes: Vec<Coord<f64>>,
    edges: Vec<Edge>,
    edge_index: AHashMap<(NodeId, NodeId), EdgeId>,
}

impl Default for RoadGraph {
    fn default() -> Self { Self::new(DEFAULT_NODE_TOLERANCE) }
}

impl RoadGraph {
    /// Construct an empty graph merging vertices closer than `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        assert!(tolerance.is_finite() && tolerance > 0.0, "node tolerance must be positive and finite");
        Self {
            tolerance,
            node_index: AHashMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_index: AHashMap::new(),
        }
    }

    /// Build a graph from road geometries. Only simple polylines contribute edges;
    /// every other geometry is skipped (and logged).
    pub fn from_geometries(geometries: &[Geometry<f64>], tolerance: f64) -> Self {
        let mut graph = Self::new(tolerance);
        let mut skipped = 0usize;

        for (i, geometry) in geometries.iter().enumerate() {
            match geometry {
                Geometry::LineString(line) if line.0.len() >= 2 => { graph.add_line_string(line); }
                other => {
                    skipped += 1;
                    debug!("[graph] skipping geometry {i}: {} is not a simple polyline", geometry_kind(other));
                }
            }
        }

        if skipped > 0 {
            warn!("[graph] skipped {skipped} of {} road geometries that are not simple polylines", geometries.len());
        }
        info!("[graph] built road graph with {} nodes and {} edges", graph.node_count(), graph.edge_count());

        graph
    }

    /// Insert an edge for every consecutive vertex pair of a polyline.
    /// Returns the number of segments visited.
    pub fn add_line_string(&mut self, line: &LineString<f64>) -> usize {
        line.0.windows(2)
            .map(|pair| self.add_edge(pair[0], pair[1], (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y)))
            .count()
    }

    /// Insert (or overwrite) the edge between two coordinates.
    /// Re-inserting the same pair, in either orientation, updates the length of
    /// the existing edge and returns its id; it never creates a parallel edge.
    pub fn add_edge(&mut self, a: Coord<f64>, b: Coord<f64>, length: f64) -> EdgeId {
        let (u, v) = canonical(self.intern(a), self.intern(b));

        if let Some(&id) = self.edge_index.get(&(u, v)) {
            self.edges[id.0 as usize].length = length;
            return id;
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge { u, v, length });
        self.edge_index.insert((u, v), id);
        id
    }

    /// Look up the edge between two coordinates, if present.
    pub fn find_edge(&self, a: Coord<f64>, b: Coord<f64>) -> Option<EdgeId> {
        let u = *self.node_index.get(&NodeKey::new(&a, self.tolerance))?;
        let v = *self.node_index.get(&NodeKey::new(&b, self.tolerance))?;
        self.edge_index.get(&canonical(u, v)).copied()
    }

    /// Get the node id for a coordinate, creating the node if needed.
    fn intern(&mut self, coord: Coord<f64>) -> NodeId {
        let key = NodeKey::new(&coord, self.tolerance);
        if let Some(&id) = self.node_index.get(&key) { return id }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(coord);
        self.node_index.insert(key, id);
        id
    }

    /// Get the node-merging tolerance.
    #[inline] pub fn tolerance(&self) -> f64 { self.tolerance }

    /// Get the number of nodes in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Get the number of (undirected) edges in the graph.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Get the coordinate of a node (as first inserted).
    #[inline] pub fn node(&self, id: NodeId) -> Coord<f64> { self.nodes[id.0 as usize] }

    /// Get an edge by id.
    #[inline] pub fn edge(&self, id: EdgeId) -> &Edge { &self.edges[id.0 as usize] }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter().enumerate().map(|(i, edge)| (EdgeId(i as u32), edge))
    }

    /// The straight segment between an edge's endpoints.
    pub fn segment(&self, id: EdgeId) -> Line<f64> {
        let edge = self.edge(id);
        Line::new(self.node(edge.u), self.node(edge.v))
    }

    /// Bounding box of all nodes, `None` for an empty graph.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let (first, rest) = self.nodes.split_first()?;
        let (min, max) = rest.iter().fold((*first, *first), |(min, max), c| (
            Coord { x: min.x.min(c.x), y: min.y.min(c.y) },
            Coord { x: max.x.max(c.x), y: max.y.max(c.y) },
        ));
        Some(Rect::new(min, max))
    }

    /// Get the number of edges incident to a node (self-loops count once).
    pub fn degree(&self, node: NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.u == node || edge.v == node).count()
    }
}

#[inline]
fn canonical(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "degenerate LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, MultiLineString, Point};

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    #[test]
    fn consecutive_vertices_become_edges() {
        let graph = RoadGraph::from_geometries(
            &[Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 3.0, y: 10.0)])],
            DEFAULT_NODE_TOLERANCE,
        );

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge(EdgeId(0)).length, 5.0);
        assert_eq!(graph.edge(EdgeId(1)).length, 6.0);
    }

    #[test]
    fn reinserting_an_edge_overwrites_instead_of_duplicating() {
        let mut graph = RoadGraph::default();
        let first = graph.add_edge(c(0.0, 0.0), c(1.0, 0.0), 1.0);
        let second = graph.add_edge(c(0.0, 0.0), c(1.0, 0.0), 7.5);

        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge(first).length, 7.5);
    }

    #[test]
    fn reversed_orientation_is_the_same_edge() {
        let mut graph = RoadGraph::default();
        let forward = graph.add_edge(c(0.0, 0.0), c(1.0, 1.0), 1.0);
        let backward = graph.add_edge(c(1.0, 1.0), c(0.0, 0.0), 2.0);

        assert_eq!(forward, backward);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.find_edge(c(1.0, 1.0), c(0.0, 0.0)), Some(forward));
    }

    #[test]
    fn shared_vertices_connect_separate_lines() {
        let graph = RoadGraph::from_geometries(
            &[
                Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]),
                Geometry::LineString(line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]),
            ],
            DEFAULT_NODE_TOLERANCE,
        );

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let shared = graph.edge(EdgeId(0)).v;
        assert_eq!(graph.degree(shared), 2);
    }

    #[test]
    fn crossing_lines_without_shared_vertex_stay_disconnected() {
        let graph = RoadGraph::from_geometries(
            &[
                Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 2.0)]),
                Geometry::LineString(line_string![(x: 0.0, y: 2.0), (x: 2.0, y: 0.0)]),
            ],
            DEFAULT_NODE_TOLERANCE,
        );

        assert_eq!(graph.node_count(), 4);
        for node in 0..4 {
            assert_eq!(graph.degree(NodeId(node)), 1);
        }
    }

    #[test]
    fn near_coincident_vertices_merge_within_tolerance() {
        let mut graph = RoadGraph::new(1e-3);
        graph.add_edge(c(0.0, 0.0), c(1.0, 0.0), 1.0);
        graph.add_edge(c(1.0 + 1e-6, 0.0), c(2.0, 0.0), 1.0);
        assert_eq!(graph.node_count(), 3);
        // The first inserted coordinate is kept verbatim.
        assert_eq!(graph.node(NodeId(1)), c(1.0, 0.0));
    }

    #[test]
    fn non_polyline_geometries_are_skipped() {
        let graph = RoadGraph::from_geometries(
            &[
                Geometry::MultiLineString(MultiLineString(vec![
                    line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
                    line_string![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0)],
                ])),
                Geometry::Point(Point::new(0.0, 0.0)),
                Geometry::LineString(line_string![(x: 9.0, y: 9.0)]),
            ],
            DEFAULT_NODE_TOLERANCE,
        );

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn segment_matches_endpoints() {
        let mut graph = RoadGraph::default();
        let id = graph.add_edge(c(2.0, 3.0), c(-1.0, 0.5), 1.0);
        let segment = graph.segment(id);
        assert_eq!(segment.start, c(2.0, 3.0));
        assert_eq!(segment.end, c(-1.0, 0.5));
    }

    #[test]
    fn bounds_cover_every_node() {
        let mut graph = RoadGraph::default();
        assert!(graph.bounds().is_none());

        graph.add_edge(c(2.0, 3.0), c(-1.0, 0.5), 1.0);
        graph.add_edge(c(-1.0, 0.5), c(4.0, -2.0), 1.0);
        let bounds = graph.bounds().unwrap();
        assert_eq!(bounds.min(), c(-1.0, -2.0));
        assert_eq!(bounds.max(), c(4.0, 3.0));
    }

    #[test]
    #[should_panic(expected = "node tolerance must be positive")]
    fn zero_tolerance_is_rejected() {
        let _ = RoadGraph::new(0.0);
    }
}
