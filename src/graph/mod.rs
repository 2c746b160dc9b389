mod graph;
mod key;

pub use graph::{Edge, EdgeId, NodeId, RoadGraph};
pub use key::{NodeKey, DEFAULT_NODE_TOLERANCE};
