#![doc = "Road-network PM2.5 effect-attribution simulator.

Regions carry socioeconomic attributes; every road segment that crosses
regions gets a simulated PM2.5 change from the mean attributes of the
regions it touches."]
mod common;
mod geom;
mod graph;
mod io;
mod region;
mod simulate;

pub mod pipeline;

#[doc(inline)]
pub use geom::{MetricCrs, MetricProjection};

#[doc(inline)]
pub use graph::{Edge, EdgeId, NodeId, NodeKey, RoadGraph, DEFAULT_NODE_TOLERANCE};

#[doc(inline)]
pub use region::{
    classify_exposure, columns, convert_attributes, AttributeRow, AttributeTable, Exposure, ExposureAreas,
    ExposureCriteria, Region, RegionShape, RegionTable,
};

#[doc(inline)]
pub use simulate::{
    density_modifier, income_modifier, simulate_edge, EdgeResult, EffectCoefficients, EffectKind, EffectMean,
    EffectSummary, EffectTerms, Outcome, Simulation, SimulationConfig,
};

#[doc(inline)]
pub use io::{
    csv::{read_attribute_table, write_attribute_table, write_edge_results, write_named_values},
    geojson::{read_region_shapes, read_road_geometries},
    json::write_effect_report,
    read_roads,
    shp::read_road_shapefile,
    svg::{write_effects_svg, write_exposure_svg, write_simulation_svg},
};
