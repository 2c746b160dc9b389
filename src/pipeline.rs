//! The end-to-end simulation pipeline, free of I/O.

use anyhow::{Context, Result};
use geo::{BoundingRect, Coord, Geometry, Rect};
use tracing::{info, warn};

use crate::{
    geom::{MetricCrs, MetricProjection},
    graph::RoadGraph,
    region::RegionTable,
    simulate::{Simulation, SimulationConfig},
};

/// Build the road graph and run the effect model over it.
/// `regions` and `road_geometries` must already share one reference system.
pub fn run(regions: &RegionTable, road_geometries: &[Geometry<f64>], config: &SimulationConfig) -> Result<(RoadGraph, Simulation)> {
    config.validate()?;

    let graph = RoadGraph::from_geometries(road_geometries, config.node_tolerance);
    let simulation = Simulation::run(&graph, regions, config);

    for (outcome, count) in simulation.outcome_counts() {
        info!("[pipeline] {outcome}: {count} edges");
    }

    Ok((graph, simulation))
}

/// Reproject lon/lat regions and roads into the configured metric CRS.
/// The UTM zone is picked from the region bounds, or from the roads when there
/// are no regions. With no data at all the inputs pass through unchanged.
pub fn project_inputs(
    regions: &RegionTable,
    road_geometries: &[Geometry<f64>],
    config: &SimulationConfig,
) -> Result<(RegionTable, Vec<Geometry<f64>>)> {
    let bounds = regions.bounds().or_else(|| geometry_bounds(road_geometries));
    let projection = match (config.crs, bounds) {
        (MetricCrs::Utm, None) => {
            warn!("[pipeline] no regions or roads to pick a UTM zone from; leaving inputs unprojected");
            MetricProjection::identity()
        }
        (crs, bounds) => MetricProjection::new(crs, bounds)?,
    };
    info!("[pipeline] projecting inputs to {}", projection.target().unwrap_or("input coordinates"));

    let regions = regions.reproject(&projection)
        .context("[pipeline] Failed to reproject regions")?;
    let roads = road_geometries.iter()
        .map(|geometry| projection.project(geometry))
        .collect::<Result<Vec<_>>>()
        .context("[pipeline] Failed to reproject roads")?;

    Ok((regions, roads))
}

/// Union of the bounding boxes of `geometries`.
fn geometry_bounds(geometries: &[Geometry<f64>]) -> Option<Rect<f64>> {
    geometries.iter()
        .filter_map(|geometry| geometry.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}
