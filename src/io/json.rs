use std::{collections::BTreeMap, fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{common, graph::RoadGraph, simulate::{EffectMean, Simulation}};

/// Summary written next to the edge table.
#[derive(Debug, Serialize)]
pub(crate) struct EffectReport {
    pub(crate) edges: usize,
    pub(crate) simulated: usize,
    pub(crate) threshold: f64,
    pub(crate) outcomes: BTreeMap<&'static str, usize>,
    /// Ascending by magnitude.
    pub(crate) means: Vec<EffectMean>,
}

impl EffectReport {
    pub(crate) fn new(graph: &RoadGraph, simulation: &Simulation, threshold: f64) -> Self {
        Self {
            edges: graph.edge_count(),
            simulated: simulation.len(),
            threshold,
            outcomes: simulation.outcome_counts().into_iter().map(|(o, n)| (o.label(), n)).collect(),
            means: simulation.summary().means(),
        }
    }
}

/// Write effect means and outcome counts as pretty-printed JSON.
pub fn write_effect_report(graph: &RoadGraph, simulation: &Simulation, threshold: f64, path: &Path) -> Result<()> {
    common::ensure_parent_exists(path)?;
    let file = File::create(path)
        .with_context(|| format!("[io::json] Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &EffectReport::new(graph, simulation, threshold))
        .with_context(|| format!("[io::json] Failed to write {}", path.display()))
}
