use std::collections::BTreeMap;

use geo::Line;
use serde::Serialize;
use tracing::{debug, info};

use crate::graph::{EdgeId, RoadGraph};
use crate::region::{columns, RegionTable};
use super::config::SimulationConfig;
use super::effect::{density_modifier, income_modifier, EffectTerms};
use super::outcome::Outcome;
use super::summary::EffectSummary;

/// Simulation output for one edge. Produced once, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EdgeResult {
    pub initial_pm25: f64,
    pub simulated_pm25: f64,
    pub pm25_reduction: f64,
    pub outcome: Outcome,
    pub terms: EffectTerms,
    /// Number of regions the segment intersects.
    pub region_count: usize,
}

impl EdgeResult {
    #[inline] pub fn total_effect(&self) -> f64 { self.terms.total() }
}

/// Simulate a single road segment against the region table.
///
/// Returns `None` when the segment touches no region, or when none of the
/// touched regions has a baseline PM2.5, income or density value.
pub fn simulate_edge(segment: &Line<f64>, regions: &RegionTable, config: &SimulationConfig) -> Option<EdgeResult> {
    let selected = regions.intersecting(segment);
    if selected.is_empty() { return None }

    let initial_pm25 = regions.mean(&selected, columns::PM25)?;
    let income = regions.mean(&selected, columns::MEDIAN_HOUSEHOLD_INCOME)?;
    let density = regions.mean(&selected, columns::POPULATION_DENSITY)?;
    let transit_share = regions.mean(&selected, columns::PUBLIC_TRANSIT);

    let terms = EffectTerms::compute(
        income_modifier(income, config.income_scale),
        density_modifier(density, config.density_scale),
        transit_share,
        config,
    );

    let simulated_pm25 = (initial_pm25 * (1.0 + terms.total())).max(0.0);

    Some(EdgeResult {
        initial_pm25,
        simulated_pm25,
        pm25_reduction: initial_pm25 - simulated_pm25,
        outcome: Outcome::classify(initial_pm25, simulated_pm25, config.threshold),
        terms,
        region_count: selected.len(),
    })
}

/// Results of one simulation pass over a road graph.
///
/// Kept apart from the graph: edges without a result were skipped.
#[derive(Clone, Debug, Default)]
pub struct Simulation {
    results: BTreeMap<EdgeId, EdgeResult>,
    summary: EffectSummary,
}

impl Simulation {
    /// Simulate every edge of `graph` in edge-id order.
    /// `regions` must be in the same coordinate system as the graph.
    pub fn run(graph: &RoadGraph, regions: &RegionTable, config: &SimulationConfig) -> Self {
        let mut simulation = Self::default();

        for (id, _) in graph.edges() {
            match simulate_edge(&graph.segment(id), regions, config) {
                Some(result) => {
                    simulation.summary.push(&result.terms);
                    simulation.results.insert(id, result);
                }
                None => debug!("[simulate] skipped edge {id}"),
            }
        }

        info!(
            "[simulate] simulated {} of {} edges ({} skipped)",
            simulation.results.len(),
            graph.edge_count(),
            graph.edge_count() - simulation.results.len(),
        );
        simulation
    }

    /// Result for one edge, if it was simulated.
    #[inline] pub fn result(&self, id: EdgeId) -> Option<&EdgeResult> { self.results.get(&id) }

    /// All results, ordered by edge id.
    pub fn results(&self) -> impl Iterator<Item = (EdgeId, &EdgeResult)> + '_ {
        self.results.iter().map(|(&id, result)| (id, result))
    }

    #[inline] pub fn summary(&self) -> &EffectSummary { &self.summary }

    /// Number of simulated edges.
    #[inline] pub fn len(&self) -> usize { self.results.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.results.is_empty() }

    /// Count of simulated edges per outcome, in `Outcome::ALL` order.
    pub fn outcome_counts(&self) -> [(Outcome, usize); 4] {
        Outcome::ALL.map(|outcome| (outcome, self.results.values().filter(|r| r.outcome == outcome).count()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geo::{coord, polygon, Geometry, LineString, MultiPolygon};

    use super::*;
    use crate::region::{AttributeRow, AttributeTable, RegionShape};
    use crate::simulate::EffectKind;

    fn square(name: &str, x0: f64, x1: f64) -> RegionShape {
        RegionShape {
            name: name.to_string(),
            shape: MultiPolygon(vec![polygon![
                (x: x0, y: 0.0), (x: x1, y: 0.0), (x: x1, y: 10.0), (x: x0, y: 10.0), (x: x0, y: 0.0),
            ]]),
            properties: BTreeMap::new(),
        }
    }

    fn row(pm25: Option<f64>, income: Option<f64>, density: Option<f64>, transit: Option<f64>) -> AttributeRow {
        let mut row = AttributeRow::new();
        row.set(columns::PM25, pm25);
        row.set(columns::MEDIAN_HOUSEHOLD_INCOME, income);
        row.set(columns::POPULATION_DENSITY, density);
        row.set(columns::PUBLIC_TRANSIT, transit);
        row
    }

    /// Region A on x in [0, 10], region B on x in [10, 20].
    fn two_regions() -> RegionTable {
        let mut attrs = AttributeTable::new(vec![]);
        attrs.push("A", row(Some(15.0), Some(200_000.0), Some(2_000.0), Some(0.05)));
        attrs.push("B", row(Some(10.0), Some(50_000.0), Some(500.0), Some(0.2)));
        RegionTable::merge(vec![square("A", 0.0, 10.0), square("B", 10.0, 20.0)], &attrs)
    }

    fn segment(x0: f64, x1: f64) -> Line<f64> {
        Line::new(coord! { x: x0, y: 5.0 }, coord! { x: x1, y: 5.0 })
    }

    #[test]
    fn segment_spanning_two_regions_uses_their_means() {
        let config = SimulationConfig::default();
        let result = simulate_edge(&segment(5.0, 15.0), &two_regions(), &config).unwrap();

        let m = 2.25f64.ln();
        let expected_total = -0.03 * m + 0.07 * m + 0.04 * m - 0.06 * m + 0.05 * m;
        let expected_sim = 12.5 * (1.0 + expected_total);

        assert_eq!(result.region_count, 2);
        assert!((result.initial_pm25 - 12.5).abs() < 1e-12);
        assert!((result.terms.short_commute - 0.05 * m).abs() < 1e-12);
        assert!((result.total_effect() - expected_total).abs() < 1e-12);
        assert!((result.simulated_pm25 - expected_sim).abs() < 1e-9);
        assert!((result.simulated_pm25 - 13.2096).abs() < 1e-3);
        assert!((result.pm25_reduction - (12.5 - expected_sim)).abs() < 1e-9);
        assert_eq!(result.outcome, Outcome::RemainsAbove);
    }

    #[test]
    fn segment_outside_every_region_is_skipped() {
        let config = SimulationConfig::default();
        assert!(simulate_edge(&segment(30.0, 40.0), &two_regions(), &config).is_none());
    }

    #[test]
    fn missing_baseline_skips_the_edge() {
        let mut attrs = AttributeTable::new(vec![]);
        attrs.push("A", row(None, Some(50_000.0), Some(500.0), Some(0.2)));
        let regions = RegionTable::merge(vec![square("A", 0.0, 10.0)], &attrs);
        assert!(simulate_edge(&segment(1.0, 2.0), &regions, &SimulationConfig::default()).is_none());
    }

    #[test]
    fn missing_transit_share_disables_short_commute() {
        let mut attrs = AttributeTable::new(vec![]);
        attrs.push("A", row(Some(10.0), Some(50_000.0), Some(500.0), None));
        let regions = RegionTable::merge(vec![square("A", 0.0, 10.0)], &attrs);
        let result = simulate_edge(&segment(1.0, 2.0), &regions, &SimulationConfig::default()).unwrap();
        assert_eq!(result.terms.short_commute, 0.0);
    }

    #[test]
    fn simulated_value_is_never_negative() {
        let mut config = SimulationConfig::default();
        config.coefficients.ev = -5.0;
        let result = simulate_edge(&segment(5.0, 15.0), &two_regions(), &config).unwrap();
        assert!(result.total_effect() < -1.0);
        assert_eq!(result.simulated_pm25, 0.0);
        assert_eq!(result.pm25_reduction, result.initial_pm25);
        assert_eq!(result.outcome, Outcome::Improved);
    }

    fn graph() -> RoadGraph {
        let roads = vec![
            Geometry::LineString(LineString::from(vec![(2.0, 5.0), (8.0, 5.0), (12.0, 5.0)])),
            Geometry::LineString(LineString::from(vec![(30.0, 5.0), (40.0, 5.0)])),
        ];
        RoadGraph::from_geometries(&roads, 1e-3)
    }

    #[test]
    fn run_skips_edges_outside_regions() {
        let graph = graph();
        let simulation = Simulation::run(&graph, &two_regions(), &SimulationConfig::default());

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(simulation.len(), 2);
        assert_eq!(simulation.summary().len(), 2);
        assert!(simulation.result(EdgeId(2)).is_none());

        let total: usize = simulation.outcome_counts().iter().map(|(_, n)| n).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn summary_follows_edge_order() {
        let graph = graph();
        let simulation = Simulation::run(&graph, &two_regions(), &SimulationConfig::default());
        let ev = simulation.summary().values(EffectKind::Ev);
        let expected = simulation.results().map(|(_, r)| r.terms.ev).collect::<Vec<_>>();
        assert_eq!(ev, expected.as_slice());
    }

    #[test]
    fn runs_are_bit_identical() {
        let graph = graph();
        let regions = two_regions();
        let config = SimulationConfig::default();
        let a = Simulation::run(&graph, &regions, &config);
        let b = Simulation::run(&graph, &regions, &config);

        for ((ia, ra), (ib, rb)) in a.results().zip(b.results()) {
            assert_eq!(ia, ib);
            assert_eq!(ra.pm25_reduction.to_bits(), rb.pm25_reduction.to_bits());
            assert_eq!(ra.outcome, rb.outcome);
        }
    }

    #[test]
    fn empty_region_set_simulates_nothing() {
        let regions = RegionTable::merge(vec![], &AttributeTable::new(vec![]));
        let simulation = Simulation::run(&graph(), &regions, &SimulationConfig::default());
        assert!(simulation.is_empty());
        assert!(simulation.summary().is_empty());
        assert!(simulation.summary().means().is_empty());
    }
}
