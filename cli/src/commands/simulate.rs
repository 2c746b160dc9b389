use anyhow::Result;
use pm25sim::{pipeline, RegionTable, SimulationConfig};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SimulateArgs) -> Result<()> {
    let out_dir = args.output.clone().unwrap_or(".".into());

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(threshold) = args.threshold { config.threshold = threshold }
    if let Some(crs) = args.crs { config.crs = crs }

    info!("[simulate] loading regions from {}", args.regions.display());
    let shapes = pm25sim::read_region_shapes(&args.regions)?;
    let attributes = pm25sim::read_attribute_table(&args.attributes)?;
    let regions = RegionTable::merge(shapes, &attributes);

    info!("[simulate] loading roads from {}", args.roads.display());
    let roads = pm25sim::read_roads(&args.roads)?;

    let (regions, roads) = pipeline::project_inputs(&regions, &roads, &config)?;
    let (graph, simulation) = pipeline::run(&regions, &roads, &config)?;

    for mean in simulation.summary().means() {
        info!("[simulate] mean {}: {:.6}", mean.effect, mean.mean);
    }

    let exposure = pm25sim::classify_exposure(&regions, &config.exposure);

    pm25sim::write_edge_results(&graph, &simulation, &out_dir.join("edges.csv"))?;
    pm25sim::write_effect_report(&graph, &simulation, config.threshold, &out_dir.join("effects.json"))?;
    pm25sim::write_simulation_svg(
        &regions,
        &graph,
        &simulation,
        (!exposure.is_empty()).then_some(&exposure),
        &out_dir.join("simulation.svg"),
    )?;
    pm25sim::write_effects_svg(simulation.summary(), &out_dir.join("effects.svg"))?;

    info!("[simulate] wrote results to {}", out_dir.display());
    Ok(())
}
