use anyhow::Result;
use pm25sim::{RegionTable, SimulationConfig};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ExposureArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./exposure.csv".into());
    let criteria = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?.exposure,
        None => Default::default(),
    };

    let shapes = pm25sim::read_region_shapes(&args.regions)?;
    let attributes = pm25sim::read_attribute_table(&args.attributes)?;
    let regions = RegionTable::merge(shapes, &attributes);

    let areas = pm25sim::classify_exposure(&regions, &criteria);
    info!("[exposure] {} high / {} low exposure areas", areas.high.len(), areas.low.len());

    let mut rows = Vec::new();
    for (idx, region) in regions.regions().iter().enumerate() {
        for class in areas.classes(idx) {
            rows.push((region.name.clone(), class.label().to_string()));
        }
    }
    pm25sim::write_named_values("exposure", &rows, &out_path)?;

    if let Some(svg_path) = &args.svg {
        pm25sim::write_exposure_svg(&regions, &areas, svg_path)?;
        info!("[exposure] wrote map to {}", svg_path.display());
    }
    Ok(())
}
