use anyhow::Result;
use pm25sim::{MetricCrs, MetricProjection, RegionTable};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ConvertArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./merged_data_converted.csv".into());

    let shapes = pm25sim::read_region_shapes(&args.regions)?;
    let raw = pm25sim::read_attribute_table(&args.input)?;
    let regions = RegionTable::merge(shapes, &raw);

    // Areas are measured in World Mercator.
    let projection = MetricProjection::new(MetricCrs::Mercator, regions.bounds())?;
    let converted = pm25sim::convert_attributes(&raw, &regions, &projection)?;

    info!("[convert] writing {} rows to {}", converted.len(), out_path.display());
    pm25sim::write_attribute_table(&converted, &out_path)
}
