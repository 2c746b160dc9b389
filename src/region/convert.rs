use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{common::round_to, geom::MetricProjection};
use super::{attrs::{columns, AttributeTable}, table::RegionTable};

/// Prepare a raw attribute table for analysis.
///
/// - `Vehicle Ownership` becomes the share of households *with* a vehicle: `round(1 - x, 2)`.
/// - `Commute Time Below 30 Minutes` is derived as `round(1 - Commute Time Above 30 Minutes, 2)`.
/// - `Population Density` (people per km²) is derived from each region's `total_pop`
///   and its polygon area under `projection`, which must yield meters.
///
/// Percent strings were already turned into decimals when the table was read.
pub fn convert_attributes(table: &AttributeTable, regions: &RegionTable, projection: &MetricProjection) -> Result<AttributeTable> {
    let projected = regions.reproject(projection)
        .context("[region::convert] Failed to project regions for area calculation")?;
    let areas_m2 = projected.areas();

    let mut converted = table.clone();
    converted.ensure_column(columns::COMMUTE_BELOW_30);
    converted.ensure_column(columns::POPULATION_DENSITY);

    let mut with_density = 0usize;
    for (name, row) in converted.iter_mut() {
        row.set(columns::VEHICLE_OWNERSHIP, row.get(columns::VEHICLE_OWNERSHIP).map(|v| round_to(1.0 - v, 2)));
        row.set(columns::COMMUTE_BELOW_30, row.get(columns::COMMUTE_ABOVE_30).map(|v| round_to(1.0 - v, 2)));

        let density = regions.position(name).and_then(|idx| {
            let region = regions.region(idx);
            let population = region.properties.get(columns::TOTAL_POP).copied()
                .or_else(|| row.get(columns::TOTAL_POP))?;
            let area_km2 = areas_m2[idx] / 1e6;
            (area_km2 > 0.0).then(|| population / area_km2)
        });
        if density.is_none() { debug!("[region::convert] no population density for '{name}'") }
        with_density += density.is_some() as usize;
        row.set(columns::POPULATION_DENSITY, density);
    }

    info!("[region::convert] converted {} rows ({} with population density)", converted.len(), with_density);
    Ok(converted)
}
