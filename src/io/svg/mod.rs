//! SVG map and chart export.

mod color;
mod draw;
mod writer;

pub(crate) use color::*;
pub(crate) use draw::*;
pub(crate) use writer::*;

use std::{io::Write, path::Path};

use anyhow::Result;
use geo::{Coord, Rect};
use tracing::{info, warn};

use crate::{
    graph::RoadGraph,
    region::{Exposure, ExposureAreas, RegionTable},
    simulate::{EffectMean, EffectSummary, Outcome, Simulation},
};

const WIDTH: f64 = 1200.0;
const MARGIN: f64 = 10.0;

const CHART_LEFT: f64 = 80.0;
const CHART_TOP: f64 = 40.0;
const CHART_PLOT: f64 = 300.0;
const CHART_BOTTOM: f64 = 40.0;
const CHART_SLOT: f64 = 120.0;

/// Frame of at most `WIDTH` x `WIDTH` pixels around `bounds`, Y axis flipped.
/// The longer side sets the scale so tall extents stay bounded too.
fn frame(bounds: Rect<f64>) -> (f64, f64, impl Fn(&Coord<f64>) -> (f64, f64)) {
    let span = bounds.width().max(bounds.height()).max(f64::EPSILON);
    let scale = (WIDTH - 2.0 * MARGIN) / span;
    let height = bounds.height() * scale + 2.0 * MARGIN;

    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = MARGIN + (coord.x - bounds.min().x) * scale;
        let y = MARGIN + (bounds.max().y - coord.y) * scale; // invert vertically
        (x, y)
    };
    (scale, height, project)
}

/// Draw the region basemap, optional exposure overlays, and every simulated
/// edge coloured by outcome. Regions and graph must share one reference system.
///
/// Without regions the frame falls back to the road graph; with neither there
/// is nothing to draw and no file is written.
pub fn write_simulation_svg(
    regions: &RegionTable,
    graph: &RoadGraph,
    simulation: &Simulation,
    exposure: Option<&ExposureAreas>,
    path: &Path,
) -> Result<()> {
    let Some(bounds) = regions.bounds().or_else(|| graph.bounds()) else {
        warn!("[io::svg] no regions or roads to draw; skipping {}", path.display());
        return Ok(());
    };
    let (scale, height, project) = frame(bounds);

    let mut writer = SvgWriter::new(path)?;
    writer.write_header(WIDTH, height, MARGIN, scale, &bounds)?;
    writer.write_styles()?;

    draw_polygons(&mut writer, regions.shapes(), "region", &project)?;
    if let Some(areas) = exposure {
        draw_exposure(&mut writer, regions, areas, &project)?;
    }

    let segments = simulation.results()
        .map(|(id, result)| (graph.segment(id), result.outcome))
        .collect::<Vec<_>>();
    draw_segments(&mut writer, &segments, &project)?;

    let mut legend = Outcome::ALL.iter().map(|o| (o.color(), o.legend())).collect::<Vec<_>>();
    if exposure.is_some() { legend.extend(exposure_legend()) }
    draw_legend(&mut writer, &legend)?;

    writer.write_footer()?;
    writer.flush()?;
    info!("[io::svg] wrote {} edges to {}", segments.len(), path.display());
    Ok(())
}

/// Draw the region basemap with high/low exposure areas highlighted.
/// An empty region set is skipped with a warning and no file is written.
pub fn write_exposure_svg(regions: &RegionTable, areas: &ExposureAreas, path: &Path) -> Result<()> {
    let Some(bounds) = regions.bounds() else {
        warn!("[io::svg] no regions to draw; skipping {}", path.display());
        return Ok(());
    };
    let (scale, height, project) = frame(bounds);

    let mut writer = SvgWriter::new(path)?;
    writer.write_header(WIDTH, height, MARGIN, scale, &bounds)?;
    writer.write_styles()?;

    draw_polygons(&mut writer, regions.shapes(), "region", &project)?;
    draw_exposure(&mut writer, regions, areas, &project)?;
    draw_legend(&mut writer, &exposure_legend())?;

    writer.write_footer()?;
    writer.flush()?;
    Ok(())
}

/// Bar chart of the mean effect terms, one bar per `EffectSummary::means`
/// entry in that order. Means may be negative, so bars grow either way from a
/// zero baseline.
pub fn write_effects_svg(summary: &EffectSummary, path: &Path) -> Result<()> {
    let means = summary.means();
    let (low, high) = value_range(&means);
    let scale = CHART_PLOT / (high - low);
    let baseline = CHART_TOP + high * scale;
    let width = CHART_LEFT + CHART_SLOT * means.len().max(1) as f64 + MARGIN;
    let height = CHART_TOP + CHART_PLOT + CHART_BOTTOM;

    let mut writer = SvgWriter::new(path)?;
    writer.write_chart_header(width, height)?;
    writer.write_styles()?;
    writeln!(writer, r#"<text class="label" x="{CHART_LEFT}" y="24">Average effect on PM2.5</text>"#)?;

    for value in [high, low].into_iter().filter(|v| *v != 0.0) {
        let y = baseline - value * scale;
        writeln!(writer, r#"<line class="grid" x1="{CHART_LEFT}" y1="{y:.3}" x2="{:.3}" y2="{y:.3}"/>"#, width - MARGIN)?;
        writeln!(writer, r#"<text class="label" x="{:.3}" y="{:.3}" text-anchor="end">{value:.4}</text>"#, CHART_LEFT - 6.0, y + 4.0)?;
    }

    let bars = BarFrame {
        left: CHART_LEFT,
        slot: CHART_SLOT,
        baseline,
        scale,
        label_y: CHART_TOP + CHART_PLOT + CHART_BOTTOM / 2.0 + 4.0,
    };
    draw_bars(&mut writer, &means, &bars)?;
    writeln!(writer, r#"<line class="baseline" x1="{CHART_LEFT}" y1="{baseline:.3}" x2="{:.3}" y2="{baseline:.3}"/>"#, width - MARGIN)?;
    writeln!(writer, r#"<text class="label" x="{:.3}" y="{:.3}" text-anchor="end">0</text>"#, CHART_LEFT - 6.0, baseline + 4.0)?;

    writer.write_footer()?;
    writer.flush()?;
    info!("[io::svg] wrote {} effect means to {}", means.len(), path.display());
    Ok(())
}

/// Value range of the means, widened to include zero. Never empty.
fn value_range(means: &[EffectMean]) -> (f64, f64) {
    let (low, high) = means.iter()
        .map(|entry| entry.mean)
        .filter(|mean| mean.is_finite())
        .fold((0.0_f64, 0.0_f64), |(low, high), mean| (low.min(mean), high.max(mean)));
    if high > low { (low, high) } else { (0.0, 1.0) }
}

fn draw_exposure(writer: &mut impl Write, regions: &RegionTable, areas: &ExposureAreas, project: &Projection) -> Result<()> {
    let high = areas.high.iter().map(|&i| regions.shapes()[i].clone()).collect::<Vec<_>>();
    let low = areas.low.iter().map(|&i| regions.shapes()[i].clone()).collect::<Vec<_>>();
    draw_polygons(writer, &high, "high", project)?;
    draw_polygons(writer, &low, "low", project)
}

fn exposure_legend() -> [(&'static str, &'static str); 2] {
    [(HIGH_EXPOSURE, Exposure::High.description()), (LOW_EXPOSURE, Exposure::Low.description())]
}
