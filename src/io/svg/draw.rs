use std::io::Write;

use anyhow::Result;
use geo::{Coord, CoordsIter, Line, LineString, MultiPolygon};

use crate::simulate::{EffectMean, Outcome};

/// Projection function: data coords -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

pub(crate) fn draw_polygons(writer: &mut impl Write, polygons: &[MultiPolygon<f64>], class: &str, project: &Projection) -> Result<()> {
    for polygon in polygons {
        let d = multipolygon_to_path(polygon, project);
        if d.is_empty() { continue }
        writeln!(writer, r#"<path class="{class}" fill-rule="evenodd" d="{d}"/>"#)?;
    }
    Ok(())
}

/// Draw road segments, stroked with their outcome colour.
pub(crate) fn draw_segments(writer: &mut impl Write, segments: &[(Line<f64>, Outcome)], project: &Projection) -> Result<()> {
    for (segment, outcome) in segments {
        let (x1, y1) = project(&segment.start);
        let (x2, y2) = project(&segment.end);
        writeln!(
            writer,
            r##"<line class="road" x1="{x1:.3}" y1="{y1:.3}" x2="{x2:.3}" y2="{y2:.3}" stroke="{}"/>"##,
            outcome.color(),
        )?;
    }
    Ok(())
}

/// Legend box in the top-left corner: one swatch per `(colour, label)`.
pub(crate) fn draw_legend(writer: &mut impl Write, entries: &[(&str, &str)]) -> Result<()> {
    const ROW: f64 = 18.0;
    let height = ROW * entries.len() as f64 + 8.0;

    writeln!(writer, r##"<g class="legend" transform="translate(20,20)">"##)?;
    writeln!(writer, r##"<rect width="300" height="{height}" fill="#ffffff" fill-opacity="0.85" stroke="#9ca3af"/>"##)?;
    for (i, (color, label)) in entries.iter().enumerate() {
        let y = 4.0 + ROW * i as f64;
        writeln!(writer, r##"<rect x="6" y="{}" width="12" height="12" fill="{color}"/>"##, y + 2.0)?;
        writeln!(writer, r##"<text x="24" y="{}">{}</text>"##, y + 12.0, escape(label))?;
    }
    writeln!(writer, "</g>")?;
    Ok(())
}

/// Placement of a bar chart: slots start at `left`, values grow up from `baseline`.
pub(crate) struct BarFrame {
    pub left: f64,
    pub slot: f64,
    pub baseline: f64,
    pub scale: f64,
    pub label_y: f64,
}

/// One bar per mean, above the baseline when positive and below it when negative.
pub(crate) fn draw_bars(writer: &mut impl Write, means: &[EffectMean], frame: &BarFrame) -> Result<()> {
    let width = frame.slot * 0.6;
    for (i, entry) in means.iter().enumerate() {
        let x = frame.left + frame.slot * i as f64 + (frame.slot - width) / 2.0;
        let extent = if entry.mean.is_finite() { entry.mean * frame.scale } else { 0.0 };
        let (y, height) = if extent >= 0.0 { (frame.baseline - extent, extent) } else { (frame.baseline, -extent) };
        let name = escape(entry.effect.name());

        writeln!(
            writer,
            r#"<rect class="bar" x="{x:.3}" y="{y:.3}" width="{width:.3}" height="{height:.3}" data-effect="{name}" data-value="{}"/>"#,
            entry.mean,
        )?;
        writeln!(
            writer,
            r#"<text class="label" x="{:.3}" y="{:.3}" text-anchor="middle">{name}</text>"#,
            frame.left + frame.slot * (i as f64 + 0.5),
            frame.label_y,
        )?;
    }
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        out.push_str(&ring_to_path(polygon.exterior(), project));
        for interior in polygon.interiors() {
            out.push_str(&ring_to_path(interior, project));
        }
    }

    out
}

/// Build a compact SVG path string for a LineString (ring).
fn ring_to_path(ring: &LineString<f64>, project: &Projection) -> String {
    let mut out = String::new();

    let mut coords = ring.coords_iter()
        .map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn path_has_one_subpath_per_ring() {
        let shape = MultiPolygon(vec![polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 1.0)]],
        )]);
        let project = |c: &Coord<f64>| (c.x, c.y);
        let d = multipolygon_to_path(&shape, &project);
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
        assert!(d.starts_with(" M0.000,0.000"));
    }

    #[test]
    fn negative_bars_hang_below_the_baseline() {
        let means = [
            EffectMean { effect: crate::simulate::EffectKind::Ev, mean: 2.0 },
            EffectMean { effect: crate::simulate::EffectKind::Drive, mean: -1.0 },
        ];
        let frame = BarFrame { left: 0.0, slot: 10.0, baseline: 50.0, scale: 10.0, label_y: 90.0 };
        let mut out = Vec::new();
        draw_bars(&mut out, &means, &frame).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(r#"x="2.000" y="30.000" width="6.000" height="20.000" data-effect="ev_effect""#));
        assert!(text.contains(r#"x="12.000" y="50.000" width="6.000" height="10.000" data-effect="drive_effect""#));
        assert!(text.find("ev_effect").unwrap() < text.find("drive_effect").unwrap());
    }

    #[test]
    fn legend_escapes_labels() {
        let mut out = Vec::new();
        draw_legend(&mut out, &[("#000000", "A & B")]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("A &amp; B"));
    }
}
