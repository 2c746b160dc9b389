//! CSV writing operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};
use tracing::info;

use crate::{common, graph::RoadGraph, region::{columns, AttributeTable}, simulate::Simulation};

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    common::ensure_parent_exists(path)?;
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}

/// Write a DataFrame to a CSV string.
#[cfg(test)]
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .with_context(|| "[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .with_context(|| "[io::csv::write] CSV output is not valid UTF-8")
}

/// Build a DataFrame from an attribute table: `name` then each value column.
pub(crate) fn attribute_table_to_frame(table: &AttributeTable) -> Result<DataFrame> {
    let mut frame_columns = Vec::with_capacity(table.columns().len() + 1);
    frame_columns.push(Series::new(columns::NAME.into(), table.names().to_vec()).into());
    for column in table.columns() {
        frame_columns.push(Series::new(column.as_str().into(), table.column_values(column)).into());
    }
    Ok(DataFrame::new(frame_columns)?)
}

/// Write an attribute table to CSV; missing values become empty cells.
pub fn write_attribute_table(table: &AttributeTable, path: &Path) -> Result<()> {
    let mut df = attribute_table_to_frame(table)?;
    write_csv(&mut df, path)?;
    info!("[io::csv::write] wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write `(name, value)` pairs as a two-column CSV.
pub fn write_named_values(header: &str, rows: &[(String, String)], path: &Path) -> Result<()> {
    let (names, values) = rows.iter().cloned().unzip::<_, _, Vec<_>, Vec<_>>();
    let mut df = DataFrame::new(vec![
        Series::new(columns::NAME.into(), names).into(),
        Series::new(header.into(), values).into(),
    ])?;
    write_csv(&mut df, path)
}

/// Build the per-edge result frame, one row per simulated edge in edge order.
pub(crate) fn edge_results_to_frame(graph: &RoadGraph, simulation: &Simulation) -> Result<DataFrame> {
    let n = simulation.len();
    let mut edge = Vec::with_capacity(n);
    let (mut x1, mut y1, mut x2, mut y2) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
    let mut length = Vec::with_capacity(n);
    let mut regions = Vec::with_capacity(n);
    let (mut initial, mut simulated, mut reduction, mut total) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
    let mut outcome = Vec::with_capacity(n);

    for (id, result) in simulation.results() {
        let segment = graph.segment(id);
        edge.push(id.0);
        x1.push(segment.start.x);
        y1.push(segment.start.y);
        x2.push(segment.end.x);
        y2.push(segment.end.y);
        length.push(graph.edge(id).length);
        regions.push(result.region_count as u32);
        initial.push(result.initial_pm25);
        simulated.push(result.simulated_pm25);
        reduction.push(result.pm25_reduction);
        total.push(result.total_effect());
        outcome.push(result.outcome.label());
    }

    Ok(DataFrame::new(vec![
        Series::new("edge".into(), edge).into(),
        Series::new("x1".into(), x1).into(),
        Series::new("y1".into(), y1).into(),
        Series::new("x2".into(), x2).into(),
        Series::new("y2".into(), y2).into(),
        Series::new("length".into(), length).into(),
        Series::new("regions".into(), regions).into(),
        Series::new("initial_pm25".into(), initial).into(),
        Series::new("simulated_pm25".into(), simulated).into(),
        Series::new("pm25_reduction".into(), reduction).into(),
        Series::new("total_effect".into(), total).into(),
        Series::new("outcome".into(), outcome).into(),
    ])?)
}

/// Write per-edge simulation results to CSV.
pub fn write_edge_results(graph: &RoadGraph, simulation: &Simulation, path: &Path) -> Result<()> {
    let mut df = edge_results_to_frame(graph, simulation)?;
    write_csv(&mut df, path)?;
    info!("[io::csv::write] wrote {} edge results to {}", simulation.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv::{frame_to_attribute_table, read_csv_string};
    use crate::region::AttributeRow;

    #[test]
    fn attribute_table_survives_a_csv_trip() {
        let mut table = AttributeTable::new(vec![columns::PM25.to_string(), columns::PUBLIC_TRANSIT.to_string()]);
        let mut a = AttributeRow::new();
        a.set(columns::PM25, Some(10.5));
        a.set(columns::PUBLIC_TRANSIT, Some(0.25));
        table.push("A", a);
        let mut b = AttributeRow::new();
        b.set(columns::PM25, Some(8.0));
        table.push("B", b);

        let csv = write_csv_string(&mut attribute_table_to_frame(&table).unwrap()).unwrap();
        assert!(csv.starts_with("name,PM2.5 Concentration,Public Transit"), "{csv}");

        let back = frame_to_attribute_table(&read_csv_string(&csv).unwrap()).unwrap();
        assert_eq!(back.get("A"), table.get("A"));
        assert_eq!(back.get("B").unwrap().get(columns::PUBLIC_TRANSIT), None);
    }

    #[test]
    fn named_values_are_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/exposure.csv");
        write_named_values("exposure", &[("A".into(), "high".into()), ("B".into(), "low".into())], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("name,exposure"));
        assert!(text.contains("A,high"));
        assert_eq!(text.lines().count(), 3);
    }
}
