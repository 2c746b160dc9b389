//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{Column, CsvReadOptions, DataType}};
use tracing::{debug, info, warn};

use crate::region::{columns, parse_numeric, AttributeRow, AttributeTable};

/// Every column is read as text; numbers are parsed cell by cell afterwards.
fn text_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Reads a CSV file from `path` into a Polars DataFrame of string columns.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    text_options()
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV from a string.
#[cfg(test)]
pub(crate) fn read_csv_string(csv: &str) -> Result<DataFrame> {
    text_options()
        .into_reader_with_file_handle(std::io::Cursor::new(csv.as_bytes()))
        .finish()
        .with_context(|| "[io::csv::read] Failed to read CSV from string")
}

/// Read a per-region attribute table from a CSV file with a `name` column.
pub fn read_attribute_table(path: &Path) -> Result<AttributeTable> {
    let table = frame_to_attribute_table(&read_csv(path)?)
        .with_context(|| format!("[io::csv::read] Invalid attribute table in {}", path.display()))?;
    info!("[io::csv::read] read {} attribute rows ({} columns) from {}", table.len(), table.columns().len(), path.display());
    Ok(table)
}

/// Convert a DataFrame into an attribute table.
///
/// Text cells go through percent-aware parsing; text columns where nothing
/// parses are dropped. Rows without a name are skipped.
pub(crate) fn frame_to_attribute_table(df: &DataFrame) -> Result<AttributeTable> {
    let names = df.column(columns::NAME)
        .with_context(|| format!("[io::csv::read] Missing '{}' column", columns::NAME))?
        .cast(&DataType::String)?;
    let names = names.str()?;

    let mut value_columns = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == columns::NAME { continue }
        match column_values(column)? {
            Some(values) => value_columns.push((name.to_string(), values)),
            None => debug!("[io::csv::read] dropping non-numeric column '{name}'"),
        }
    }

    let mut table = AttributeTable::new(value_columns.iter().map(|(name, _)| name.clone()).collect());
    for (i, name) in names.into_iter().enumerate() {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            warn!("[io::csv::read] skipping row {i}: no region name");
            continue;
        };

        let mut row = AttributeRow::new();
        for (column, values) in &value_columns {
            row.set(column, values[i]);
        }
        table.push(name, row);
    }

    Ok(table)
}

/// Numeric values of a column, or `None` if it holds text that never parses.
/// Cells that do not parse are missing; they never fail the read.
fn column_values(column: &Column) -> Result<Option<Vec<Option<f64>>>> {
    let text = column.cast(&DataType::String)?;
    let raw = text.str()?;

    let values = raw.into_iter().map(|cell| cell.and_then(parse_numeric)).collect::<Vec<_>>();
    let had_text = raw.into_iter().flatten().any(|cell| !cell.trim().is_empty());
    if had_text && values.iter().all(Option::is_none) { return Ok(None) }
    Ok(Some(values))
}
