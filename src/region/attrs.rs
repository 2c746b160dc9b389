use std::collections::{BTreeMap, HashMap};

use tracing::warn;

/// Well-known attribute column names.
pub mod columns {
    pub const NAME: &str = "name";
    pub const PM25: &str = "PM2.5 Concentration";
    pub const MEDIAN_HOUSEHOLD_INCOME: &str = "Median Household Income";
    pub const POPULATION_DENSITY: &str = "Population Density";
    pub const PUBLIC_TRANSIT: &str = "Public Transit";
    pub const TRAFFIC_IMPACTS_PERCENTILE: &str = "Traffic Impacts Percentile";
    pub const VEHICLE_OWNERSHIP: &str = "Vehicle Ownership";
    pub const DRIVES_ALONE: &str = "Drives Alone";
    pub const COMMUTE_BELOW_30: &str = "Commute Time Below 30 Minutes";
    pub const COMMUTE_ABOVE_30: &str = "Commute Time Above 30 Minutes";
    pub const TOTAL_EV_COUNT: &str = "total_ev_count";
    pub const BIKES_OR_WALKS: &str = "Bikes or Walks";
    pub const CARPOOLS: &str = "Carpools";
    pub const WORKS_FROM_HOME: &str = "Works from Home";
    pub const UNEMPLOYMENT_RATE: &str = "Unemployment Rate";
    pub const BACHELORS_OR_HIGHER: &str = "Bachelor's Degree or Higher";
    pub const TOTAL_POP: &str = "total_pop";
}

/// Parse a raw attribute cell: plain numbers, or percentages like `"12.5%"` as decimals.
/// Blank or non-numeric text is treated as missing.
pub(crate) fn parse_numeric(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() { return None }

    let value = match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok()? / 100.0,
        None => text.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Numeric attributes of one region. Missing values are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeRow {
    values: BTreeMap<String, f64>,
}

impl AttributeRow {
    pub fn new() -> Self { Self::default() }

    /// Get a value, or `None` if missing.
    #[inline]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Set or clear a value. Non-finite values are stored as missing.
    pub fn set(&mut self, column: &str, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => { self.values.insert(column.to_string(), v); }
            None => { self.values.remove(column); }
        }
    }

    /// True iff every listed column has a value.
    pub fn has_all(&self, columns: &[&str]) -> bool {
        columns.iter().all(|column| self.values.contains_key(*column))
    }

    #[inline] pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Iterate over present values in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A table of per-region attributes keyed by region name.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    columns: Vec<String>,
    names: Vec<String>,
    rows: Vec<AttributeRow>,
    index: HashMap<String, usize>,
}

impl AttributeTable {
    /// Create an empty table with the given value columns (excluding `name`).
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, ..Default::default() }
    }

    /// Append a row. Duplicate names are dropped (first row wins); returns
    /// whether the row was kept.
    pub fn push(&mut self, name: &str, row: AttributeRow) -> bool {
        if self.index.contains_key(name) {
            warn!("[region::attrs] duplicate attribute row for '{name}'; keeping the first");
            return false;
        }
        self.index.insert(name.to_string(), self.rows.len());
        self.names.push(name.to_string());
        self.rows.push(row);
        true
    }

    /// Register a value column if it is not already present.
    pub fn ensure_column(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }

    /// Get the row for a region name.
    pub fn get(&self, name: &str) -> Option<&AttributeRow> {
        self.index.get(name).map(|&i| &self.rows[i])
    }

    /// Value columns, in table order.
    #[inline] pub fn columns(&self) -> &[String] { &self.columns }

    /// Region names, in row order.
    #[inline] pub fn names(&self) -> &[String] { &self.names }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Iterate over `(name, row)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeRow)> + '_ {
        self.names.iter().map(String::as_str).zip(self.rows.iter())
    }

    /// Iterate mutably over `(name, row)` pairs in row order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut AttributeRow)> + '_ {
        self.names.iter().map(String::as_str).zip(self.rows.iter_mut())
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row.get(column)).collect()
    }
}
