use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{attrs::{columns, AttributeRow}, table::RegionTable};

/// Columns that must all be present for a region to take part in the
/// exposure comparison.
pub const ANALYSIS_COLUMNS: [&str; 14] = [
    columns::VEHICLE_OWNERSHIP,
    columns::DRIVES_ALONE,
    columns::PUBLIC_TRANSIT,
    columns::TRAFFIC_IMPACTS_PERCENTILE,
    columns::PM25,
    columns::TOTAL_EV_COUNT,
    columns::BIKES_OR_WALKS,
    columns::CARPOOLS,
    columns::WORKS_FROM_HOME,
    columns::MEDIAN_HOUSEHOLD_INCOME,
    columns::UNEMPLOYMENT_RATE,
    columns::BACHELORS_OR_HIGHER,
    columns::COMMUTE_BELOW_30,
    columns::POPULATION_DENSITY,
];

/// Exposure class of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    /// Air pollution mostly created by the area itself.
    High,
    /// Air pollution mostly carried in from elsewhere.
    Low,
}

impl Exposure {
    pub fn label(&self) -> &'static str {
        match self {
            Exposure::High => "high",
            Exposure::Low => "low",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Exposure::High => "Air pollution mostly created by itself",
            Exposure::Low => "Air pollution mostly affected by others",
        }
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Thresholds for the high/low exposure predicates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureCriteria {
    pub pm25_threshold: f64,
    pub traffic_percentile: f64,
    pub high_vehicle_ownership: f64,
    pub high_drives_alone: f64,
    pub high_short_commute: f64,
    pub high_density: f64,
    pub low_drives_alone_high: f64,
    pub low_density_when_driving: f64,
    pub low_drives_alone_low: f64,
    pub low_vehicle_ownership: f64,
    pub low_density: f64,
}

impl Default for ExposureCriteria {
    fn default() -> Self {
        Self {
            pm25_threshold: 12.0,
            traffic_percentile: 66.0,
            high_vehicle_ownership: 0.9,
            high_drives_alone: 0.7,
            high_short_commute: 0.55,
            high_density: 1000.0,
            low_drives_alone_high: 0.7,
            low_density_when_driving: 914.0,
            low_drives_alone_low: 0.65,
            low_vehicle_ownership: 0.9,
            low_density: 913.0,
        }
    }
}

/// Snapshot of the columns the predicates read; only built for complete rows.
struct Profile {
    pm25: f64,
    traffic: f64,
    vehicle_ownership: f64,
    drives_alone: f64,
    short_commute: f64,
    density: f64,
}

impl Profile {
    fn from_row(row: &AttributeRow) -> Option<Self> {
        if !row.has_all(&ANALYSIS_COLUMNS) { return None }
        Some(Self {
            pm25: row.get(columns::PM25)?,
            traffic: row.get(columns::TRAFFIC_IMPACTS_PERCENTILE)?,
            vehicle_ownership: row.get(columns::VEHICLE_OWNERSHIP)?,
            drives_alone: row.get(columns::DRIVES_ALONE)?,
            short_commute: row.get(columns::COMMUTE_BELOW_30)?,
            density: row.get(columns::POPULATION_DENSITY)?,
        })
    }

    fn is_high(&self, c: &ExposureCriteria) -> bool {
        self.pm25 >= c.pm25_threshold
            && self.traffic >= c.traffic_percentile
            && self.vehicle_ownership >= c.high_vehicle_ownership
            && self.drives_alone >= c.high_drives_alone
            && self.short_commute >= c.high_short_commute
            && self.density >= c.high_density
    }

    fn is_low(&self, c: &ExposureCriteria) -> bool {
        let commuting = (self.drives_alone >= c.low_drives_alone_high && self.density <= c.low_density_when_driving)
            || self.drives_alone <= c.low_drives_alone_low
            || self.vehicle_ownership <= c.low_vehicle_ownership;

        self.pm25 >= c.pm25_threshold
            && self.traffic >= c.traffic_percentile
            && commuting
            && self.density <= c.low_density
    }
}

/// Regions (by index into the `RegionTable`) in each exposure class.
/// The two predicates are evaluated independently.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExposureAreas {
    pub high: Vec<usize>,
    pub low: Vec<usize>,
}

impl ExposureAreas {
    /// Classes of one region, high first.
    pub fn classes(&self, idx: usize) -> impl Iterator<Item = Exposure> + '_ {
        [(Exposure::High, &self.high), (Exposure::Low, &self.low)].into_iter()
            .filter(move |(_, members)| members.binary_search(&idx).is_ok())
            .map(|(class, _)| class)
    }

    pub fn is_empty(&self) -> bool { self.high.is_empty() && self.low.is_empty() }
}

/// Split regions into high and low exposure areas. Regions missing any of the
/// analysis columns are left out of both.
pub fn classify_exposure(regions: &RegionTable, criteria: &ExposureCriteria) -> ExposureAreas {
    let mut areas = ExposureAreas::default();
    let mut complete = 0usize;

    for (idx, region) in regions.regions().iter().enumerate() {
        let Some(profile) = Profile::from_row(&region.attributes) else { continue };
        complete += 1;
        if profile.is_high(criteria) { areas.high.push(idx) }
        if profile.is_low(criteria) { areas.low.push(idx) }
    }

    info!(
        "[region::exposure] {} of {} regions complete: {} high, {} low exposure",
        complete, regions.len(), areas.high.len(), areas.low.len(),
    );
    areas
}
