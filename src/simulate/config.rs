use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{geom::MetricCrs, graph::DEFAULT_NODE_TOLERANCE, region::ExposureCriteria};

/// Per-term coefficients of the effect model (dimensionless).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectCoefficients {
    /// Public-transit uptake, scaled by the income modifier.
    pub transit: f64,
    /// Electric-vehicle uptake, scaled by the income modifier.
    pub ev: f64,
    /// Walking and cycling, scaled by the density modifier.
    pub active_travel: f64,
    /// Solo driving, scaled by the income modifier.
    pub solo_drive: f64,
    /// Short commutes, scaled by the density modifier; only where transit use is common.
    pub short_commute: f64,
}

impl Default for EffectCoefficients {
    fn default() -> Self {
        Self {
            transit: -0.03,
            ev: 0.07,
            active_travel: 0.04,
            solo_drive: -0.06,
            short_commute: 0.05,
        }
    }
}

/// Parameters of a simulation run. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Reference PM2.5 concentration (µg/m³) separating the outcome classes.
    pub threshold: f64,
    /// Income divisor inside `ln(1 + income / scale)`.
    pub income_scale: f64,
    /// Density divisor inside `ln(1 + density / scale)`.
    pub density_scale: f64,
    /// Mean transit share above which the short-commute term applies.
    pub transit_share_cutoff: f64,
    /// Vertices closer than this (projected units) become one graph node.
    pub node_tolerance: f64,
    /// Reference system both inputs are projected into before the run.
    pub crs: MetricCrs,
    pub coefficients: EffectCoefficients,
    pub exposure: ExposureCriteria,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            threshold: 12.0,
            income_scale: 100_000.0,
            density_scale: 1_000.0,
            transit_share_cutoff: 0.1,
            node_tolerance: DEFAULT_NODE_TOLERANCE,
            crs: MetricCrs::default(),
            coefficients: EffectCoefficients::default(),
            exposure: ExposureCriteria::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .context("[simulate::config] Failed to parse simulation config")?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[simulate::config] Failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("[simulate::config] Invalid config in {}", path.display()))
    }

    /// Serialize to TOML (e.g. to write out the defaults).
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("[simulate::config] Failed to serialize simulation config")
    }

    /// Check that the numeric parameters are usable.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.threshold.is_finite(), "[simulate::config] threshold must be finite");
        ensure!(self.income_scale.is_finite() && self.income_scale > 0.0, "[simulate::config] income_scale must be positive");
        ensure!(self.density_scale.is_finite() && self.density_scale > 0.0, "[simulate::config] density_scale must be positive");
        ensure!(self.transit_share_cutoff.is_finite(), "[simulate::config] transit_share_cutoff must be finite");
        ensure!(self.node_tolerance.is_finite() && self.node_tolerance > 0.0, "[simulate::config] node_tolerance must be positive");

        let c = &self.coefficients;
        ensure!(
            [c.transit, c.ev, c.active_travel, c.solo_drive, c.short_commute].iter().all(|v| v.is_finite()),
            "[simulate::config] effect coefficients must be finite",
        );
        Ok(())
    }
}
