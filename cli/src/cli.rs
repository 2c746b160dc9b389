use std::path::PathBuf;

use pm25sim::MetricCrs;

/// PM2.5 effect-attribution over road networks
#[derive(clap::Parser, Debug)]
#[command(name = "pm25sim", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Simulate PM2.5 changes on every road segment
    Simulate(SimulateArgs),

    /// Prepare a raw attribute table (ownership, commute, density)
    Convert(ConvertArgs),

    /// Classify regions into high/low exposure areas
    Exposure(ExposureArgs),
}

#[derive(clap::Args, Debug)]
pub struct SimulateArgs {
    /// Region boundaries (GeoJSON, keyed by `name`)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Per-region attribute table (CSV with a `name` column)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub attributes: PathBuf,

    /// Road network (GeoJSON or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub roads: PathBuf,

    /// Output directory, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Simulation parameters (TOML)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the PM2.5 reference threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Override the metric reference system: none, utm or mercator
    #[arg(long)]
    pub crs: Option<MetricCrs>,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Region boundaries (GeoJSON with `name` and `total_pop`)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Raw attribute table (CSV with a `name` column)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output CSV, defaults to "./merged_data_converted.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ExposureArgs {
    /// Region boundaries (GeoJSON, keyed by `name`)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Converted attribute table (CSV with a `name` column)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub attributes: PathBuf,

    /// Output CSV, defaults to "./exposure.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also draw the exposure map to this SVG file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,

    /// Exposure thresholds (TOML, `[exposure]` table of a simulation config)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}
