mod config;
mod effect;
mod outcome;
mod simulation;
mod summary;

pub use config::{EffectCoefficients, SimulationConfig};
pub use effect::{density_modifier, income_modifier, EffectTerms};
pub use outcome::Outcome;
pub use simulation::{simulate_edge, EdgeResult, Simulation};
pub use summary::{EffectKind, EffectMean, EffectSummary};
