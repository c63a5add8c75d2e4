//! Monte Carlo estimate of the odds that a retirement portfolio runs out of
//! money, replaying historical annual returns and inflation.
//!
//! A run samples many independent retirements (start year, triangular
//! duration), walks each one year by year with truncating integer
//! arithmetic, and summarizes the final values.

pub mod analysis;
pub mod config;
pub mod error;
pub mod report;
pub mod sampler;
pub mod series;
pub mod simulation;
pub mod trajectory;
pub mod types;

pub use analysis::{SummaryStatistics, summarize};
pub use config::SimulationParameters;
pub use error::{Result, SimulationError};
pub use series::{InvestmentType, RateSeries, SeriesRepository};
pub use simulation::Simulation;
pub use types::{Outcome, OutcomeSet, TrialId};
