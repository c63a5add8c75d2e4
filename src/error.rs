//! Error types for the retirement simulation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by parameter validation, series loading, simulation runs
/// and outcome aggregation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Parameters violate their ordering or range invariants.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A rate series is empty or could not be parsed.
    #[error("invalid series data: {0}")]
    Data(String),

    /// Statistics were requested over an empty outcome collection.
    #[error("cannot summarize outcomes: {0}")]
    Statistics(String),

    /// The run was aborted between trials.
    #[error("simulation aborted after {completed} trial(s)")]
    Aborted {
        /// Trials finished before the abort flag was observed.
        completed: usize,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parameters file or JSON output could not be (de)serialized.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
