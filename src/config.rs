use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::series::InvestmentType;

/// Upper bound on any sampled retirement length.
pub const MAX_RETIREMENT_YEARS: u32 = 99;

/// Inputs of one simulation run. Validate once with [`SimulationParameters::validate`];
/// the engine refuses to start otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub investment_type: InvestmentType,
    /// Portfolio value at retirement, whole currency units.
    pub start_value: i64,
    /// First-year withdrawal in today's money; inflation-adjusted afterwards.
    pub annual_withdrawal: i64,
    pub min_years: u32,
    pub mode_years: u32,
    pub max_years: u32,
    pub trial_count: usize,
    /// Fixed seed for reproducible runs. `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters::canonical()
    }
}

impl SimulationParameters {
    /// The calculator's stock scenario: bonds, 2M start, 80k/year, 18–25–40 years.
    pub fn canonical() -> Self {
        SimulationParameters {
            investment_type: InvestmentType::Bonds,
            start_value: 2_000_000,
            annual_withdrawal: 80_000,
            min_years: 18,
            mode_years: 25,
            max_years: 40,
            trial_count: 50_000,
            seed: None,
        }
    }

    /// Check ordering and range invariants. Fails fast on the first violation.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SimulationError::Configuration(msg));

        if self.start_value <= 0 {
            return fail(format!("start value must be positive, got {}", self.start_value));
        }
        if self.annual_withdrawal <= 0 {
            return fail(format!(
                "annual withdrawal must be positive, got {}",
                self.annual_withdrawal
            ));
        }
        if !(self.min_years < self.mode_years && self.mode_years < self.max_years) {
            return fail(format!(
                "retirement years must satisfy minimum < most likely < maximum, got {}-{}-{}",
                self.min_years, self.mode_years, self.max_years
            ));
        }
        if self.max_years > MAX_RETIREMENT_YEARS {
            return fail(format!(
                "maximum retirement years must not exceed {MAX_RETIREMENT_YEARS}, got {}",
                self.max_years
            ));
        }
        if self.trial_count == 0 {
            return fail("trial count must be positive".to_string());
        }
        Ok(())
    }

    /// Load parameters from a JSON file. Missing fields take canonical values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| SimulationError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
