use std::ops::Range;

use rand::Rng;
use rand_distr::{Distribution, Triangular};

use crate::error::{Result, SimulationError};

/// One sampled retirement: where in the historical record it starts and how
/// many years it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    pub start_year_index: usize,
    pub duration_years: u32,
}

impl Trial {
    /// Unreduced year indices of the window. Callers take each modulo the
    /// length of the series they read from.
    pub fn year_indices(&self) -> Range<usize> {
        self.start_year_index..self.start_year_index + self.duration_years as usize
    }
}

/// Uniform start index in `[0, series_length)`.
pub fn sample_start_year(rng: &mut impl Rng, series_length: usize) -> Result<usize> {
    if series_length == 0 {
        return Err(SimulationError::Data(
            "cannot sample a start year from an empty series".to_string(),
        ));
    }
    Ok(rng.random_range(0..series_length))
}

/// Triangular draw over `[min_years, max_years]` peaked at `mode_years`, floored.
/// `min == mode` and `mode == max` are valid.
pub fn sample_duration(
    rng: &mut impl Rng,
    min_years: u32,
    mode_years: u32,
    max_years: u32,
) -> Result<u32> {
    Ok(duration_distribution(min_years, mode_years, max_years)?.sample(rng))
}

fn duration_distribution(min_years: u32, mode_years: u32, max_years: u32) -> Result<RetirementYears> {
    let dist = Triangular::new(min_years as f64, max_years as f64, mode_years as f64).map_err(
        |e| {
            SimulationError::Configuration(format!(
                "invalid retirement years {min_years}-{mode_years}-{max_years}: {e}"
            ))
        },
    )?;
    Ok(RetirementYears { dist, max_years })
}

/// Floored triangular duration. Clamped so float error can never push a draw
/// past the configured maximum.
#[derive(Debug, Clone, Copy)]
struct RetirementYears {
    dist: Triangular<f64>,
    max_years: u32,
}

impl Distribution<u32> for RetirementYears {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let years = self.dist.sample(rng).floor() as u32;
        years.min(self.max_years)
    }
}

/// Samples trials for a fixed series length and duration shape.
/// The distribution is built once and reused for every trial.
#[derive(Debug, Clone, Copy)]
pub struct TrialSampler {
    series_length: usize,
    duration: RetirementYears,
}

impl TrialSampler {
    pub fn new(series_length: usize, min_years: u32, mode_years: u32, max_years: u32) -> Result<Self> {
        if series_length == 0 {
            return Err(SimulationError::Data(
                "cannot sample trials over an empty series".to_string(),
            ));
        }
        Ok(TrialSampler {
            series_length,
            duration: duration_distribution(min_years, mode_years, max_years)?,
        })
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Trial {
        Trial {
            start_year_index: rng.random_range(0..self.series_length),
            duration_years: self.duration.sample(rng),
        }
    }
}
