use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::SimulationParameters;
use crate::error::{Result, SimulationError};
use crate::sampler::{Trial, TrialSampler};
use crate::series::{InflationSeries, ReturnSeries};
use crate::trajectory::{self, TrajectoryResult, YearRates, YearStep};
use crate::types::{Outcome, OutcomeSet, TrialId};

/// A validated Monte Carlo run over borrowed historical series.
///
/// Every trial draws from its own ChaCha20 stream (`stream = trial index`) of
/// the run seed, so outcomes depend only on the seed and inputs, never on
/// how rayon schedules the work.
pub struct Simulation<'a> {
    params: SimulationParameters,
    returns: &'a ReturnSeries,
    inflation: &'a InflationSeries,
    sampler: TrialSampler,
    seed: u64,
}

impl<'a> Simulation<'a> {
    /// Validate parameters and series. Nothing is simulated on failure.
    pub fn new(
        params: SimulationParameters,
        returns: &'a ReturnSeries,
        inflation: &'a InflationSeries,
    ) -> Result<Self> {
        params.validate()?;
        returns.ensure_non_empty("return")?;
        inflation.ensure_non_empty("inflation")?;

        let sampler =
            TrialSampler::new(returns.len(), params.min_years, params.mode_years, params.max_years)?;
        let seed = params.seed.unwrap_or_else(|| rand::rng().random());

        Ok(Simulation { params, returns, inflation, sampler, seed })
    }

    /// Seed actually used; reported so unseeded runs can be replayed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    fn trial_rng(&self, id: TrialId) -> ChaCha20Rng {
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        rng.set_stream(id.0);
        rng
    }

    /// The start year and duration drawn for trial `id`.
    pub fn trial(&self, id: TrialId) -> Trial {
        self.sampler.sample(&mut self.trial_rng(id))
    }

    fn window(&self, trial: Trial) -> impl Iterator<Item = YearRates> + '_ {
        trial.year_indices().map(|i| YearRates {
            market_return: self.returns.rate_at(i),
            inflation: self.inflation.rate_at(i),
        })
    }

    pub fn run_trial(&self, id: TrialId) -> TrajectoryResult {
        let trial = self.trial(id);
        trajectory::simulate(
            self.params.start_value,
            self.params.annual_withdrawal,
            self.window(trial),
        )
    }

    /// Year-by-year path of trial `id`, for inspecting a single scenario.
    pub fn trace_trial(&self, id: TrialId) -> (Trial, Vec<YearStep>) {
        let trial = self.trial(id);
        let steps = trajectory::trace(
            self.params.start_value,
            self.params.annual_withdrawal,
            self.window(trial),
        );
        (trial, steps)
    }

    /// Run every trial in parallel. Outcomes are ordered by trial index.
    pub fn run(&self) -> OutcomeSet {
        let started = Instant::now();
        info!(
            seed = self.seed,
            trials = self.params.trial_count,
            investment = %self.params.investment_type,
            "starting simulation"
        );
        let outcomes: OutcomeSet = (0..self.params.trial_count as u64)
            .into_par_iter()
            .map(|k| self.run_trial(TrialId(k)).outcome)
            .collect();
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "simulation finished");
        outcomes
    }

    /// Like [`Simulation::run`], but checks `abort` before each trial and
    /// stops with [`SimulationError::Aborted`] once it is raised.
    pub fn run_until(&self, abort: &AtomicBool) -> Result<OutcomeSet> {
        let completed = AtomicUsize::new(0);
        debug!(seed = self.seed, trials = self.params.trial_count, "starting abortable simulation");

        let outcomes: Result<OutcomeSet> = (0..self.params.trial_count as u64)
            .into_par_iter()
            .map(|k| -> Result<Outcome> {
                if abort.load(Ordering::Relaxed) {
                    return Err(SimulationError::Aborted {
                        completed: completed.load(Ordering::Relaxed),
                    });
                }
                let outcome = self.run_trial(TrialId(k)).outcome;
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(outcome)
            })
            .collect();

        if let Err(SimulationError::Aborted { completed }) = &outcomes {
            warn!(completed, trials = self.params.trial_count, "simulation aborted");
        }
        outcomes
    }
}

/// Validate inputs and run all trials.
pub fn run(
    params: &SimulationParameters,
    returns: &ReturnSeries,
    inflation: &InflationSeries,
) -> Result<OutcomeSet> {
    Ok(Simulation::new(params.clone(), returns, inflation)?.run())
}
