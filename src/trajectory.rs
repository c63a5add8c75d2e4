//! Year-by-year evolution of a single retirement portfolio.
//!
//! All amounts are whole currency units. Every update multiplies in `f64` and
//! truncates toward zero, so results are reproducible bit-for-bit for a given
//! rate sequence. Rounding instead would shift bankruptcy counts at the margin.

use crate::types::Outcome;

/// One simulated year: market return and inflation, both decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearRates {
    pub market_return: f64,
    pub inflation: f64,
}

/// Withdrawal taken and portfolio value after growth, for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearStep {
    pub withdrawal: i64,
    pub value: i64,
}

/// Result of walking a window of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryResult {
    pub outcome: Outcome,
    /// Years consumed, including the year the portfolio was depleted.
    pub years_simulated: u32,
}

/// Portfolio state carried across the years of one trial.
#[derive(Debug, Clone)]
pub struct PortfolioTrajectory {
    value: i64,
    base_withdrawal: i64,
    withdrawal: Option<i64>,
    years: u32,
    bankrupt: bool,
}

impl PortfolioTrajectory {
    pub fn new(start_value: i64, base_withdrawal: i64) -> Self {
        PortfolioTrajectory {
            value: start_value,
            base_withdrawal,
            withdrawal: None,
            years: 0,
            bankrupt: false,
        }
    }

    pub fn is_bankrupt(&self) -> bool {
        self.bankrupt
    }

    /// Advance one year. Returns `None` once the portfolio is depleted; the
    /// depleting year itself is returned with its (non-positive) value.
    pub fn step(&mut self, rates: YearRates) -> Option<YearStep> {
        if self.bankrupt {
            return None;
        }

        // First year is withdrawn in today's money; inflation applies from year two.
        let withdrawal = match self.withdrawal {
            None => self.base_withdrawal,
            Some(prev) => truncate(prev as f64 * (1.0 + rates.inflation)),
        };
        self.withdrawal = Some(withdrawal);

        self.value -= withdrawal;
        self.value = truncate(self.value as f64 * (1.0 + rates.market_return));
        self.years += 1;

        if self.value <= 0 {
            self.bankrupt = true;
        }
        Some(YearStep { withdrawal, value: self.value })
    }

    pub fn result(&self) -> TrajectoryResult {
        let outcome = if self.bankrupt {
            Outcome::bankrupt()
        } else {
            Outcome::solvent(self.value)
        };
        TrajectoryResult { outcome, years_simulated: self.years }
    }
}

fn truncate(amount: f64) -> i64 {
    amount.trunc() as i64
}

/// Walk `years` in order, stopping at the first year the value drops to zero
/// or below. An empty window leaves `start_value` untouched.
pub fn simulate(
    start_value: i64,
    base_withdrawal: i64,
    years: impl IntoIterator<Item = YearRates>,
) -> TrajectoryResult {
    let mut portfolio = PortfolioTrajectory::new(start_value, base_withdrawal);
    for rates in years {
        portfolio.step(rates);
        if portfolio.is_bankrupt() {
            break;
        }
    }
    portfolio.result()
}

/// Per-year path of a trial, up to and including the depleting year.
pub fn trace(
    start_value: i64,
    base_withdrawal: i64,
    years: impl IntoIterator<Item = YearRates>,
) -> Vec<YearStep> {
    let mut portfolio = PortfolioTrajectory::new(start_value, base_withdrawal);
    let mut steps = Vec::new();
    for rates in years {
        match portfolio.step(rates) {
            Some(step) => steps.push(step),
            None => break,
        }
    }
    steps
}
