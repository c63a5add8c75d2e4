use std::num::ParseFloatError;

use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::types::Outcome;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub trial_count: usize,
    pub bankrupt_count: usize,
    /// Share of trials that ran out of money, percent rounded to one decimal.
    pub bankruptcy_probability_percent: f64,
    /// Truncated integer mean of all final values (bankrupt trials count as 0).
    pub mean_outcome: i64,
    pub min_outcome: i64,
    pub max_outcome: i64,
    pub p5_outcome: i64,
    pub p50_outcome: i64,
    pub p95_outcome: i64,
}

/// Running count/sum/min/max over outcomes.
///
/// `merge` is commutative and associative, so partial accumulators built on
/// different workers can be combined in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeAccumulator {
    pub count: usize,
    pub bankrupt_count: usize,
    pub sum: i128,
    pub min: i64,
    pub max: i64,
}

impl Default for OutcomeAccumulator {
    fn default() -> Self {
        OutcomeAccumulator { count: 0, bankrupt_count: 0, sum: 0, min: i64::MAX, max: i64::MIN }
    }
}

impl OutcomeAccumulator {
    pub fn push(&mut self, outcome: &Outcome) {
        let value = outcome.final_value;
        self.count += 1;
        if value == 0 {
            self.bankrupt_count += 1;
        }
        self.sum += value as i128;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(self, other: Self) -> Self {
        OutcomeAccumulator {
            count: self.count + other.count,
            bankrupt_count: self.bankrupt_count + other.bankrupt_count,
            sum: self.sum + other.sum,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Truncated mean. `None` when nothing has been pushed.
    pub fn mean(&self) -> Option<i64> {
        if self.count == 0 {
            return None;
        }
        Some((self.sum / self.count as i128) as i64)
    }

    /// Bankruptcy percentage rounded to one decimal.
    pub fn bankruptcy_probability_percent(&self) -> Result<f64> {
        if self.count == 0 {
            return Err(SimulationError::Statistics("no outcomes to summarize".to_string()));
        }
        let pct = (100 * self.bankrupt_count) as f64 / self.count as f64;
        round_decimal(pct, 1).map_err(|e| {
            SimulationError::Statistics(format!("cannot round bankruptcy percentage {pct}: {e}"))
        })
    }
}

/// Round to `places` decimals the way the stored binary value dictates.
///
/// Scaling by a power of ten first would add a second rounding step that can
/// turn a value just below or above a half into an exact tie. Formatting
/// rounds the exact value instead and breaks true ties to even.
pub fn round_decimal(value: f64, places: usize) -> std::result::Result<f64, ParseFloatError> {
    format!("{value:.places$}").parse()
}

impl<'a> FromIterator<&'a Outcome> for OutcomeAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a Outcome>>(iter: I) -> Self {
        let mut acc = OutcomeAccumulator::default();
        for outcome in iter {
            acc.push(outcome);
        }
        acc
    }
}

/// Reduce a run's outcomes to summary statistics.
pub fn summarize(outcomes: &[Outcome]) -> Result<SummaryStatistics> {
    if outcomes.is_empty() {
        return Err(SimulationError::Statistics("no outcomes to summarize".to_string()));
    }
    let acc: OutcomeAccumulator = outcomes.iter().collect();

    let mut values: Vec<i64> = outcomes.iter().map(|o| o.final_value).collect();
    values.sort_unstable();
    let (p5, p50, p95) = (
        percentile(&values, 0.05),
        percentile(&values, 0.50),
        percentile(&values, 0.95),
    );

    Ok(SummaryStatistics {
        trial_count: acc.count,
        bankrupt_count: acc.bankrupt_count,
        bankruptcy_probability_percent: acc.bankruptcy_probability_percent()?,
        mean_outcome: acc.mean().unwrap_or(0),
        min_outcome: acc.min,
        max_outcome: acc.max,
        p5_outcome: p5,
        p50_outcome: p50,
        p95_outcome: p95,
    })
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn percentile(sorted: &[i64], p: f64) -> i64 {
    let n = sorted.len();
    let h = p * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    let value = (sorted[lo] as f64 * (1.0 - frac) + sorted[hi] as f64 * frac) as i64;
    value.clamp(sorted[lo], sorted[hi])
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn outcomes(values: &[i64]) -> Vec<Outcome> {
        values
            .iter()
            .map(|&v| if v == 0 { Outcome::bankrupt() } else { Outcome::solvent(v) })
            .collect()
    }

    #[test]
    fn known_values() {
        let s = summarize(&outcomes(&[0, 100, 200, 0, 300])).unwrap();
        assert_eq!(s.trial_count, 5);
        assert_eq!(s.bankrupt_count, 2);
        assert_eq!(s.bankruptcy_probability_percent, 40.0);
        assert_eq!(s.mean_outcome, 120);
        assert_eq!(s.min_outcome, 0);
        assert_eq!(s.max_outcome, 300);
        assert_eq!(s.p50_outcome, 100);
    }

    #[test]
    fn mean_truncates() {
        let s = summarize(&outcomes(&[1, 2])).unwrap();
        assert_eq!(s.mean_outcome, 1);
        let s = summarize(&outcomes(&[0, 0, 5])).unwrap();
        assert_eq!(s.mean_outcome, 1);
    }

    #[test]
    fn probability_rounds_to_one_decimal() {
        // 1 / 3 → 33.333… → 33.3
        let s = summarize(&outcomes(&[0, 10, 10])).unwrap();
        assert_eq!(s.bankruptcy_probability_percent, 33.3);
        // 2 / 3 → 66.666… → 66.7
        let s = summarize(&outcomes(&[0, 0, 10])).unwrap();
        assert_eq!(s.bankruptcy_probability_percent, 66.7);
        // 1 / 400 → 0.25 → ties to even → 0.2
        let mut v = vec![10; 399];
        v.push(0);
        let s = summarize(&outcomes(&v)).unwrap();
        assert_eq!(s.bankruptcy_probability_percent, 0.2);
    }

    #[test]
    fn probability_rounds_the_stored_value() {
        // 100 * 25 / 50_000 is stored just above 0.05.
        let mut v = vec![10; 50_000 - 25];
        v.extend([0; 25]);
        let s = summarize(&outcomes(&v)).unwrap();
        assert_eq!(s.bankruptcy_probability_percent, 0.1);
        // 100 * 9 / 2_000 is stored just above 0.45.
        let mut v = vec![10; 2_000 - 9];
        v.extend([0; 9]);
        let s = summarize(&outcomes(&v)).unwrap();
        assert_eq!(s.bankruptcy_probability_percent, 0.5);
    }

    #[test]
    fn accumulator_percentage_needs_outcomes() {
        let acc = OutcomeAccumulator::default();
        assert!(matches!(acc.bankruptcy_probability_percent(), Err(SimulationError::Statistics(_))));
        let acc = OutcomeAccumulator { count: 2_000, bankrupt_count: 3, ..acc };
        // 0.15 is stored just below the half.
        assert_eq!(acc.bankruptcy_probability_percent().unwrap(), 0.1);
    }

    #[test]
    fn decimal_rounding_follows_stored_value() {
        assert_eq!(round_decimal(0.25, 1).unwrap(), 0.2);
        assert_eq!(round_decimal(0.35, 1).unwrap(), 0.3);
        assert_eq!(round_decimal(0.0002449999999999999, 5).unwrap(), 0.00024);
        assert_eq!(round_decimal(-2.675, 2).unwrap(), -2.67);
    }

    #[test]
    fn empty_outcomes_are_a_statistics_error() {
        assert!(matches!(summarize(&[]), Err(SimulationError::Statistics(_))));
    }

    #[test]
    fn all_bankrupt() {
        let s = summarize(&outcomes(&[0, 0, 0, 0])).unwrap();
        assert_eq!(s.bankruptcy_probability_percent, 100.0);
        assert_eq!(s.mean_outcome, 0);
        assert_eq!(s.max_outcome, 0);
    }

    #[test]
    fn merged_partials_equal_single_pass() {
        let all = outcomes(&[0, 5, 9, 0, 12, 7, 3]);
        let whole: OutcomeAccumulator = all.iter().collect();
        let left: OutcomeAccumulator = all[..3].iter().collect();
        let right: OutcomeAccumulator = all[3..].iter().collect();
        assert_eq!(left.merge(right), whole);
        assert_eq!(right.merge(left), whole);
        assert_eq!(whole.merge(OutcomeAccumulator::default()), whole);
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [0, 10, 20, 30, 40];
        assert_eq!(percentile(&sorted, 0.0), 0);
        assert_eq!(percentile(&sorted, 0.5), 20);
        assert_eq!(percentile(&sorted, 1.0), 40);
        assert_eq!(percentile(&[7], 0.95), 7);
    }

    proptest! {
        #[test]
        fn summary_invariants(values in prop::collection::vec(
            prop_oneof![Just(0i64), 1i64..10_000_000], 1..500)
        ) {
            let outs = outcomes(&values);
            let s = summarize(&outs).unwrap();
            prop_assert_eq!(s.trial_count, values.len());
            prop_assert_eq!(s.bankrupt_count, values.iter().filter(|&&v| v == 0).count());
            prop_assert!(s.min_outcome <= s.mean_outcome && s.mean_outcome <= s.max_outcome);
            prop_assert!(s.min_outcome <= s.p5_outcome && s.p95_outcome <= s.max_outcome);
            prop_assert!((0.0..=100.0).contains(&s.bankruptcy_probability_percent));
        }
    }
}
