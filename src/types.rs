use serde::Serialize;

/// Position of a trial within a run. Also the ChaCha stream the trial draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrialId(pub u64);

/// Result of one simulated retirement.
/// Invariant: `final_value == 0` iff `bankrupt`, otherwise `final_value > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub final_value: i64, // whole currency units
    pub bankrupt: bool,
}

impl Outcome {
    pub fn bankrupt() -> Self {
        Outcome { final_value: 0, bankrupt: true }
    }

    pub fn solvent(final_value: i64) -> Self {
        debug_assert!(final_value > 0, "solvent outcome must be positive");
        Outcome { final_value, bankrupt: false }
    }
}

/// Outcomes of a run, ordered by trial index.
pub type OutcomeSet = Vec<Outcome>;
