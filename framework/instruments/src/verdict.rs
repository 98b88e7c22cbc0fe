use std::fmt;

use crate::StatusTally;

/// The conclusion drawn from a scenario's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Exactly one winner and the rest were turned away correctly.
    Pass,
    /// Nobody won. The target was most likely taken by an earlier run, so this run proves nothing.
    NoWinner,
    /// More than one request won the same seat or seat group. The backend oversold.
    Oversold { successes: usize },
    /// One winner but the losers did not all get a conflict, e.g. timeouts or server errors.
    Ambiguous {
        successes: usize,
        conflicts: usize,
        errors: usize,
    },
    /// Throughput and survival scenarios measure rather than judge.
    Measured,
}

impl Verdict {
    /// Judge a race of `competitors` identical requests for one seat.
    ///
    /// Passing requires one success and a conflict for everyone else. Any number of successes above
    /// one is an oversell, regardless of what else happened.
    pub fn single_winner(tally: &StatusTally, competitors: usize) -> Self {
        match tally.success {
            0 => Verdict::NoWinner,
            1 if tally.conflict + 1 == competitors => Verdict::Pass,
            1 => Verdict::Ambiguous {
                successes: tally.success,
                conflicts: tally.conflict,
                errors: tally.error,
            },
            successes => Verdict::Oversold { successes },
        }
    }

    /// Judge a race for an atomic seat group, where at most one request may win.
    pub fn atomic_group(tally: &StatusTally) -> Self {
        match tally.success {
            0 => Verdict::NoWinner,
            1 => Verdict::Pass,
            successes => Verdict::Oversold { successes },
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Verdict::Oversold { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS: ideal consistency, exactly one winner"),
            Verdict::NoWinner => write!(
                f,
                "WARNING: nobody won, the target was probably taken by an earlier run"
            ),
            Verdict::Oversold { successes } => write!(
                f,
                "CRITICAL: the same seats were sold {successes} times"
            ),
            Verdict::Ambiguous {
                successes,
                conflicts,
                errors,
            } => write!(
                f,
                "AMBIGUOUS: {successes} success, {conflicts} conflicts, {errors} errors (network or backend failures)"
            ),
            Verdict::Measured => write!(f, "MEASURED"),
        }
    }
}
