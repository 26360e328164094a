//! Process-outcome classification.
//!
//! The detector under test reports violations by aborting the program, by
//! exiting non-zero, or (for report-only mechanisms) by writing to
//! stdout/stderr and exiting cleanly. The harness cannot distinguish a
//! genuine detector abort from an unrelated crash; both classify as "the
//! detector flagged something". Classification is a pure function of the
//! captured [`ProcessOutcome`] so it is testable without spawning processes.

use serde::{Deserialize, Serialize};

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Termination {
    /// Normal exit with the given status code.
    Exited(i32),
    /// Terminated by the given signal number.
    Signaled(i32),
    /// Killed by the harness after the per-invocation timeout.
    TimedOut,
}

/// Captured result of one test-program run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub termination: Termination,
    /// Combined stdout + stderr, lossily decoded.
    pub output: String,
}

/// Verdict for one phase of one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Pass,
    /// Detection phase: the program violated type safety and the detector
    /// stayed silent.
    FailMissedDetection,
    /// False-positive phase: the program was well-behaved and the detector
    /// still reported a violation.
    FailFalsePositive,
}

impl TestOutcome {
    #[must_use]
    pub const fn passed(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Stable label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::FailMissedDetection => "fail_missed_detection",
            Self::FailFalsePositive => "fail_false_positive",
        }
    }
}

impl ProcessOutcome {
    /// Convenience constructor for a normal exit.
    #[must_use]
    pub fn exited(code: i32, output: impl Into<String>) -> Self {
        Self {
            termination: Termination::Exited(code),
            output: output.into(),
        }
    }

    /// Convenience constructor for a signal death.
    #[must_use]
    pub fn signaled(signal: i32, output: impl Into<String>) -> Self {
        Self {
            termination: Termination::Signaled(signal),
            output: output.into(),
        }
    }

    /// Convenience constructor for a harness-enforced timeout.
    #[must_use]
    pub fn timed_out(output: impl Into<String>) -> Self {
        Self {
            termination: Termination::TimedOut,
            output: output.into(),
        }
    }

    /// Whether the detector reported anything.
    ///
    /// Abnormal termination always counts. A clean exit counts only when the
    /// run produced output. A timed-out run classifies like a clean exit:
    /// only output captured before the kill counts.
    #[must_use]
    pub fn flagged(&self) -> bool {
        match self.termination {
            Termination::Exited(0) | Termination::TimedOut => !self.output.is_empty(),
            Termination::Exited(_) | Termination::Signaled(_) => true,
        }
    }
}

/// Classify the detection phase: the program performs a genuine violation,
/// so the detector must flag it.
#[must_use]
pub fn classify_detection(outcome: &ProcessOutcome) -> TestOutcome {
    if outcome.flagged() {
        TestOutcome::Pass
    } else {
        TestOutcome::FailMissedDetection
    }
}

/// Classify the false-positive phase: the program is on the non-violating
/// control path, so the detector must stay silent.
#[must_use]
pub fn classify_false_positive(outcome: &ProcessOutcome) -> TestOutcome {
    if outcome.flagged() {
        TestOutcome::FailFalsePositive
    } else {
        TestOutcome::Pass
    }
}
