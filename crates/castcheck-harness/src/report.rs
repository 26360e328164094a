//! Report generation for matrix runs.

use serde::{Deserialize, Serialize};

use castcheck_matrix::{
    AllocKind, CastKind, Configuration, LayoutKind, PruningState, Termination, TestOutcome,
};

/// Which half of the two-phase protocol a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The program performs a genuine violation; the detector must flag it.
    Detection,
    /// The program is well-behaved; the detector must stay silent.
    FalsePositive,
}

impl Phase {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Detection => "detection",
            Self::FalsePositive => "false_positive",
        }
    }

    /// The verdict this phase produces when it does not behave as required.
    #[must_use]
    pub const fn failure_outcome(self) -> TestOutcome {
        match self {
            Self::Detection => TestOutcome::FailMissedDetection,
            Self::FalsePositive => TestOutcome::FailFalsePositive,
        }
    }
}

/// One failing phase of one configuration, with everything needed to
/// reproduce the compile by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub phase: Phase,
    pub configuration: Configuration,
    pub message: String,
    /// Full fixed argv of the failing compile, compiler included.
    pub compile_argv: Vec<String>,
    /// Extra args appended to the compile (including `-DDO_PASSING` for
    /// false-positive records).
    pub extra_args: Vec<String>,
    /// How the test program ended; absent when the child could not be
    /// spawned at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
    /// Combined stdout+stderr of the run.
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_error: Option<String>,
    /// SHA-256 of the on-disk artifact that produced this verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_sha256: Option<String>,
}

/// Aggregate counters plus the unsupported-value sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub configurations_tested: usize,
    pub failures: usize,
    pub missed_detections: usize,
    pub false_positives: usize,
    pub unsupported_allocs: Vec<AllocKind>,
    pub unsupported_layouts: Vec<LayoutKind>,
    pub unsupported_casts: Vec<CastKind>,
}

/// Top-level run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixReport {
    pub title: String,
    pub campaign: String,
    pub compiler: String,
    pub extra_args: Vec<String>,
    pub summary: MatrixSummary,
    pub failures: Vec<FailureRecord>,
}

impl MatrixReport {
    /// Assemble a report from a finished run.
    #[must_use]
    pub fn new(
        campaign: impl Into<String>,
        compiler: impl Into<String>,
        extra_args: Vec<String>,
        configurations_tested: usize,
        failures: Vec<FailureRecord>,
        pruning: &PruningState,
    ) -> Self {
        let missed_detections = failures
            .iter()
            .filter(|f| f.phase == Phase::Detection)
            .count();
        let false_positives = failures
            .iter()
            .filter(|f| f.phase == Phase::FalsePositive)
            .count();
        Self {
            title: String::from("Type-confusion detector conformance matrix"),
            campaign: campaign.into(),
            compiler: compiler.into(),
            extra_args,
            summary: MatrixSummary {
                configurations_tested,
                failures: failures.len(),
                missed_detections,
                false_positives,
                unsupported_allocs: pruning.unsupported_allocs(),
                unsupported_layouts: pruning.unsupported_layouts(),
                unsupported_casts: pruning.unsupported_casts(),
            },
            failures,
        }
    }

    /// Returns true when no phase failed anywhere in the matrix.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.summary.failures == 0
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Campaign: {}\n", self.campaign));
        out.push_str(&format!("- Compiler: {}\n", self.compiler));
        out.push_str(&format!("- Extra args: {:?}\n", self.extra_args));
        out.push_str(&format!(
            "- Configurations tested: {}\n",
            self.summary.configurations_tested
        ));
        out.push_str(&format!(
            "- Failures: {} (missed detections: {}, false positives: {})\n",
            self.summary.failures, self.summary.missed_detections, self.summary.false_positives
        ));
        out.push_str(&format!(
            "- Unsupported allocation kinds: {}\n",
            name_list(self.summary.unsupported_allocs.iter().map(|a| a.name()))
        ));
        out.push_str(&format!(
            "- Unsupported layout kinds: {}\n",
            name_list(self.summary.unsupported_layouts.iter().map(|l| l.name()))
        ));
        out.push_str(&format!(
            "- Unsupported down-cast kinds: {}\n\n",
            name_list(self.summary.unsupported_casts.iter().map(|c| c.name()))
        ));

        out.push_str("| Phase | Configuration | Message |\n");
        out.push_str("|-------|---------------|--------|\n");
        for failure in &self.failures {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.phase.name(),
                failure.configuration.label(),
                failure.message
            ));
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

fn name_list<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = names.collect();
    if joined.is_empty() {
        String::from("none")
    } else {
        joined.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_failure(phase: Phase) -> FailureRecord {
        FailureRecord {
            phase,
            configuration: Configuration::single_alloc(AllocKind::Stack),
            message: String::from("Allocations of type STACK not handled"),
            compile_argv: vec!["clang++".into(), "-O0".into()],
            extra_args: vec!["-fsanitize=hextype".into()],
            termination: Some(Termination::Exited(0)),
            output: String::new(),
            exec_error: None,
            artifact_sha256: None,
        }
    }

    #[test]
    fn summary_splits_failures_by_phase() {
        let mut pruning = PruningState::new();
        pruning.mark_alloc(AllocKind::Stack);
        let report = MatrixReport::new(
            "unit",
            "clang++",
            vec![],
            37,
            vec![
                sample_failure(Phase::Detection),
                sample_failure(Phase::FalsePositive),
                sample_failure(Phase::FalsePositive),
            ],
            &pruning,
        );
        assert_eq!(report.summary.failures, 3);
        assert_eq!(report.summary.missed_detections, 1);
        assert_eq!(report.summary.false_positives, 2);
        assert_eq!(report.summary.unsupported_allocs, vec![AllocKind::Stack]);
        assert!(!report.all_passed());
    }

    #[test]
    fn markdown_lists_every_failure() {
        let report = MatrixReport::new(
            "unit",
            "clang++",
            vec![],
            1,
            vec![sample_failure(Phase::Detection)],
            &PruningState::new(),
        );
        let md = report.to_markdown();
        assert!(md.contains("| detection | STACK/-/- | Allocations of type STACK not handled |"));
        assert!(md.contains("Unsupported allocation kinds: none"));
    }

    #[test]
    fn json_roundtrips() {
        let report = MatrixReport::new(
            "unit",
            "g++",
            vec!["-fsanitize=typesan".into()],
            2,
            vec![sample_failure(Phase::FalsePositive)],
            &PruningState::new(),
        );
        let parsed: MatrixReport = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(parsed.compiler, "g++");
        assert_eq!(parsed.failures.len(), 1);
        assert_eq!(parsed.failures[0].phase, Phase::FalsePositive);
    }
}
