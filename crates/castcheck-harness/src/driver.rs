//! Two-phase protocol execution over the matrix walk.

use std::time::{Duration, Instant};

use castcheck_exec::{ARTIFACT_NAME, CompileCommand, run_artifact};
use castcheck_matrix::{
    Configuration, ConfigurationTester, ProcessOutcome, PruningState, ResolvedConfiguration,
    Termination, TestOutcome, classify_detection, classify_false_positive, expand_matrix,
};

use crate::report::{FailureRecord, MatrixReport, Phase};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, sha256_hex_file};

/// Drives the full matrix: compiles and runs both phases per configuration,
/// prints failing configurations with their reproduction commands, and
/// collects failure records for the report.
///
/// Execution is strictly sequential: every compile overwrites the shared
/// `a.out` and the following run depends on exactly that artifact.
pub struct MatrixDriver<'a> {
    command: CompileCommand,
    timeout: Option<Duration>,
    emitter: Option<&'a mut LogEmitter>,
    failures: Vec<FailureRecord>,
    configurations_tested: usize,
}

impl<'a> MatrixDriver<'a> {
    #[must_use]
    pub fn new(command: CompileCommand, timeout: Option<Duration>) -> Self {
        Self {
            command,
            timeout,
            emitter: None,
            failures: Vec::new(),
            configurations_tested: 0,
        }
    }

    /// Attach a structured-log emitter for per-phase records.
    #[must_use]
    pub fn with_emitter(mut self, emitter: &'a mut LogEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Walk the whole matrix and return the accumulated pruning state.
    pub fn run(&mut self) -> PruningState {
        expand_matrix(self)
    }

    #[must_use]
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    #[must_use]
    pub fn configurations_tested(&self) -> usize {
        self.configurations_tested
    }

    /// Consume the driver into a report.
    #[must_use]
    pub fn into_report(self, campaign: &str, pruning: &PruningState) -> MatrixReport {
        MatrixReport::new(
            campaign,
            self.command.compiler().display().to_string(),
            self.command.extra_args_for(false),
            self.configurations_tested,
            self.failures,
            pruning,
        )
    }

    fn test_configuration(&mut self, config: &Configuration, template: &str) -> bool {
        let resolved = config.resolved();
        let message = config.render_message(template);

        let detection_ok = self.run_phase(config, &resolved, &message, Phase::Detection);
        // The false-positive phase always runs, even after a detection
        // failure.
        let false_positive_ok = self.run_phase(config, &resolved, &message, Phase::FalsePositive);

        self.configurations_tested += 1;
        detection_ok && false_positive_ok
    }

    fn run_phase(
        &mut self,
        config: &Configuration,
        resolved: &ResolvedConfiguration,
        message: &str,
        phase: Phase,
    ) -> bool {
        let passing_variant = matches!(phase, Phase::FalsePositive);
        let started = Instant::now();
        let run = self
            .command
            .compile(resolved, passing_variant)
            .and_then(|()| run_artifact(self.command.fixture_dir(), self.timeout));
        let duration = started.elapsed();

        let (outcome, process, exec_error) = match run {
            Ok(process) => {
                let outcome = match phase {
                    Phase::Detection => classify_detection(&process),
                    Phase::FalsePositive => classify_false_positive(&process),
                };
                (outcome, Some(process), None)
            }
            // A child that cannot even be spawned counts as a failure of this
            // configuration; the run always proceeds to the next one.
            Err(err) => (phase.failure_outcome(), None, Some(err.to_string())),
        };

        self.log_phase(config, resolved, phase, outcome, process.as_ref(), duration);
        if outcome.passed() {
            return true;
        }
        self.record_failure(config, resolved, message, phase, process, exec_error);
        false
    }

    fn record_failure(
        &mut self,
        config: &Configuration,
        resolved: &ResolvedConfiguration,
        message: &str,
        phase: Phase,
        process: Option<ProcessOutcome>,
        exec_error: Option<String>,
    ) {
        let message = match phase {
            Phase::Detection => message.to_string(),
            Phase::FalsePositive => format!("{message} (false positive)"),
        };
        let compile_argv = self.command.base_argv(resolved);
        let extra_args = self
            .command
            .extra_args_for(matches!(phase, Phase::FalsePositive));

        // Reproduction recipe, exactly as compiled.
        println!("{message}");
        println!("{compile_argv:?}");
        println!("{extra_args:?}");

        let artifact_sha256 =
            sha256_hex_file(&self.command.fixture_dir().join(ARTIFACT_NAME)).ok();
        self.failures.push(FailureRecord {
            phase,
            configuration: *config,
            message,
            compile_argv,
            extra_args,
            termination: process.as_ref().map(|p| p.termination),
            output: process.map(|p| p.output).unwrap_or_default(),
            exec_error,
            artifact_sha256,
        });
    }

    fn log_phase(
        &mut self,
        config: &Configuration,
        resolved: &ResolvedConfiguration,
        phase: Phase,
        outcome: TestOutcome,
        process: Option<&ProcessOutcome>,
        duration: Duration,
    ) {
        let Some(emitter) = self.emitter.as_deref_mut() else {
            return;
        };
        let level = if outcome.passed() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let mut entry = LogEntry::new("", level, "phase_result")
            .with_phase(phase.name())
            .with_dimensions(
                resolved.alloc.name(),
                resolved.layout.name(),
                resolved.cast.name(),
            )
            .with_outcome(outcome.as_str())
            .with_duration_ms(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            .with_details(serde_json::json!({ "label": config.label() }));
        if let Some(process) = process {
            entry = match process.termination {
                Termination::Exited(code) => entry.with_exit_code(code),
                Termination::Signaled(signal) => entry.with_signal(signal),
                Termination::TimedOut => entry.with_timed_out(true),
            };
        }
        if !outcome.passed()
            && let Ok(sha) = sha256_hex_file(&self.command.fixture_dir().join(ARTIFACT_NAME))
        {
            entry = entry.with_artifact_sha256(sha);
        }
        if let Err(err) = emitter.emit_entry(entry) {
            eprintln!("warning: failed writing log entry: {err}");
        }
    }
}

impl ConfigurationTester for MatrixDriver<'_> {
    fn test(&mut self, config: &Configuration, template: &str) -> bool {
        self.test_configuration(config, template)
    }
}
