//! Compiler and test-program execution seam.
//!
//! This crate owns the two child-process interactions of the driver: building
//! and spawning the compile command for a resolved configuration, and running
//! the freshly built artifact with combined output capture. Classification of
//! what a run *means* lives in `castcheck-matrix`; this crate only produces
//! the raw [`ProcessOutcome`].

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

use castcheck_matrix::{ProcessOutcome, ResolvedConfiguration, Termination};

/// Fixture translation units, compiled in this order for every configuration.
pub const FIXTURE_SOURCES: &[&str] = &[
    "firstmodule.cpp",
    "typecheck.cpp",
    "allocate.cpp",
    "secondmodule.cpp",
];

/// Compiler-default output name; overwritten by every compile, never cleaned
/// up between phases or configurations.
pub const ARTIFACT_NAME: &str = "a.out";

/// Macro flag forcing the fixture program onto its non-violating control
/// path for the false-positive phase.
pub const PASSING_VARIANT_FLAG: &str = "-DDO_PASSING";

/// Polling interval while supervising a running artifact.
const WAIT_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("io while supervising `{command}`: {source}")]
    Supervise {
        command: String,
        source: std::io::Error,
    },
}

/// Compile-command builder for one driver run.
///
/// The compiler executable and extra args are passed through verbatim to
/// every invocation; only the three `-D` selectors vary per configuration.
#[derive(Debug, Clone)]
pub struct CompileCommand {
    compiler: PathBuf,
    extra_args: Vec<String>,
    fixture_dir: PathBuf,
}

impl CompileCommand {
    #[must_use]
    pub fn new(
        compiler: impl Into<PathBuf>,
        extra_args: Vec<String>,
        fixture_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            compiler: compiler.into(),
            extra_args,
            fixture_dir: fixture_dir.into(),
        }
    }

    #[must_use]
    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    #[must_use]
    pub fn fixture_dir(&self) -> &Path {
        &self.fixture_dir
    }

    /// The fixed part of the compile argv for `config`, starting with the
    /// compiler itself: `<compiler> -O0 -std=c++11 <sources...> -DALLOC_<A>
    /// -DBASE_<L> -DCAST_<C>`. This is the list reported verbatim for failing
    /// configurations so they can be reproduced by hand.
    #[must_use]
    pub fn base_argv(&self, config: &ResolvedConfiguration) -> Vec<String> {
        let mut argv = vec![
            self.compiler.display().to_string(),
            "-O0".to_string(),
            "-std=c++11".to_string(),
        ];
        argv.extend(FIXTURE_SOURCES.iter().map(|s| (*s).to_string()));
        argv.push(format!("-DALLOC_{}", config.alloc.name()));
        argv.push(format!("-DBASE_{}", config.layout.name()));
        argv.push(format!("-DCAST_{}", config.cast.name()));
        argv
    }

    /// Extra args as appended for the given phase: verbatim pass-through,
    /// plus [`PASSING_VARIANT_FLAG`] for the false-positive variant.
    #[must_use]
    pub fn extra_args_for(&self, passing_variant: bool) -> Vec<String> {
        let mut extra = self.extra_args.clone();
        if passing_variant {
            extra.push(PASSING_VARIANT_FLAG.to_string());
        }
        extra
    }

    /// Full argv actually executed: base argv plus extra args.
    #[must_use]
    pub fn full_argv(&self, config: &ResolvedConfiguration, passing_variant: bool) -> Vec<String> {
        let mut argv = self.base_argv(config);
        argv.extend(self.extra_args_for(passing_variant));
        argv
    }

    /// Compile the fixture sources for `config` in the fixture directory.
    ///
    /// Compiler diagnostics stream through to the operator's terminal. The
    /// compiler's exit status is deliberately not checked: a failed compile
    /// leaves the previous artifact in place and surfaces through run
    /// classification.
    pub fn compile(
        &self,
        config: &ResolvedConfiguration,
        passing_variant: bool,
    ) -> Result<(), ExecError> {
        let argv = self.full_argv(config, passing_variant);
        let _ = Command::new(&self.compiler)
            .args(&argv[1..])
            .current_dir(&self.fixture_dir)
            .status()
            .map_err(|source| ExecError::Spawn {
                command: self.compiler.display().to_string(),
                source,
            })?;
        Ok(())
    }
}

/// Run `./a.out` from the fixture directory, capturing combined
/// stdout+stderr, and map its termination into a [`ProcessOutcome`].
///
/// With a timeout, a still-running artifact is killed at the deadline and the
/// outcome carries [`Termination::TimedOut`] plus whatever output was
/// captured before the kill.
pub fn run_artifact(
    fixture_dir: &Path,
    timeout: Option<Duration>,
) -> Result<ProcessOutcome, ExecError> {
    let command_label = format!("./{ARTIFACT_NAME}");
    // Relative program paths interact with `current_dir` in a
    // platform-specific way; resolve against the fixture dir explicitly.
    let mut child = Command::new(fixture_dir.join(ARTIFACT_NAME))
        .current_dir(fixture_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ExecError::Spawn {
            command: command_label.clone(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = timeout.map(|t| Instant::now() + t);
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {}
            Err(source) => {
                return Err(ExecError::Supervise {
                    command: command_label,
                    source,
                });
            }
        }
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        std::thread::sleep(WAIT_POLL);
    };

    let mut captured = stdout.join().unwrap_or_default();
    captured.extend(stderr.join().unwrap_or_default());
    let output = String::from_utf8_lossy(&captured).into_owned();

    let termination = match status {
        Some(status) => termination_of(status),
        None => Termination::TimedOut,
    };
    Ok(ProcessOutcome {
        termination,
        output,
    })
}

/// Read a child stream to the end on a helper thread so a filled pipe cannot
/// deadlock the wait loop.
fn drain<R: std::io::Read + Send + 'static>(
    stream: Option<R>,
) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

#[cfg(unix)]
fn termination_of(status: ExitStatus) -> Termination {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => Termination::Exited(code),
        None => Termination::Signaled(status.signal().unwrap_or(0)),
    }
}

#[cfg(not(unix))]
fn termination_of(status: ExitStatus) -> Termination {
    Termination::Exited(status.code().unwrap_or(-1))
}
