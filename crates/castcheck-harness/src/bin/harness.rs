//! CLI entrypoint for the castcheck conformance harness.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use castcheck_exec::CompileCommand;
use castcheck_harness::structured_log::{LogEmitter, LogLevel};
use castcheck_harness::{MatrixDriver, plan};

/// Conformance tooling for C/C++ type-confusion detectors.
#[derive(Debug, Parser)]
#[command(name = "castcheck-harness")]
#[command(about = "Conformance matrix driver for type-confusion detectors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full matrix against a detector-enabled compiler.
    ///
    /// Do not pass optimization or standard flags; they are added per
    /// compile. Failing configurations print their reproduction argv to
    /// stdout.
    Run {
        /// Compiler executable (e.g. clang++).
        compiler: PathBuf,
        /// Extra compiler args passed through verbatim to every compile
        /// (e.g. -fsanitize=hextype).
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        extra_args: Vec<String>,
        /// Directory containing the fixture sources; compiles and runs
        /// execute from here.
        #[arg(long, default_value = ".")]
        fixture_dir: PathBuf,
        /// Kill a test-program run after this many seconds; a timed-out run
        /// classifies as a clean silent exit.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Output report path (markdown); a sibling `.json` is written too.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Campaign name used in trace ids.
        #[arg(long, default_value = "typecheck")]
        campaign: String,
    },
    /// Print the upper-bound configuration plan without compiling anything.
    Plan {
        /// Output format: `plain` or `json`.
        #[arg(long, default_value = "plain")]
        format: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            compiler,
            extra_args,
            fixture_dir,
            timeout_secs,
            report,
            log,
            campaign,
        } => {
            eprintln!(
                "Testing {} with extra args {:?} in {}",
                compiler.display(),
                extra_args,
                fixture_dir.display()
            );

            let command = CompileCommand::new(compiler, extra_args, fixture_dir);
            let timeout = timeout_secs.map(Duration::from_secs);
            let run_id = format!("run-{}", std::process::id());

            let mut emitter = match &log {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    Some(LogEmitter::to_file(path, &campaign, &run_id)?)
                }
                None => None,
            };
            if let Some(emitter) = emitter.as_mut() {
                emitter.emit(LogLevel::Info, "run_started")?;
            }

            let mut driver = MatrixDriver::new(command, timeout);
            if let Some(emitter) = emitter.as_mut() {
                driver = driver.with_emitter(emitter);
            }
            let pruning = driver.run();
            let report_doc = driver.into_report(&campaign, &pruning);

            eprintln!(
                "Matrix complete: tested={}, failures={} (missed detections: {}, false positives: {})",
                report_doc.summary.configurations_tested,
                report_doc.summary.failures,
                report_doc.summary.missed_detections,
                report_doc.summary.false_positives,
            );
            if !pruning.is_empty() {
                eprintln!(
                    "Unsupported: allocs={:?}, layouts={:?}, casts={:?}",
                    report_doc.summary.unsupported_allocs,
                    report_doc.summary.unsupported_layouts,
                    report_doc.summary.unsupported_casts,
                );
            }

            if let Some(report_path) = report {
                if let Some(parent) = report_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
                eprintln!(
                    "Wrote report to {} and {}",
                    report_path.display(),
                    json_path.display()
                );
            }

            if let Some(emitter) = emitter.as_mut() {
                emitter.emit(LogLevel::Info, "run_finished")?;
                emitter.flush()?;
            }
        }
        Command::Plan { format } => {
            let planned = plan::upper_bound_plan();
            match format.to_ascii_lowercase().as_str() {
                "plain" => {
                    for config in &planned {
                        println!("{}", config.label());
                    }
                    eprintln!("{} configurations", planned.len());
                }
                "json" => {
                    let body = serde_json::to_string_pretty(&serde_json::json!({
                        "total": planned.len(),
                        "configurations": planned,
                    }))?;
                    println!("{body}");
                }
                other => {
                    return Err(format!("Unsupported format '{other}', expected plain|json").into());
                }
            }
        }
    }

    Ok(())
}
