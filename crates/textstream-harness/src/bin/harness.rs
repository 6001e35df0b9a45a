//! CLI entrypoint for the textstream conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use textstream_harness::render::{RenderOptions, render_values};
use textstream_harness::report::digest_files;
use textstream_harness::structured_log::{LogEmitter, LogLevel, Outcome, now_utc, validate_log_file};
use textstream_harness::{ConformanceReport, FixtureSet, TestRunner, VerificationSummary};

/// Conformance tooling for textstream.
#[derive(Debug, Parser)]
#[command(name = "textstream-harness")]
#[command(about = "Conformance testing harness for textstream")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay fixture files against owned and linked streams.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; JSON is written next to it).
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL structured log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Write values through a stream and print the committed text.
    Render {
        #[arg(long, default_value_t = 10)]
        base: u8,
        #[arg(long, default_value_t = 0)]
        width: u16,
        #[arg(long, default_value_t = 6)]
        precision: u16,
        /// Format flag names, e.g. `left`, `showpos`, `uppercase`.
        #[arg(long = "flag")]
        flags: Vec<String>,
        #[arg(long, default_value = " ")]
        separator: String,
        /// Values: integers, floats or booleans.
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Validate a JSONL structured log file.
    ValidateLog {
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            log,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let fixture_paths = textstream_harness::fixtures::fixture_paths(&fixture)?;

            let mut fixture_sets = Vec::new();
            for path in &fixture_paths {
                match FixtureSet::from_file(path) {
                    Ok(set) => fixture_sets.push(set),
                    Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
                }
            }
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let runner = TestRunner::new("fixture-verify");
            let mut emitter = match &log {
                Some(path) => Some(LogEmitter::to_file(path, &runner.campaign, "run-1")?),
                None => None,
            };

            let mut results = Vec::new();
            for set in &fixture_sets {
                let set_results = runner.run(set);
                if let Some(emitter) = emitter.as_mut() {
                    emitter.emit_results(&set.family, &set_results)?;
                }
                results.extend(set_results);
            }

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("textstream Conformance Report"),
                timestamp: now_utc(),
                fixture_digest: digest_files(&fixture_paths)?,
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );
            for name in report_doc.summary.failures() {
                eprintln!("  FAIL {name}");
            }

            if let Some(mut emitter) = emitter {
                let outcome = if report_doc.summary.all_passed() {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                };
                let done = emitter
                    .entry(LogLevel::Info, "run_complete")
                    .with_outcome(outcome)
                    .with_details(serde_json::json!({
                        "total": report_doc.summary.total,
                        "passed": report_doc.summary.passed,
                        "failed": report_doc.summary.failed,
                        "fixture_digest": report_doc.fixture_digest,
                    }));
                emitter.emit(&done)?;
                emitter.flush()?;
            }

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::Render {
            base,
            width,
            precision,
            flags,
            separator,
            values,
        } => {
            let options = RenderOptions {
                base,
                width,
                precision,
                flags: textstream_harness::fixtures::parse_flags(&flags)?,
                separator,
            };
            println!("{}", render_values(&options, &values)?);
        }
        Command::ValidateLog { path } => {
            let (lines, errors) = validate_log_file(&path)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!(
                "Validated {} lines in {}: {} errors",
                lines,
                path.display(),
                errors.len()
            );
            if !errors.is_empty() {
                return Err("Structured log validation failed".into());
            }
        }
    }

    Ok(())
}
