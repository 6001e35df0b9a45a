//! Conformance testing harness for textstream.
//!
//! This crate provides:
//! - Fixtures: JSON descriptions of stream operation sequences and the text
//!   they must commit
//! - Runner: replays fixtures against owned and linked streams
//! - Verify/report: per-case results, summaries, markdown + JSON reports
//! - Structured logs: JSONL records per verified case, plus a validator
//! - Render: one-shot formatting of values under a given stream state

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod render;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet, Op};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
