//! Conformance matrix harness for C/C++ type-confusion detectors.
//!
//! This crate provides:
//! - Matrix driving: compile + run + classify every viable configuration
//! - Two-phase protocol: must-detect and must-not-false-positive per point
//! - Failure reporting: reproduction argv on stdout, markdown/JSON reports
//! - Structured logging: JSONL records with artifact integrity hashes

#![forbid(unsafe_code)]

pub mod driver;
pub mod plan;
pub mod report;
pub mod structured_log;

pub use driver::MatrixDriver;
pub use report::{FailureRecord, MatrixReport, MatrixSummary, Phase};
