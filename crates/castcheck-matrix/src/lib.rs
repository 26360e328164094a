//! Combinatorial test-matrix core for type-confusion detector conformance.
//!
//! This crate is pure bookkeeping: dimension enumerations, the
//! allocation/layout compatibility relation, configuration resolution,
//! process-outcome classification, pruning memory, and the matrix-expansion
//! walk. Nothing here spawns a process, so every rule is unit-testable
//! without a compiler installed.

#![forbid(unsafe_code)]

pub mod compat;
pub mod config;
pub mod dimension;
pub mod expansion;
pub mod outcome;
pub mod pruning;

pub use config::{Configuration, ResolvedConfiguration};
pub use dimension::{AllocKind, CastKind, LayoutKind};
pub use expansion::{ConfigurationTester, expand_matrix};
pub use outcome::{
    ProcessOutcome, Termination, TestOutcome, classify_detection, classify_false_positive,
};
pub use pruning::PruningState;
