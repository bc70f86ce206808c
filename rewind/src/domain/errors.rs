//! Structured error types for rewind
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Failures reported by the trace engine.
///
/// Not-found outcomes are *not* errors anywhere in this crate (point searches
/// return `Option`, range queries return empty vectors); these variants cover
/// genuine faults such as a restore against a cleared trace store.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("trace store is empty")]
    EmptyTrace,

    #[error("trace index {index} out of range (trace length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("state restore failed at index {index}: {reason}")]
    RestoreFailed { index: usize, reason: String },
}

/// Failures loading or validating a recorded trace file.
#[derive(Error, Debug)]
pub enum TraceFileError {
    #[error("failed to read trace file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed trace file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("trace file contains no steps")]
    Empty,

    #[error("step {step} has {got} register values, expected {expected}")]
    RegisterCountMismatch {
        step: usize,
        got: usize,
        expected: usize,
    },
}
