//! # Error Taxonomy
//!
//! Per-action failures are recovered at the executor boundary and turned
//! into data; only `LoopDetected` escalates to a session-level halt.

use thiserror::Error;

/// A malformed or incomplete action. Reported before any execution;
/// the action never runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown action type: {0}")]
    UnknownType(String),
    #[error("No {0} provided")]
    MissingField(&'static str),
}

/// Path resolution failure. Aborts the single action, session continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Path '{0}' escapes the project root")]
    OutOfScope(String),
    #[error("Malformed path '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

/// Any failure during a type-specific operation. Always converted to a
/// failed `ActionResult` by the executor; never propagated as a fault.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    External(String),
}

/// Session-level condition: the model is stuck proposing near-duplicates.
/// Halts further automatic acceptance; requires user intervention.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Loop detected: {window} similar proposals in a row (threshold {threshold})")]
pub struct LoopDetected {
    pub window: usize,
    pub threshold: f64,
}
