//! Error types for annotation enumeration, LP construction and solving.

use thiserror::Error;

/// Errors that can occur while searching for alternation-trading lower-bound proofs.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed user input, e.g. an odd proof length where an even one is required,
    /// or a nonpositive search starting exponent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An annotation violated one of its structural invariants: wrong starting/ending
    /// step, a running quantifier count that goes negative or returns to zero early, or an
    /// out-of-place `SPEEDUP3` step. Indicates a bug in the enumerator.
    #[error("invalid annotation: {0}")]
    InvalidAnnotation(String),
    /// The LP solver backend returned an unclassifiable status or failed outright.
    #[error("solver error: {0}")]
    SolverError(String),
}

/// Convenience alias for results of this crate.
pub type Result<T> = std::result::Result<T, Error>;
