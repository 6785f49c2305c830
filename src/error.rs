//! Error type shared by the algebra layer and every inference pass.
//!
//! All variants describe caller misuse (mismatched shapes, out-of-range
//! symbols). A pass aborts at the first violation; nothing is retried.
//! A distribution whose entries sum to zero is *not* an error: normalising
//! it yields NaN entries, which are passed through unchanged.

use thiserror::Error;

/// Errors raised while building models or running inference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// Two operands that must agree in length do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An operation that needs a square matrix got a rectangular one.
    #[error("matrix must be square, got {rows}x{cols}")]
    NonSquare { rows: usize, cols: usize },

    /// A model row has a different length from the first row.
    #[error("row {row} has {actual} entries, expected {expected}")]
    RaggedModel {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A model with no rows (or no columns).
    #[error("model has no entries")]
    EmptyModel,

    /// An observation symbol has no column in the sensor model.
    #[error("observation {observation} at step {step} is out of range (sensor model has {symbols} symbols)")]
    ObservationOutOfRange {
        step: usize,
        observation: usize,
        symbols: usize,
    },

    /// A smoothing time index past the end of the observation sequence.
    #[error("time index {at} is out of range for {len} observations")]
    TimeIndexOutOfRange { at: usize, len: usize },

    /// A required model was never supplied to the builder.
    #[error("missing {0} model")]
    MissingModel(&'static str),

    /// A row does not sum to one within the configured tolerance.
    #[error("{model} model row {row} sums to {sum}, expected 1")]
    NotStochastic {
        model: &'static str,
        row: usize,
        sum: f64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InferenceError>;
