//! Error types for Ltn.

use thiserror::Error;

/// The main error type for Ltn operations.
#[derive(Debug, Error)]
pub enum LtnError {
    /// Candle tensor operation failed
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// A free-variable label was referenced but is not bound by the term
    #[error("undefined variable: {label}")]
    UndefinedVariable { label: String },

    /// Incompatible shapes (diagonal counts, batch axes, model output)
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    /// A value is outside its documented range (e.g. aggregator exponent)
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Malformed construction or misuse of the API
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Result type for Ltn operations.
pub type Result<T> = std::result::Result<T, LtnError>;
