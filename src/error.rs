//! Error types for the flowcast forecasting engine

use thiserror::Error;

/// Result type alias for flowcast operations
pub type Result<T> = std::result::Result<T, FlowcastError>;

/// Main error type for the flowcast engine
///
/// Every variant is fatal for the current run: retrying against identical
/// malformed input cannot succeed, so callers are expected to remediate
/// (supply more history, adjust `test_fraction`, fix column headers) and
/// start a fresh run.
#[derive(Error, Debug)]
pub enum FlowcastError {
    /// The historical data cannot support the requested operation at all
    /// (no rows, only future-dated rows, an empty forecast range).
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// Below the minimum total/test sample thresholds.
    #[error("Insufficient data: {observed} {what} observed, {required} required; {hint}")]
    InsufficientData {
        what: String,
        observed: usize,
        required: usize,
        hint: String,
    },

    /// Future feature columns cannot be reconciled against the training schema.
    #[error("Schema alignment error: {0}")]
    SchemaAlignment(String),

    /// A required source column is missing or ambiguous.
    #[error("Cannot resolve column '{column}' ({reason}); available columns: {available:?}")]
    ColumnResolution {
        column: String,
        reason: String,
        available: Vec<String>,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Computation error: {0}")]
    Computation(String),
}

impl From<polars::error::PolarsError> for FlowcastError {
    fn from(err: polars::error::PolarsError) -> Self {
        FlowcastError::Parse(err.to_string())
    }
}
