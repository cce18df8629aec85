//! Error types for the feature pipeline

use thiserror::Error;

/// Errors raised while loading or transforming trip batches.
///
/// Rows rejected by the hygiene filter and unseen zones are not errors;
/// only malformed input and degenerate partitions surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV row could not be decoded into a trip record
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required input columns are absent from the header
    #[error("Missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Pickup timestamp could not be parsed
    #[error("Row {row}: unparseable pickup timestamp {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    /// Batch columns of unequal length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// An operation that needs at least one row received none
    #[error("Empty partition: {0}")]
    EmptyPartition(&'static str),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
