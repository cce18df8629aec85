use thiserror::Error;
use tripcast_features::PipelineError;

/// Errors returned by the trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("empty partition: {0}")]
    EmptyPartition(&'static str),

    #[error("row count mismatch: {rows} feature rows, {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("feature width mismatch: expected {expected}, got {actual}")]
    FeatureWidthMismatch { expected: usize, actual: usize },

    #[error("invalid training parameters: {0}")]
    InvalidParams(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
