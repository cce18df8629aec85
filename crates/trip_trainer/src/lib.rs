//! Tripcast trainer - gradient boosted trip duration regression
//!
//! Consumes the feature matrices prepared by `tripcast-features`, fits a
//! deterministic GBDT on the log1p duration with validation-monitored
//! early stopping, and reports RMSLE on raw durations.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod evaluation;
pub mod trainer;

use tracing::info;
use tripcast_features::PreparedPartitions;

pub use config::AppConfig;
pub use dataset::Dataset;
pub use errors::{Result, TrainerError};
pub use evaluation::{evaluate, EvaluationReport};
pub use trainer::{GbdtModel, GbdtTrainer, TrainingParams};

/// Train on prepared partitions and score the validation side.
pub fn train_and_evaluate(
    prepared: &PreparedPartitions,
    params: TrainingParams,
) -> Result<(GbdtModel, EvaluationReport)> {
    let train = Dataset::from_matrix(&prepared.train);
    let validation = Dataset::from_matrix(&prepared.validation);

    let model = GbdtTrainer::new(params).train(&train, &validation)?;
    let report = evaluate(&model, train.len(), &validation)?;

    info!(
        "Validation RMSLE {:.4} with {} trees",
        report.validation_rmsle, report.trees
    );
    Ok((model, report))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
