//! Validation scoring in seconds, after undoing the log label

use serde::{Deserialize, Serialize};
use tripcast_features::{expm1_prediction, rmse, rmsle};

use crate::dataset::Dataset;
use crate::errors::{Result, TrainerError};
use crate::trainer::GbdtModel;

/// Summary of a train/validation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub train_rows: usize,
    pub validation_rows: usize,
    pub trees: usize,
    pub best_iteration: usize,
    /// RMSE against `ln(duration + 1)`
    pub validation_rmse_log: f64,
    /// RMSLE against raw durations after expm1 and clipping
    pub validation_rmsle: f64,
}

/// Score `model` on `validation`.
///
/// Predictions are inverse-transformed with expm1 and clipped at zero
/// before RMSLE is taken against the untransformed durations.
pub fn evaluate(
    model: &GbdtModel,
    train_rows: usize,
    validation: &Dataset,
) -> Result<EvaluationReport> {
    if validation.is_empty() {
        return Err(TrainerError::EmptyPartition("nothing to evaluate"));
    }

    let log_preds = model.predict_batch(&validation.features);
    let durations: Vec<f64> = log_preds.iter().map(|&p| expm1_prediction(p)).collect();

    Ok(EvaluationReport {
        train_rows,
        validation_rows: validation.len(),
        trees: model.trees.len(),
        best_iteration: model.best_iteration,
        validation_rmse_log: rmse(&validation.targets, &log_preds)?,
        validation_rmsle: rmsle(&validation.durations, &durations)?,
    })
}
