//! Label transform and evaluation metrics
//!
//! Models train on `ln(duration + 1)`. Predictions come back through
//! `exp(x) - 1`, clipped at zero, before RMSLE is computed against the
//! untransformed durations.

use crate::errors::{PipelineError, Result};

/// Variance-stabilised training label
pub fn log1p_label(duration: f64) -> f64 {
    duration.ln_1p()
}

/// Inverse of [`log1p_label`], never negative
pub fn expm1_prediction(log_prediction: f64) -> f64 {
    log_prediction.exp_m1().max(0.0)
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(PipelineError::LengthMismatch {
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(PipelineError::EmptyPartition("metric over zero rows"));
    }
    Ok(())
}

/// Root mean squared error
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (p - a).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt())
}

/// Root mean squared log error over untransformed, non-negative values
pub fn rmsle(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (p.ln_1p() - a.ln_1p()).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt())
}
