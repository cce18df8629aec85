//! Training partitions in trainer layout
//!
//! Wraps a pipeline feature matrix with the log-transformed label the
//! booster fits against.

use tripcast_features::{FeatureMatrix, FEATURE_COLUMNS};

use crate::errors::{Result, TrainerError};

/// Feature rows with log1p labels and raw durations
#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    /// `ln(duration + 1)`
    pub targets: Vec<f64>,
    /// Untransformed durations in seconds
    pub durations: Vec<f64>,
    pub feature_count: usize,
}

impl Dataset {
    /// Build from a pipeline feature matrix.
    pub fn from_matrix(matrix: &FeatureMatrix) -> Self {
        Self {
            features: matrix.rows.iter().map(|row| row.to_vec()).collect(),
            targets: matrix.log_labels(),
            durations: matrix.durations.clone(),
            feature_count: FEATURE_COLUMNS.len(),
        }
    }

    /// Build from raw rows and durations, checking that every row has
    /// the same width.
    pub fn from_rows(features: Vec<Vec<f64>>, durations: Vec<f64>) -> Result<Self> {
        if features.len() != durations.len() {
            return Err(TrainerError::LengthMismatch {
                rows: features.len(),
                labels: durations.len(),
            });
        }
        let feature_count = features.first().map_or(0, |row| row.len());
        if let Some(row) = features.iter().find(|row| row.len() != feature_count) {
            return Err(TrainerError::FeatureWidthMismatch {
                expected: feature_count,
                actual: row.len(),
            });
        }

        let targets = durations.iter().map(|&d| d.ln_1p()).collect();
        Ok(Self {
            features,
            targets,
            durations,
            feature_count,
        })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Per-feature (min, max) for logging
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); self.feature_count];

        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}
