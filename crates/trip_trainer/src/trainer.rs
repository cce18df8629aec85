//! Gradient Boosted Decision Tree (GBDT) trainer
//!
//! Squared-error boosting on the log1p label with row and feature
//! subsampling, validation-monitored early stopping, and seeded
//! randomness so a given configuration always produces the same model.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tripcast_features::{rmse, LcgRng};

use crate::cart::{CartBuilder, Tree, TreeConfig};
use crate::dataset::Dataset;
use crate::errors::{Result, TrainerError};

/// Smallest validation RMSE drop that counts as an improvement
const MIN_IMPROVEMENT: f64 = 1e-12;

/// GBDT training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Upper bound on boosting rounds
    pub num_trees: usize,
    pub learning_rate: f64,
    /// Depth 6 caps a tree at 64 leaves
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Fraction of rows sampled per tree
    pub subsample: f64,
    /// Fraction of features sampled per tree
    pub colsample: f64,
    pub seed: i64,
    /// Stop after this many rounds without validation improvement
    pub early_stopping_rounds: usize,
    /// Log validation RMSE every this many rounds (0 disables)
    pub log_period: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            num_trees: 1000,
            learning_rate: 0.05,
            max_depth: 6,
            min_samples_leaf: 20,
            subsample: 0.8,
            colsample: 0.8,
            seed: 42,
            early_stopping_rounds: 10,
            log_period: 100,
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(TrainerError::InvalidParams("num_trees must be positive".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(TrainerError::InvalidParams(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        for (name, value) in [("subsample", self.subsample), ("colsample", self.colsample)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(TrainerError::InvalidParams(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.early_stopping_rounds == 0 {
            return Err(TrainerError::InvalidParams(
                "early_stopping_rounds must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Boosted ensemble predicting `ln(duration + 1)`
#[derive(Debug, Clone, PartialEq)]
pub struct GbdtModel {
    /// Mean training label; the prediction before any tree
    pub bias: f64,
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
    pub feature_count: usize,
    /// Rounds kept after early stopping
    pub best_iteration: usize,
    /// Validation RMSE (log scale) at `best_iteration`
    pub best_score: f64,
}

impl GbdtModel {
    /// Predict the log label for one row
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.bias
            + self
                .trees
                .iter()
                .map(|tree| self.learning_rate * tree.predict(features))
                .sum::<f64>()
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}

/// GBDT trainer
pub struct GbdtTrainer {
    params: TrainingParams,
}

impl GbdtTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Fit on `train`, monitoring `validation` for early stopping.
    pub fn train(&self, train: &Dataset, validation: &Dataset) -> Result<GbdtModel> {
        self.params.validate()?;
        if train.is_empty() {
            return Err(TrainerError::EmptyPartition("training set has no rows"));
        }
        if validation.is_empty() {
            return Err(TrainerError::EmptyPartition("validation set has no rows"));
        }
        if validation.feature_count != train.feature_count {
            return Err(TrainerError::FeatureWidthMismatch {
                expected: train.feature_count,
                actual: validation.feature_count,
            });
        }

        let bias = train.targets.iter().sum::<f64>() / train.len() as f64;
        let mut train_preds = vec![bias; train.len()];
        let mut val_preds = vec![bias; validation.len()];

        let mut best_score = rmse(&validation.targets, &val_preds)?;
        let mut best_iteration = 0usize;
        let mut trees = Vec::with_capacity(self.params.num_trees);
        let mut rng = LcgRng::new(self.params.seed);

        let tree_config = TreeConfig {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
        };

        info!(
            "Boosting up to {} trees on {} rows ({} validation), initial RMSE {:.5}",
            self.params.num_trees,
            train.len(),
            validation.len(),
            best_score
        );

        for round in 1..=self.params.num_trees {
            let gradients = Self::calculate_gradients(&train.targets, &train_preds);
            let rows = self.sample_rows(train.len(), &mut rng);
            let features = self.sample_features(train.feature_count, &mut rng);

            let builder =
                CartBuilder::new(&train.features, &gradients, features, tree_config.clone());
            let tree = builder.build(&rows);

            self.update_predictions(&tree, &train.features, &mut train_preds);
            self.update_predictions(&tree, &validation.features, &mut val_preds);
            trees.push(tree);

            let score = rmse(&validation.targets, &val_preds)?;
            debug!("round {}: validation rmse {:.6}", round, score);
            if self.params.log_period > 0 && round % self.params.log_period == 0 {
                info!("[{}] valid rmse: {:.6}", round, score);
            }

            if score < best_score - MIN_IMPROVEMENT {
                best_score = score;
                best_iteration = round;
            } else if round - best_iteration >= self.params.early_stopping_rounds {
                info!(
                    "Early stopping at round {}; best round {} (rmse {:.6})",
                    round, best_iteration, best_score
                );
                break;
            }
        }

        trees.truncate(best_iteration);

        Ok(GbdtModel {
            bias,
            learning_rate: self.params.learning_rate,
            trees,
            feature_count: train.feature_count,
            best_iteration,
            best_score,
        })
    }

    /// Squared-error gradient: prediction - target
    fn calculate_gradients(targets: &[f64], predictions: &[f64]) -> Vec<f64> {
        predictions.iter().zip(targets).map(|(p, t)| p - t).collect()
    }

    /// Bernoulli row sample; falls back to every row if the draw is empty
    fn sample_rows(&self, n: usize, rng: &mut LcgRng) -> Vec<usize> {
        if self.params.subsample >= 1.0 {
            return (0..n).collect();
        }
        let rows: Vec<usize> = (0..n)
            .filter(|_| rng.next_unit() < self.params.subsample)
            .collect();
        if rows.is_empty() {
            (0..n).collect()
        } else {
            rows
        }
    }

    /// At least one feature, sorted for stable split search order
    fn sample_features(&self, feature_count: usize, rng: &mut LcgRng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..feature_count).collect();
        if self.params.colsample >= 1.0 {
            return features;
        }
        let keep = ((feature_count as f64 * self.params.colsample).ceil() as usize)
            .clamp(1, feature_count.max(1));
        rng.shuffle(&mut features);
        features.truncate(keep);
        features.sort_unstable();
        features
    }

    fn update_predictions(&self, tree: &Tree, features: &[Vec<f64>], predictions: &mut [f64]) {
        for (pred, row) in predictions.iter_mut().zip(features) {
            *pred += self.params.learning_rate * tree.predict(row);
        }
    }
}
