//! Driver configuration: pipeline thresholds plus boosting parameters

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use tripcast_features::PipelineConfig;

use crate::errors::{Result, TrainerError};
use crate::trainer::TrainingParams;

/// Top-level TOML layout:
///
/// ```toml
/// [pipeline.hygiene]
/// max_speed_kmph = 80.0
///
/// [pipeline.zones]
/// grid_size = 0.01
///
/// [training]
/// num_trees = 1000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub training: TrainingParams,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| TrainerError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrainerError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.training.validate()
    }
}
