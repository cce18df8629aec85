//! Pipeline configuration
//!
//! Thresholds and grid sizes are passed explicitly into each stage so
//! tests can run with alternate values without touching global state.

use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Outlier filter thresholds
    pub hygiene: HygieneConfig,
    /// Zone grid for target encoding
    pub zones: ZoneConfig,
    /// Train/validation split
    pub split: SplitConfig,
}

/// Data hygiene thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HygieneConfig {
    /// Trips at or beyond this great-circle distance are dropped
    pub max_dist_km: f64,
    /// Inclusive lower speed bound
    pub min_speed_kmph: f64,
    /// Inclusive upper speed bound
    pub max_speed_kmph: f64,
    /// Inclusive upper passenger bound (lower bound is always > 0)
    pub max_passengers: i32,
    /// "Short but slow" rule: trips longer than this...
    pub slow_trip_min_dist_km: f64,
    /// ...and slower than this are treated as GPS or traffic noise
    pub slow_trip_max_speed_kmph: f64,
}

impl Default for HygieneConfig {
    fn default() -> Self {
        Self {
            max_dist_km: 100.0,
            min_speed_kmph: 1.0,
            max_speed_kmph: 80.0,
            max_passengers: 6,
            slow_trip_min_dist_km: 2.0,
            slow_trip_max_speed_kmph: 2.0,
        }
    }
}

/// Uniform coordinate grid used to derive zone keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Cell edge in degrees (0.01 is roughly 1 km)
    pub grid_size: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self { grid_size: 0.01 }
    }
}

/// Seeded train/validation split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of rows routed to validation, in (0, 1)
    pub validation_fraction: f64,
    /// Shuffle seed
    pub seed: i64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            validation_fraction: 0.2,
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)
            .map_err(|e| PipelineError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading pipeline configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        let h = &self.hygiene;
        if !(h.max_dist_km > 0.0) {
            return Err(PipelineError::Config(
                "hygiene.max_dist_km must be positive".to_string(),
            ));
        }
        if h.min_speed_kmph > h.max_speed_kmph {
            return Err(PipelineError::Config(format!(
                "hygiene.min_speed_kmph ({}) exceeds max_speed_kmph ({})",
                h.min_speed_kmph, h.max_speed_kmph
            )));
        }
        if h.max_passengers < 1 {
            return Err(PipelineError::Config(
                "hygiene.max_passengers must be at least 1".to_string(),
            ));
        }
        if !(self.zones.grid_size > 0.0) || !self.zones.grid_size.is_finite() {
            return Err(PipelineError::Config(
                "zones.grid_size must be a positive finite number".to_string(),
            ));
        }
        let f = self.split.validation_fraction;
        if !(f > 0.0 && f < 1.0) {
            return Err(PipelineError::Config(format!(
                "split.validation_fraction must be in (0, 1), got {}",
                f
            )));
        }
        Ok(())
    }
}
