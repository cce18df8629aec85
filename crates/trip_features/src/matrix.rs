//! Fixed-width numeric feature matrix handed to the trainer

use serde::Serialize;

use crate::errors::{PipelineError, Result};
use crate::spatial::SpatialFeatures;
use crate::target::log1p_label;
use crate::temporal::TemporalFeatures;
use crate::zones::ZoneFeatures;

/// Model feature columns, in matrix order
pub const FEATURE_COLUMNS: [&str; 12] = [
    "distance_km",
    "manhattan_km",
    "pickup_zone_mean",
    "dropoff_zone_mean",
    "hour_sin",
    "hour_cos",
    "weekday_sin",
    "weekday_cos",
    "bearing_sin",
    "bearing_cos",
    "passenger_count",
    "is_rush_hour",
];

/// Number of model features
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// One row of model features
pub type FeatureRow = [f64; FEATURE_COUNT];

/// Lay out a trip's derived features in [`FEATURE_COLUMNS`] order.
pub fn assemble_row(
    passenger_count: i32,
    temporal: &TemporalFeatures,
    spatial: &SpatialFeatures,
    zone: &ZoneFeatures,
) -> FeatureRow {
    [
        spatial.distance_km,
        spatial.manhattan_km,
        zone.pickup_zone_mean,
        zone.dropoff_zone_mean,
        temporal.hour_sin,
        temporal.hour_cos,
        temporal.weekday_sin,
        temporal.weekday_cos,
        spatial.bearing_sin,
        spatial.bearing_cos,
        passenger_count as f64,
        temporal.is_rush_hour,
    ]
}

/// Feature rows paired with their raw durations (seconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub rows: Vec<FeatureRow>,
    pub durations: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<FeatureRow>, durations: Vec<f64>) -> Result<Self> {
        if rows.len() != durations.len() {
            return Err(PipelineError::LengthMismatch {
                expected: rows.len(),
                actual: durations.len(),
            });
        }
        Ok(Self { rows, durations })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Training label: `ln(duration + 1)`
    pub fn log_labels(&self) -> Vec<f64> {
        self.durations.iter().map(|&d| log1p_label(d)).collect()
    }

    /// All values of a named column
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = FEATURE_COLUMNS.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}
