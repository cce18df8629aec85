//! Tripcast feature pipeline
//!
//! Turns raw taxi trip records into a fixed-width feature matrix for trip
//! duration regression, keeping the train/validation boundary leak-free.
//!
//! Modules:
//! - `geo`: haversine, axis-decomposed distance and bearing
//! - `hygiene`: distance/speed/passenger outlier filter
//! - `temporal`: cyclic hour and weekday encodings, rush-hour flag
//! - `spatial`: pickup-to-dropoff distance and heading features
//! - `zones`: grid-cell mean-duration target encoding (fit on train only)
//! - `pipeline`: stage orchestration and partition preparation
//! - `target`: log1p label transform and RMSLE

pub mod config;
pub mod deterministic;
pub mod errors;
pub mod geo;
pub mod hygiene;
pub mod matrix;
pub mod pipeline;
pub mod record;
pub mod spatial;
pub mod target;
pub mod temporal;
pub mod zones;

pub use config::{HygieneConfig, PipelineConfig, SplitConfig, ZoneConfig};
pub use deterministic::{train_validation_split, LcgRng, Split};
pub use errors::{PipelineError, Result};
pub use geo::{bearing, haversine_distance, manhattan_distance};
pub use hygiene::{clean_trips, TripKinematics};
pub use matrix::{FeatureMatrix, FeatureRow, FEATURE_COLUMNS, FEATURE_COUNT};
pub use pipeline::{prepare_partitions, EncodedTrip, PreparedPartitions};
pub use record::{load_trips_csv, read_trips, TripRecord, REQUIRED_COLUMNS};
pub use spatial::SpatialFeatures;
pub use target::{expm1_prediction, log1p_label, rmse, rmsle};
pub use temporal::TemporalFeatures;
pub use zones::{ZoneEncoder, ZoneFeatures, ZoneKey};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
