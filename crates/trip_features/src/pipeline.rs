//! End-to-end preparation of train and validation feature matrices
//!
//! Stage order: hygiene, stateless encoders, split, then zone target
//! encoding fitted on the training side only.

use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::deterministic::train_validation_split;
use crate::errors::{PipelineError, Result};
use crate::hygiene::clean_trips;
use crate::matrix::{assemble_row, FeatureMatrix};
use crate::record::TripRecord;
use crate::spatial::{encode_spatial, SpatialFeatures};
use crate::temporal::{encode_temporal, TemporalFeatures};
use crate::zones::ZoneEncoder;

/// A trip with its label-independent features attached
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTrip {
    pub record: TripRecord,
    pub temporal: TemporalFeatures,
    pub spatial: SpatialFeatures,
}

/// Apply the temporal and spatial encoders to every trip.
pub fn encode_stateless(trips: Vec<TripRecord>) -> Result<Vec<EncodedTrip>> {
    let temporal = encode_temporal(&trips)?;
    let spatial = encode_spatial(&trips);

    Ok(trips
        .into_iter()
        .zip(temporal)
        .zip(spatial)
        .map(|((record, temporal), spatial)| EncodedTrip {
            record,
            temporal,
            spatial,
        })
        .collect())
}

/// Attach zone features from a fitted encoder and lay out the matrix.
pub fn build_matrix(trips: &[EncodedTrip], encoder: &ZoneEncoder) -> Result<FeatureMatrix> {
    let records: Vec<TripRecord> = trips.iter().map(|t| t.record.clone()).collect();
    let zones = encoder.transform(&records);

    let rows = trips
        .iter()
        .zip(&zones)
        .map(|(t, zone)| assemble_row(t.record.passenger_count, &t.temporal, &t.spatial, zone))
        .collect();
    let durations = records.iter().map(|r| r.trip_duration).collect();

    FeatureMatrix::new(rows, durations)
}

/// Output of [`prepare_partitions`]
#[derive(Debug, Clone)]
pub struct PreparedPartitions {
    pub train: FeatureMatrix,
    pub validation: FeatureMatrix,
    /// Encoder fitted on `train`, read-only from here on
    pub zone_encoder: ZoneEncoder,
    /// Rows entering the pipeline
    pub raw_rows: usize,
    /// Rows surviving hygiene
    pub clean_rows: usize,
}

/// Run the full pipeline over a raw batch.
#[instrument(skip(trips, config), fields(rows = trips.len()))]
pub fn prepare_partitions(
    trips: &[TripRecord],
    config: &PipelineConfig,
) -> Result<PreparedPartitions> {
    config.validate()?;

    let cleaned = clean_trips(trips, &config.hygiene);
    let clean_rows = cleaned.len();
    let encoded = encode_stateless(cleaned)?;

    let split = train_validation_split(encoded, &config.split);
    if split.train.is_empty() {
        return Err(PipelineError::EmptyPartition(
            "no training rows survived hygiene filtering",
        ));
    }

    let train_records: Vec<TripRecord> = split.train.iter().map(|t| t.record.clone()).collect();
    let zone_encoder = ZoneEncoder::fit(&train_records, &config.zones)?;

    let train = build_matrix(&split.train, &zone_encoder)?;
    let validation = build_matrix(&split.validation, &zone_encoder)?;

    info!(
        "Prepared {} training and {} validation rows from {} raw trips",
        train.len(),
        validation.len(),
        trips.len()
    );

    Ok(PreparedPartitions {
        train,
        validation,
        zone_encoder,
        raw_rows: trips.len(),
        clean_rows,
    })
}
