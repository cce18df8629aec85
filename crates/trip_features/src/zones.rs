//! Spatial target encoding over a uniform coordinate grid
//!
//! Each pickup and dropoff point falls into a grid cell. The encoder is
//! fitted once on the training partition, recording the mean trip
//! duration per cell, and is then applied read-only to any partition.
//! Cells never seen during fitting resolve to the global training mean.
//!
//! Fitting only ever reads training labels. Validation rows pass through
//! [`ZoneEncoder::transform`], which borrows the encoder immutably, so
//! their labels cannot reach the maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::config::ZoneConfig;
use crate::errors::{PipelineError, Result};
use crate::record::TripRecord;

/// Grid cell containing a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneKey {
    pub lon_cell: i64,
    pub lat_cell: i64,
}

impl ZoneKey {
    /// Cell indices are `floor(coord / grid_size)`, not float floor
    /// division: on exact boundaries the latter can land one cell lower
    /// (`40.75` at grid `0.01` is cell 4075 here, 4074 under floor division).
    pub fn from_coords(lat: f64, lon: f64, grid_size: f64) -> Self {
        Self {
            lon_cell: (lon / grid_size).floor() as i64,
            lat_cell: (lat / grid_size).floor() as i64,
        }
    }

    pub fn pickup(trip: &TripRecord, grid_size: f64) -> Self {
        Self::from_coords(trip.pickup_latitude, trip.pickup_longitude, grid_size)
    }

    pub fn dropoff(trip: &TripRecord, grid_size: f64) -> Self {
        Self::from_coords(trip.dropoff_latitude, trip.dropoff_longitude, grid_size)
    }
}

/// Running sum and count for one cell
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

fn mean_by_zone<F>(trips: &[TripRecord], key_of: F) -> BTreeMap<ZoneKey, f64>
where
    F: Fn(&TripRecord) -> ZoneKey,
{
    let mut acc: BTreeMap<ZoneKey, MeanAccumulator> = BTreeMap::new();
    for trip in trips {
        acc.entry(key_of(trip)).or_default().push(trip.trip_duration);
    }
    acc.into_iter().map(|(key, a)| (key, a.mean())).collect()
}

/// Target-encoded zone features of one trip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneFeatures {
    pub pickup_zone_mean: f64,
    pub dropoff_zone_mean: f64,
}

/// Fitted zone mean-duration maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEncoder {
    grid_size: f64,
    pickup_means: BTreeMap<ZoneKey, f64>,
    dropoff_means: BTreeMap<ZoneKey, f64>,
    global_mean: f64,
}

impl ZoneEncoder {
    /// Fit on the training partition. An empty partition has no mean to
    /// fall back on and is rejected.
    #[instrument(skip(train, config), fields(rows = train.len()))]
    pub fn fit(train: &[TripRecord], config: &ZoneConfig) -> Result<Self> {
        if train.is_empty() {
            return Err(PipelineError::EmptyPartition(
                "cannot fit zone encoder on an empty training partition",
            ));
        }
        let grid = config.grid_size;

        let pickup_means = mean_by_zone(train, |t| ZoneKey::pickup(t, grid));
        let dropoff_means = mean_by_zone(train, |t| ZoneKey::dropoff(t, grid));
        let global_mean =
            train.iter().map(|t| t.trip_duration).sum::<f64>() / train.len() as f64;

        info!(
            "Zone encoder fitted: {} pickup zones, {} dropoff zones, global mean {:.2}s",
            pickup_means.len(),
            dropoff_means.len(),
            global_mean
        );

        Ok(Self {
            grid_size: grid,
            pickup_means,
            dropoff_means,
            global_mean,
        })
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Mean duration over the whole training partition
    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn pickup_zone_count(&self) -> usize {
        self.pickup_means.len()
    }

    pub fn dropoff_zone_count(&self) -> usize {
        self.dropoff_means.len()
    }

    /// Fitted pickup mean, or `None` when the cell was unseen
    pub fn pickup_mean(&self, key: &ZoneKey) -> Option<f64> {
        self.pickup_means.get(key).copied()
    }

    /// Fitted dropoff mean, or `None` when the cell was unseen
    pub fn dropoff_mean(&self, key: &ZoneKey) -> Option<f64> {
        self.dropoff_means.get(key).copied()
    }

    /// Encode one trip, substituting the global mean for unseen cells.
    pub fn encode(&self, trip: &TripRecord) -> ZoneFeatures {
        let (features, _) = self.encode_counting_fallbacks(trip);
        features
    }

    /// Encode a trip and report how many of its two lookups fell back.
    fn encode_counting_fallbacks(&self, trip: &TripRecord) -> (ZoneFeatures, usize) {
        let pickup = self.pickup_mean(&ZoneKey::pickup(trip, self.grid_size));
        let dropoff = self.dropoff_mean(&ZoneKey::dropoff(trip, self.grid_size));
        let fallbacks = usize::from(pickup.is_none()) + usize::from(dropoff.is_none());

        let features = ZoneFeatures {
            pickup_zone_mean: pickup.unwrap_or(self.global_mean),
            dropoff_zone_mean: dropoff.unwrap_or(self.global_mean),
        };
        (features, fallbacks)
    }

    /// Encode a partition without modifying the fitted maps.
    #[instrument(skip(self, trips), fields(rows = trips.len()))]
    pub fn transform(&self, trips: &[TripRecord]) -> Vec<ZoneFeatures> {
        let mut fallbacks = 0usize;
        let encoded = trips
            .iter()
            .map(|trip| {
                let (features, missed) = self.encode_counting_fallbacks(trip);
                fallbacks += missed;
                features
            })
            .collect();

        debug!("{} zone lookups fell back to the global mean", fallbacks);
        encoded
    }
}
