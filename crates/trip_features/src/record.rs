//! Trip records and CSV loading

use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Columns every input batch must carry
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "pickup_latitude",
    "pickup_longitude",
    "dropoff_latitude",
    "dropoff_longitude",
    "pickup_datetime",
    "passenger_count",
    "trip_duration",
];

/// A single raw trip.
///
/// `pickup_datetime` stays textual; the temporal encoder parses it and
/// reports the offending row when it cannot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub pickup_datetime: String,
    pub passenger_count: i32,
    /// Seconds; the regression label
    pub trip_duration: f64,
}

impl TripRecord {
    /// Great-circle distance between pickup and dropoff in km
    pub fn haversine_km(&self) -> f64 {
        crate::geo::haversine_distance(
            self.pickup_latitude,
            self.pickup_longitude,
            self.dropoff_latitude,
            self.dropoff_longitude,
        )
    }
}

/// Load trips from a header-bearing CSV file.
pub fn load_trips_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TripRecord>> {
    let path = path.as_ref();
    info!("Loading trips from: {}", path.display());
    let file = std::fs::File::open(path)?;
    read_trips(file)
}

/// Read trips from any CSV source. Extra columns are ignored.
pub fn read_trips<R: Read>(reader: R) -> Result<Vec<TripRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns { missing });
    }

    let mut trips = Vec::new();
    for row in rdr.deserialize() {
        let trip: TripRecord = row?;
        trips.push(trip);
    }

    info!("Loaded {} trips", trips.len());
    Ok(trips)
}
