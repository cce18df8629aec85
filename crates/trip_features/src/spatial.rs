//! Pickup-to-dropoff geometry features

use crate::geo::{bearing, haversine_distance, manhattan_distance};
use crate::record::TripRecord;

/// Spatial features of one trip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialFeatures {
    pub distance_km: f64,
    pub manhattan_km: f64,
    pub bearing_sin: f64,
    pub bearing_cos: f64,
}

impl SpatialFeatures {
    pub fn of(trip: &TripRecord) -> Self {
        let coords = (
            trip.pickup_latitude,
            trip.pickup_longitude,
            trip.dropoff_latitude,
            trip.dropoff_longitude,
        );
        let heading = bearing(coords.0, coords.1, coords.2, coords.3).to_radians();

        Self {
            distance_km: haversine_distance(coords.0, coords.1, coords.2, coords.3),
            manhattan_km: manhattan_distance(coords.0, coords.1, coords.2, coords.3),
            bearing_sin: heading.sin(),
            bearing_cos: heading.cos(),
        }
    }
}

/// Derive spatial features for every trip.
pub fn encode_spatial(trips: &[TripRecord]) -> Vec<SpatialFeatures> {
    trips.iter().map(SpatialFeatures::of).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(from: (f64, f64), to: (f64, f64)) -> TripRecord {
        TripRecord {
            pickup_latitude: from.0,
            pickup_longitude: from.1,
            dropoff_latitude: to.0,
            dropoff_longitude: to.1,
            pickup_datetime: "2016-03-14 17:24:55".to_string(),
            passenger_count: 1,
            trip_duration: 600.0,
        }
    }

    #[test]
    fn test_due_east_trip() {
        let f = SpatialFeatures::of(&trip((0.0, 0.0), (0.0, 0.1)));
        assert!((f.bearing_sin - 1.0).abs() < 1e-12);
        assert!(f.bearing_cos.abs() < 1e-12);
        // Along the equator both distances coincide.
        assert!((f.distance_km - f.manhattan_km).abs() < 1e-9);
    }

    #[test]
    fn test_due_south_trip() {
        let f = SpatialFeatures::of(&trip((40.1, -73.9), (40.0, -73.9)));
        assert!(f.bearing_sin.abs() < 1e-9);
        assert!((f.bearing_cos + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stationary_trip() {
        let f = SpatialFeatures::of(&trip((40.75, -73.98), (40.75, -73.98)));
        assert_eq!(f.distance_km, 0.0);
        assert_eq!(f.manhattan_km, 0.0);
        assert_eq!(f.bearing_sin, 0.0);
        assert_eq!(f.bearing_cos, 1.0);
    }

    #[test]
    fn test_batch_is_row_wise() {
        let trips = vec![
            trip((40.75, -73.98), (40.70, -74.01)),
            trip((40.64, -73.78), (40.75, -73.99)),
        ];
        let encoded = encode_spatial(&trips);
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[1], SpatialFeatures::of(&trips[1]));
        assert!(encoded[0].manhattan_km >= encoded[0].distance_km);
    }
}
