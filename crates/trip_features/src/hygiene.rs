//! Outlier filtering for raw trips
//!
//! Drops physically implausible rows using derived distance and speed.
//! Rejection is silent: out-of-range input never raises an error, and an
//! empty result is a valid outcome.

use crate::config::HygieneConfig;
use crate::record::TripRecord;
use tracing::{debug, info, instrument};

/// Distance and speed derived from a trip for filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripKinematics {
    pub dist_km: f64,
    pub speed_kmph: f64,
}

impl TripKinematics {
    /// Derive kinematics from a record.
    ///
    /// A zero duration substitutes a one-hour divisor, so the speed equals
    /// the distance itself. This mirrors the historical behaviour and is a
    /// heuristic, not a physical truth.
    pub fn of(trip: &TripRecord) -> Self {
        let dist_km = trip.haversine_km();
        let duration_hr = trip.trip_duration / 3600.0;
        let divisor = if duration_hr == 0.0 { 1.0 } else { duration_hr };
        Self {
            dist_km,
            speed_kmph: dist_km / divisor,
        }
    }
}

/// Retention predicate: every bound must hold for a row to survive.
pub fn is_plausible(kin: TripKinematics, passenger_count: i32, config: &HygieneConfig) -> bool {
    let within_bounds = kin.dist_km < config.max_dist_km
        && kin.speed_kmph >= config.min_speed_kmph
        && kin.speed_kmph <= config.max_speed_kmph
        && passenger_count > 0
        && passenger_count <= config.max_passengers;

    // Short but slow: crawling traffic or GPS drift
    let crawling = kin.dist_km > config.slow_trip_min_dist_km
        && kin.speed_kmph < config.slow_trip_max_speed_kmph;

    within_bounds && !crawling
}

/// Keep plausible trips, preserving the relative order of survivors.
#[instrument(skip(trips, config), fields(rows = trips.len()))]
pub fn clean_trips(trips: &[TripRecord], config: &HygieneConfig) -> Vec<TripRecord> {
    let kept: Vec<TripRecord> = trips
        .iter()
        .filter(|trip| {
            let kin = TripKinematics::of(trip);
            let keep = is_plausible(kin, trip.passenger_count, config);
            if !keep {
                debug!(
                    dist_km = kin.dist_km,
                    speed_kmph = kin.speed_kmph,
                    passengers = trip.passenger_count,
                    "dropping implausible trip"
                );
            }
            keep
        })
        .cloned()
        .collect();

    info!(
        "Hygiene kept {} of {} trips ({} dropped)",
        kept.len(),
        trips.len(),
        trips.len() - kept.len()
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kin(dist_km: f64, speed_kmph: f64) -> TripKinematics {
        TripKinematics {
            dist_km,
            speed_kmph,
        }
    }

    /// A trip heading due north from the equator covering `dist_km`.
    fn northbound_trip(dist_km: f64, duration_s: f64, passengers: i32) -> TripRecord {
        let dlat = dist_km / crate::geo::haversine_distance(0.0, 0.0, 1.0, 0.0);
        TripRecord {
            pickup_latitude: 0.0,
            pickup_longitude: 0.0,
            dropoff_latitude: dlat,
            dropoff_longitude: 0.0,
            pickup_datetime: "2016-03-14 17:24:55".to_string(),
            passenger_count: passengers,
            trip_duration: duration_s,
        }
    }

    #[test]
    fn test_long_trip_always_dropped() {
        let config = HygieneConfig::default();
        for speed in [1.0, 30.0, 80.0] {
            for passengers in 1..=6 {
                assert!(!is_plausible(kin(150.0, speed), passengers, &config));
            }
        }
    }

    #[test]
    fn test_ordinary_trip_retained() {
        assert!(is_plausible(kin(5.0, 50.0), 2, &HygieneConfig::default()));
    }

    #[test]
    fn test_short_but_slow_rule() {
        let config = HygieneConfig::default();
        // Speed lower bound alone would accept this row.
        assert!(kin(3.0, 1.0).speed_kmph >= config.min_speed_kmph);
        assert!(!is_plausible(kin(3.0, 1.0), 1, &config));
        // Under 2 km the same crawl is tolerated.
        assert!(is_plausible(kin(1.5, 1.0), 1, &config));
    }

    #[test]
    fn test_passenger_bounds() {
        let config = HygieneConfig::default();
        assert!(!is_plausible(kin(5.0, 30.0), 0, &config));
        assert!(!is_plausible(kin(5.0, 30.0), 7, &config));
        assert!(!is_plausible(kin(5.0, 30.0), -1, &config));
        assert!(is_plausible(kin(5.0, 30.0), 6, &config));
    }

    #[test]
    fn test_speed_bounds_are_inclusive() {
        let config = HygieneConfig::default();
        assert!(is_plausible(kin(1.0, 1.0), 1, &config));
        assert!(is_plausible(kin(10.0, 80.0), 1, &config));
        assert!(!is_plausible(kin(10.0, 80.5), 1, &config));
        assert!(!is_plausible(kin(0.5, 0.9), 1, &config));
    }

    #[test]
    fn test_zero_duration_uses_distance_as_speed() {
        let trip = northbound_trip(5.0, 0.0, 1);
        let k = TripKinematics::of(&trip);
        assert!((k.speed_kmph - k.dist_km).abs() < 1e-12);
        assert!((k.dist_km - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_from_duration() {
        // 10 km in 15 minutes
        let k = TripKinematics::of(&northbound_trip(10.0, 900.0, 1));
        assert!((k.speed_kmph - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_clean_preserves_order_of_survivors() {
        let trips = vec![
            northbound_trip(5.0, 600.0, 1),   // 30 km/h, kept
            northbound_trip(150.0, 7200.0, 1), // too far
            northbound_trip(3.0, 900.0, 4),   // 12 km/h, kept
            northbound_trip(3.0, 10_800.0, 1), // 1 km/h over 3 km, crawling
            northbound_trip(2.0, 300.0, 0),   // no passengers
            northbound_trip(8.0, 1200.0, 6),  // 24 km/h, kept
        ];
        let kept = clean_trips(&trips, &HygieneConfig::default());

        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0], trips[0]);
        assert_eq!(kept[1], trips[2]);
        assert_eq!(kept[2], trips[5]);
    }

    #[test]
    fn test_alternate_thresholds() {
        let strict = HygieneConfig {
            max_speed_kmph: 20.0,
            ..HygieneConfig::default()
        };
        let trips = vec![northbound_trip(5.0, 600.0, 1)]; // 30 km/h
        assert!(clean_trips(&trips, &strict).is_empty());
        assert_eq!(clean_trips(&trips, &HygieneConfig::default()).len(), 1);
    }

    #[test]
    fn test_empty_input_is_valid() {
        assert!(clean_trips(&[], &HygieneConfig::default()).is_empty());
    }
}
