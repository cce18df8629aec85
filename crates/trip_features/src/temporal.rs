//! Cyclic time-of-day and day-of-week encodings
//!
//! Stateless and row-independent, so it may run before or after
//! filtering and splitting.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::f64::consts::PI;

use crate::errors::{PipelineError, Result};
use crate::record::TripRecord;

/// Hours flagged as rush hour
pub const RUSH_HOURS: [u32; 5] = [8, 9, 17, 18, 19];

const NAIVE_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only inputs resolve to midnight
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Temporal features of one trip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalFeatures {
    /// 0..=23
    pub hour: u32,
    /// 0..=6, Monday = 0
    pub weekday: u32,
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub weekday_sin: f64,
    pub weekday_cos: f64,
    /// 1.0 during rush hour, else 0.0
    pub is_rush_hour: f64,
}

impl TemporalFeatures {
    pub fn from_datetime(ts: &NaiveDateTime) -> Self {
        let hour = ts.hour();
        let weekday = ts.weekday().num_days_from_monday();
        let hour_angle = 2.0 * PI * hour as f64 / 24.0;
        let weekday_angle = 2.0 * PI * weekday as f64 / 7.0;

        Self {
            hour,
            weekday,
            hour_sin: hour_angle.sin(),
            hour_cos: hour_angle.cos(),
            weekday_sin: weekday_angle.sin(),
            weekday_cos: weekday_angle.cos(),
            is_rush_hour: if RUSH_HOURS.contains(&hour) { 1.0 } else { 0.0 },
        }
    }
}

/// Parse a pickup timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]` (space or `T` separator, optional
/// fractional seconds), slash-separated dates, bare dates (midnight) and
/// RFC 3339 with an offset, which keeps the local wall-clock time of the
/// offset.
pub fn parse_pickup_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Encode every trip's pickup time. Any unparseable timestamp is fatal.
pub fn encode_temporal(trips: &[TripRecord]) -> Result<Vec<TemporalFeatures>> {
    trips
        .iter()
        .enumerate()
        .map(|(row, trip)| {
            parse_pickup_datetime(&trip.pickup_datetime)
                .map(|ts| TemporalFeatures::from_datetime(&ts))
                .ok_or_else(|| PipelineError::InvalidTimestamp {
                    row,
                    value: trip.pickup_datetime.clone(),
                })
        })
        .collect()
}
