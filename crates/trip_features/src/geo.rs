//! Great-circle geometry over latitude/longitude pairs
//!
//! Inputs are degrees. Scalar functions are the primitives; the `_batch`
//! variants apply them element-wise over equal-length columns.

use crate::errors::{PipelineError, Result};

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Axis-decomposed distance: a pure-latitude leg plus a pure-longitude leg.
///
/// Both legs start at point 1, so the longitude leg is measured along the
/// pickup parallel. Approximates street-grid travel.
pub fn manhattan_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat_leg = haversine_distance(lat1, lon1, lat2, lon1);
    let lon_leg = haversine_distance(lat1, lon1, lat1, lon2);
    lat_leg + lon_leg
}

/// Initial compass bearing from point 1 to point 2, in `[0, 360)` degrees.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let x = dlambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    let degrees = (x.atan2(y).to_degrees() + 360.0) % 360.0;
    // (-tiny + 360) rounds to exactly 360.0
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

fn check_lengths(lat1: &[f64], lon1: &[f64], lat2: &[f64], lon2: &[f64]) -> Result<()> {
    let expected = lat1.len();
    for actual in [lon1.len(), lat2.len(), lon2.len()] {
        if actual != expected {
            return Err(PipelineError::LengthMismatch { expected, actual });
        }
    }
    Ok(())
}

fn apply_batch(
    lat1: &[f64],
    lon1: &[f64],
    lat2: &[f64],
    lon2: &[f64],
    f: fn(f64, f64, f64, f64) -> f64,
) -> Result<Vec<f64>> {
    check_lengths(lat1, lon1, lat2, lon2)?;
    Ok((0..lat1.len())
        .map(|i| f(lat1[i], lon1[i], lat2[i], lon2[i]))
        .collect())
}

/// Element-wise [`haversine_distance`].
pub fn haversine_distance_batch(
    lat1: &[f64],
    lon1: &[f64],
    lat2: &[f64],
    lon2: &[f64],
) -> Result<Vec<f64>> {
    apply_batch(lat1, lon1, lat2, lon2, haversine_distance)
}

/// Element-wise [`manhattan_distance`].
pub fn manhattan_distance_batch(
    lat1: &[f64],
    lon1: &[f64],
    lat2: &[f64],
    lon2: &[f64],
) -> Result<Vec<f64>> {
    apply_batch(lat1, lon1, lat2, lon2, manhattan_distance)
}

/// Element-wise [`bearing`].
pub fn bearing_batch(lat1: &[f64], lon1: &[f64], lat2: &[f64], lon2: &[f64]) -> Result<Vec<f64>> {
    apply_batch(lat1, lon1, lat2, lon2, bearing)
}
