//! End-to-end check of the feature pipeline against hand-computed values

use anyhow::Result;
use tripcast_features::pipeline::{build_matrix, encode_stateless};
use tripcast_features::{
    clean_trips, read_trips, FeatureRow, HygieneConfig, ZoneConfig, ZoneEncoder, FEATURE_COLUMNS,
};

const TOLERANCE: f64 = 1e-6;

const FIXTURE_CSV: &str = "\
id,pickup_datetime,passenger_count,pickup_longitude,pickup_latitude,dropoff_longitude,dropoff_latitude,trip_duration
a,2016-03-14 17:24:55,1,-73.982155,40.767937,-73.964630,40.765602,455
b,2016-06-12 00:43:35,1,-73.980415,40.738564,-73.999481,40.731152,663
";

/// Row A: Monday 17:xx (rush hour), heading slightly south of east.
const EXPECTED_A: FeatureRow = [
    1.4985518720657471,
    1.7355019932365774,
    455.0,
    455.0,
    -0.9659258262890683,
    -0.25881904510252063,
    0.0,
    1.0,
    0.9848932940975906,
    -0.1731623493765222,
    1.0,
    1.0,
];

/// Row B: Sunday 00:xx, heading south-west.
const EXPECTED_B: FeatureRow = [
    1.8055200778444929,
    2.4305229192730464,
    663.0,
    663.0,
    0.0,
    1.0,
    -0.7818314824680299,
    0.6234898018587334,
    -0.8897852239745921,
    -0.4563795078621353,
    1.0,
    0.0,
];

fn assert_row_close(actual: &FeatureRow, expected: &FeatureRow) {
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < TOLERANCE,
            "column {} ({}): got {}, expected {}",
            i,
            FEATURE_COLUMNS[i],
            a,
            e
        );
    }
}

#[test]
fn test_two_row_fixture_matches_hand_computed_features() -> Result<()> {
    let trips = read_trips(FIXTURE_CSV.as_bytes())?;
    let cleaned = clean_trips(&trips, &HygieneConfig::default());
    assert_eq!(cleaned.len(), 2, "both fixture trips are plausible");

    let encoded = encode_stateless(cleaned.clone())?;
    let encoder = ZoneEncoder::fit(&cleaned, &ZoneConfig::default())?;
    let matrix = build_matrix(&encoded, &encoder)?;

    assert_eq!(matrix.len(), 2);
    assert_row_close(&matrix.rows[0], &EXPECTED_A);
    assert_row_close(&matrix.rows[1], &EXPECTED_B);
    assert_eq!(matrix.durations, vec![455.0, 663.0]);
    Ok(())
}

#[test]
fn test_validation_row_in_unseen_zone_gets_training_mean() -> Result<()> {
    let trips = read_trips(FIXTURE_CSV.as_bytes())?;
    let encoded = encode_stateless(trips.clone())?;

    // Fit on row A only; row B sits in different pickup and dropoff cells.
    let encoder = ZoneEncoder::fit(&trips[..1], &ZoneConfig::default())?;
    let validation = build_matrix(&encoded[1..], &encoder)?;

    let mut expected = EXPECTED_B;
    expected[2] = 455.0;
    expected[3] = 455.0;
    assert_row_close(&validation.rows[0], &expected);
    // Validation keeps its own label but it never reaches the encoder.
    assert_eq!(validation.durations, vec![663.0]);
    assert_eq!(encoder.global_mean(), 455.0);
    Ok(())
}
