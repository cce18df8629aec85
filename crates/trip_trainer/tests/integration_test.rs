//! Integration tests for the trip duration trainer
//!
//! Runs CSV loading, feature preparation and boosting end to end, and
//! checks that identical inputs give identical models.

use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use tripcast_features::{load_trips_csv, prepare_partitions, PipelineConfig, PipelineError};
use tripcast_trainer::{train_and_evaluate, EvaluationReport, TrainingParams};

const HEADER: &str = "id,pickup_datetime,passenger_count,pickup_longitude,pickup_latitude,\
dropoff_longitude,dropoff_latitude,trip_duration";

/// Short Manhattan-area hops, 1.4 to 3.3 km, at 4 to 40 km/h
fn create_synthetic_trips(rows: usize) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", HEADER)?;

    for i in 0..rows {
        let pickup_lat = 40.70 + (i % 20) as f64 * 0.005;
        let pickup_lon = -74.00 + (i % 13) as f64 * 0.004;
        let dropoff_lat = pickup_lat + 0.01 + (i % 7) as f64 * 0.003;
        let dropoff_lon = pickup_lon + 0.01;
        let duration = 300 + (i % 7) * 90 + (i % 20) * 15;
        let passengers = 1 + i % 4;
        writeln!(
            file,
            "id{},2016-03-{:02} {:02}:{:02}:00,{},{:.6},{:.6},{:.6},{:.6},{}",
            i,
            1 + i % 28,
            i % 24,
            i % 60,
            passengers,
            pickup_lon,
            pickup_lat,
            dropoff_lon,
            dropoff_lat,
            duration
        )?;
    }

    file.flush()?;
    Ok(file)
}

fn small_params() -> TrainingParams {
    TrainingParams {
        num_trees: 30,
        learning_rate: 0.1,
        max_depth: 3,
        min_samples_leaf: 5,
        log_period: 0,
        ..TrainingParams::default()
    }
}

#[test]
fn test_end_to_end_training() -> Result<()> {
    let file = create_synthetic_trips(200)?;
    let trips = load_trips_csv(file.path())?;
    assert_eq!(trips.len(), 200);

    let prepared = prepare_partitions(&trips, &PipelineConfig::default())?;
    assert_eq!(prepared.clean_rows, 200);
    assert_eq!(prepared.validation.len(), 40);
    assert_eq!(prepared.train.len(), 160);

    let (model, report) = train_and_evaluate(&prepared, small_params())?;

    assert_eq!(report.train_rows, 160);
    assert_eq!(report.validation_rows, 40);
    assert_eq!(report.trees, model.trees.len());
    assert!(report.trees <= 30);
    assert!(report.validation_rmsle.is_finite());
    assert!(report.validation_rmsle >= 0.0);
    // Durations span 300..1125 s, so even the bias-only model stays well below 1
    assert!(report.validation_rmsle < 1.0);

    Ok(())
}

#[test]
fn test_deterministic_training() -> Result<()> {
    let file = create_synthetic_trips(150)?;
    let trips = load_trips_csv(file.path())?;

    let first = prepare_partitions(&trips, &PipelineConfig::default())?;
    let second = prepare_partitions(&trips, &PipelineConfig::default())?;
    assert_eq!(first.train, second.train);
    assert_eq!(first.validation, second.validation);

    let (model1, report1) = train_and_evaluate(&first, small_params())?;
    let (model2, report2) = train_and_evaluate(&second, small_params())?;

    assert_eq!(model1, model2, "Models should be identical");
    assert_eq!(report1, report2, "Reports should be identical");

    Ok(())
}

#[test]
fn test_missing_columns_rejected() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "pickup_datetime,pickup_latitude,pickup_longitude")?;
    writeln!(file, "2016-03-14 17:24:55,40.76,-73.98")?;
    file.flush()?;

    match load_trips_csv(file.path()) {
        Err(PipelineError::MissingColumns { missing }) => {
            assert!(missing.contains(&"trip_duration".to_string()));
            assert!(missing.contains(&"dropoff_latitude".to_string()));
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_report_serializes_to_json() -> Result<()> {
    let file = create_synthetic_trips(100)?;
    let trips = load_trips_csv(file.path())?;
    let prepared = prepare_partitions(&trips, &PipelineConfig::default())?;
    let (_, report) = train_and_evaluate(&prepared, small_params())?;

    let json = serde_json::to_string_pretty(&report)?;
    assert!(json.contains("validation_rmsle"));

    let parsed: EvaluationReport = serde_json::from_str(&json)?;
    assert_eq!(parsed.validation_rows, report.validation_rows);
    assert_eq!(parsed.trees, report.trees);

    Ok(())
}
