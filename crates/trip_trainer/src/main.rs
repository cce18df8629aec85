//! Tripcast trainer CLI
//!
//! Loads raw trips, prepares leakage-safe train/validation features,
//! fits the boosted model and reports validation RMSLE.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tripcast_features::{load_trips_csv, prepare_partitions, FEATURE_COLUMNS};
use tripcast_trainer::{train_and_evaluate, AppConfig, Dataset};

#[derive(Parser, Debug)]
#[command(name = "tripcast-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and evaluate a trip duration model", long_about = None)]
struct Args {
    /// Input CSV with pickup/dropoff coordinates, pickup time, passengers and duration
    #[arg(short, long)]
    input: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the evaluation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Maximum number of boosting rounds
    #[arg(long)]
    trees: Option<usize>,

    /// Shrinkage applied to each tree
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Seed for the split and for row/feature sampling
    #[arg(long)]
    seed: Option<i64>,

    /// Share of cleaned rows held out for validation
    #[arg(long)]
    validation_fraction: Option<f64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(trees) = self.trees {
            config.training.num_trees = trees;
        }
        if let Some(lr) = self.learning_rate {
            config.training.learning_rate = lr;
        }
        if let Some(depth) = self.max_depth {
            config.training.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            config.training.seed = seed;
            config.pipeline.split.seed = seed;
        }
        if let Some(fraction) = self.validation_fraction {
            config.pipeline.split.validation_fraction = fraction;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase())),
        )
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Tripcast trainer v{}", env!("CARGO_PKG_VERSION"));

    let config = args.resolve_config().context("Invalid configuration")?;

    let trips = load_trips_csv(&args.input)
        .with_context(|| format!("Failed to load trips from {}", args.input.display()))?;

    let prepared =
        prepare_partitions(&trips, &config.pipeline).context("Feature preparation failed")?;
    info!(
        "Cleaned {} -> {} trips; {} pickup zones, {} dropoff zones",
        prepared.raw_rows,
        prepared.clean_rows,
        prepared.zone_encoder.pickup_zone_count(),
        prepared.zone_encoder.dropoff_zone_count()
    );

    let stats = Dataset::from_matrix(&prepared.train).feature_stats();
    info!("Training feature ranges:");
    for (name, (min, max)) in FEATURE_COLUMNS.iter().zip(stats) {
        info!("  {:<18} min={:.4} max={:.4}", name, min, max);
    }

    let (_model, report) =
        train_and_evaluate(&prepared, config.training.clone()).context("Training failed")?;

    info!(
        "Best iteration {} of {} ({} trees kept)",
        report.best_iteration, config.training.num_trees, report.trees
    );
    info!("Final Validation RMSLE: {:.4}", report.validation_rmsle);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_override_reaches_split_and_boosting() -> Result<()> {
        let args = Args::try_parse_from(["tripcast-train", "--input", "trips.csv", "--seed", "7"])?;
        let config = args.resolve_config()?;

        assert_eq!(config.pipeline.split.seed, 7);
        assert_eq!(config.training.seed, 7);
        Ok(())
    }

    #[test]
    fn test_training_overrides() -> Result<()> {
        let args = Args::try_parse_from([
            "tripcast-train",
            "--input",
            "trips.csv",
            "--trees",
            "50",
            "--learning-rate",
            "0.1",
            "--max-depth",
            "4",
            "--validation-fraction",
            "0.25",
        ])?;
        let config = args.resolve_config()?;

        assert_eq!(config.training.num_trees, 50);
        assert_eq!(config.training.learning_rate, 0.1);
        assert_eq!(config.training.max_depth, 4);
        assert_eq!(config.pipeline.split.validation_fraction, 0.25);
        assert_eq!(config.pipeline.split.seed, 42);
        Ok(())
    }

    #[test]
    fn test_overrides_apply_on_top_of_config_file() -> Result<()> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[training]\nnum_trees = 300\nseed = 3\n\n[pipeline.split]\nseed = 3")?;
        file.flush()?;

        let path = file.path().to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "tripcast-train",
            "--input",
            "trips.csv",
            "--config",
            path.as_str(),
            "--seed",
            "11",
        ])?;
        let config = args.resolve_config()?;

        assert_eq!(config.training.num_trees, 300);
        assert_eq!(config.training.seed, 11);
        assert_eq!(config.pipeline.split.seed, 11);
        Ok(())
    }

    #[test]
    fn test_invalid_override_is_rejected() -> Result<()> {
        let args = Args::try_parse_from([
            "tripcast-train",
            "--input",
            "trips.csv",
            "--validation-fraction",
            "1.5",
        ])?;
        assert!(args.resolve_config().is_err());
        Ok(())
    }
}
