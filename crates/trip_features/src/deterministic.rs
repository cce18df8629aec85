//! Seeded randomness for reproducible partitioning and sampling
//!
//! An LCG is enough here: the goal is identical partitions for identical
//! seeds on every platform, not statistical quality.

use std::num::Wrapping;
use tracing::info;

use crate::config::SplitConfig;

/// Linear congruential generator (glibc constants)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<i64>,
}

impl LcgRng {
    const MULTIPLIER: i64 = 1103515245;
    const INCREMENT: i64 = 12345;
    const MODULUS: i64 = 1 << 31;

    pub fn new(seed: i64) -> Self {
        Self {
            state: Wrapping(seed.wrapping_abs() % Self::MODULUS),
        }
    }

    /// Next value in `[0, 2^31)`
    pub fn next_i64(&mut self) -> i64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state.0 & (Self::MODULUS - 1)
    }

    /// Next value in `[0, max)`; zero when `max` is not positive
    pub fn next_range(&mut self, max: i64) -> i64 {
        if max <= 0 {
            return 0;
        }
        self.next_i64() % max
    }

    /// Next value in `[0.0, 1.0)`
    pub fn next_unit(&mut self) -> f64 {
        self.next_i64() as f64 / Self::MODULUS as f64
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i as i64 + 1) as usize;
            items.swap(i, j);
        }
    }
}

/// Rows routed to each side of a split
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub validation: Vec<T>,
}

/// Number of validation rows for a batch of `n`.
///
/// Rounds up, and always leaves at least one training row when `n > 0`.
pub fn validation_size(n: usize, fraction: f64) -> usize {
    let wanted = (n as f64 * fraction).ceil() as usize;
    wanted.min(n.saturating_sub(1))
}

/// Shuffle with the configured seed, then take the leading rows as
/// validation and the remainder as training.
pub fn train_validation_split<T>(mut rows: Vec<T>, config: &SplitConfig) -> Split<T> {
    let n_val = validation_size(rows.len(), config.validation_fraction);

    let mut rng = LcgRng::new(config.seed);
    rng.shuffle(&mut rows);
    let train = rows.split_off(n_val);

    info!(
        "Split {} rows into {} train / {} validation (seed {})",
        train.len() + rows.len(),
        train.len(),
        rows.len(),
        config.seed
    );

    Split {
        train,
        validation: rows,
    }
}
