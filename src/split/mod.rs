//! Leakage-free chronological train/test split
//!
//! The feature matrix is date-ascending, so the split is a single cut:
//! everything before the boundary trains, everything after tests. Shuffling
//! would leak future information into training and is never done.

use crate::error::{FlowcastError, Result};
use crate::features::FeatureMatrix;
use chrono::NaiveDate;
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Split thresholds, supplied by the external configuration provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of samples held out for testing, in (0, 1).
    pub test_fraction: f64,
    /// Minimum number of samples overall.
    pub min_total_samples: usize,
    /// Minimum number of samples in the test partition.
    pub min_test_samples: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            min_total_samples: 30,
            min_test_samples: 10,
        }
    }
}

impl SplitConfig {
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_min_total_samples(mut self, n: usize) -> Self {
        self.min_total_samples = n;
        self
    }

    pub fn with_min_test_samples(mut self, n: usize) -> Self {
        self.min_test_samples = n;
        self
    }
}

/// The two partitions of a chronological split.
///
/// Invariant: every train date is strictly before every test date.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub train_dates: Vec<NaiveDate>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
    pub test_dates: Vec<NaiveDate>,
    pub split_index: usize,
}

impl TrainTestSplit {
    pub fn n_total(&self) -> usize {
        self.train_dates.len() + self.test_dates.len()
    }
}

/// Split a date-ascending feature matrix at `floor(N * (1 - test_fraction))`.
pub fn chronological_split(matrix: &FeatureMatrix, config: &SplitConfig) -> Result<TrainTestSplit> {
    if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(FlowcastError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: config.test_fraction.to_string(),
            reason: "must lie strictly between 0 and 1".to_string(),
        });
    }

    let n = matrix.dates.len();
    if n < config.min_total_samples {
        return Err(FlowcastError::InsufficientData {
            what: "total samples".to_string(),
            observed: n,
            required: config.min_total_samples,
            hint: "supply more history or adjust test_fraction".to_string(),
        });
    }

    let split_index = (n as f64 * (1.0 - config.test_fraction)).floor() as usize;
    let n_test = n - split_index;
    if n_test < config.min_test_samples {
        return Err(FlowcastError::InsufficientData {
            what: "test samples".to_string(),
            observed: n_test,
            required: config.min_test_samples,
            hint: "supply more history or adjust test_fraction".to_string(),
        });
    }
    if split_index == 0 {
        return Err(FlowcastError::InsufficientData {
            what: "train samples".to_string(),
            observed: 0,
            required: 1,
            hint: "lower test_fraction".to_string(),
        });
    }

    let split = TrainTestSplit {
        x_train: matrix.x.slice(s![..split_index, ..]).to_owned(),
        y_train: matrix.y.slice(s![..split_index]).to_owned(),
        train_dates: matrix.dates[..split_index].to_vec(),
        x_test: matrix.x.slice(s![split_index.., ..]).to_owned(),
        y_test: matrix.y.slice(s![split_index..]).to_owned(),
        test_dates: matrix.dates[split_index..].to_vec(),
        split_index,
    };

    // Boundary audit line: which dates ended up on which side of the cut.
    info!(
        train_start = %split.train_dates[0],
        train_end = %split.train_dates[split_index - 1],
        test_start = %split.test_dates[0],
        test_end = %split.test_dates[n_test - 1],
        "chronological split"
    );

    Ok(split)
}
