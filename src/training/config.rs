//! Model bank configuration
//!
//! All hyperparameters are injected by the external configuration provider;
//! there are no module-level mutable defaults. `Default` impls document the
//! values used when the provider supplies nothing.

use super::random_forest::MaxFeatures;
use serde::{Deserialize, Serialize};

/// Linear regressor hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearConfig {
    /// L2 regularization strength; 0.0 is plain OLS.
    pub ridge_alpha: f64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self { ridge_alpha: 0.0 }
    }
}

/// Single decision tree hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Cost-complexity pruning strength; 0.0 disables pruning.
    pub ccp_alpha: f64,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(6),
            min_samples_split: 10,
            min_samples_leaf: 5,
            ccp_alpha: 0.0,
            seed: 42,
        }
    }
}

/// Bagged tree ensemble hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split.
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: Some(10),
            min_samples_split: 10,
            min_samples_leaf: 3,
            max_features: MaxFeatures::Sqrt,
            seed: 42,
        }
    }
}

/// Boosted ensemble hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    /// Shrinkage applied to every tree's contribution.
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Row subsample ratio per round, in (0, 1].
    pub subsample: f64,
    pub seed: u64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 3,
            subsample: 1.0,
            seed: 42,
        }
    }
}

/// Baseline forecaster configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Length of one rolling-mean period, nominally a month-equivalent block.
    pub period_days: usize,
    /// Trailing window lengths in periods.
    pub rolling_windows: Vec<usize>,
    /// Seasonal-naive lookback in days.
    pub seasonal_period_days: usize,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            period_days: 30,
            rolling_windows: vec![3, 6],
            seasonal_period_days: 365,
        }
    }
}

/// Full hyperparameter bundle for [`super::ModelBank::train`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelBankConfig {
    pub linear: LinearConfig,
    pub tree: TreeConfig,
    pub forest: ForestConfig,
    pub boosting: BoostingConfig,
    pub baseline: BaselineConfig,
}
