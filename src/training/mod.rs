//! Model training module
//!
//! Two model families trained against one immutable train partition:
//! - Regression: linear (OLS/ridge), pruned decision tree, bagged forest,
//!   boosted shallow trees. Hyperparameters injected via [`ModelBankConfig`].
//! - Baselines: naive-last-value, trailing rolling means, seasonal-naive.
//!   Derived directly from the label sequence, no parametric fit.

mod bank;
mod config;
pub mod baselines;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod linear;
pub mod random_forest;

pub use bank::{ModelBank, ModelCategory, ModelHandle, SkippedModel};
pub use baselines::{NaiveLastValue, RollingMeanForecast, SeasonalNaive};
pub use config::{
    BaselineConfig, BoostingConfig, ForestConfig, LinearConfig, ModelBankConfig, TreeConfig,
};
pub use decision_tree::DecisionTree;
pub use gradient_boosting::GradientBoosting;
pub use linear::LinearRegression;
pub use random_forest::{MaxFeatures, RandomForest};
