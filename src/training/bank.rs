//! Model bank: trains both families against one train partition
//!
//! Every model sees the identical immutable train partition, which keeps the
//! comparison fair and makes the per-model trainings independent — the
//! regression family is fitted across a rayon pool.

use super::baselines::{NaiveLastValue, RollingMeanForecast, SeasonalNaive};
use super::config::ModelBankConfig;
use super::decision_tree::DecisionTree;
use super::gradient_boosting::GradientBoosting;
use super::linear::LinearRegression;
use super::random_forest::RandomForest;
use crate::error::{FlowcastError, Result};
use crate::split::TrainTestSplit;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelCategory {
    Regression,
    Baseline,
}

impl std::fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelCategory::Regression => write!(f, "regression"),
            ModelCategory::Baseline => write!(f, "baseline"),
        }
    }
}

/// Opaque fitted state behind a [`ModelHandle`].
#[derive(Debug, Clone)]
enum FittedModel {
    Linear(LinearRegression),
    Tree(DecisionTree),
    Forest(RandomForest),
    Boosting(GradientBoosting),
    NaiveLast(NaiveLastValue),
    RollingMean(RollingMeanForecast),
    SeasonalNaive(SeasonalNaive),
}

/// One trained model, held in memory for the duration of a run.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    pub name: String,
    pub category: ModelCategory,
    model: FittedModel,
}

impl ModelHandle {
    /// Predict for rows described by their feature matrix and their absolute
    /// positions in the completed daily series. Regression models read the
    /// features; constant baselines only need the row count; the seasonal
    /// baseline aligns on positions.
    pub fn predict(&self, x: &Array2<f64>, positions: &[usize]) -> Result<Array1<f64>> {
        if x.nrows() != positions.len() {
            return Err(FlowcastError::Shape {
                expected: format!("{} positions", x.nrows()),
                actual: format!("{} positions", positions.len()),
            });
        }
        match &self.model {
            FittedModel::Linear(m) => m.predict(x),
            FittedModel::Tree(m) => m.predict(x),
            FittedModel::Forest(m) => m.predict(x),
            FittedModel::Boosting(m) => m.predict(x),
            FittedModel::NaiveLast(m) => Ok(m.predict(positions.len())),
            FittedModel::RollingMean(m) => Ok(m.predict(positions.len())),
            FittedModel::SeasonalNaive(m) => Ok(m.predict_positions(positions)),
        }
    }

    /// The seasonal baseline needs special handling during extrapolation;
    /// expose it so the predictor can check positional alignment.
    pub fn as_seasonal(&self) -> Option<&SeasonalNaive> {
        match &self.model {
            FittedModel::SeasonalNaive(m) => Some(m),
            _ => None,
        }
    }
}

/// A baseline that could not be enabled for this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedModel {
    pub name: String,
    pub reason: String,
}

/// All models trained for one run.
#[derive(Debug, Clone)]
pub struct ModelBank {
    handles: Vec<ModelHandle>,
    skipped: Vec<SkippedModel>,
}

#[derive(Debug, Clone, Copy)]
enum RegressorKind {
    Linear,
    Tree,
    Forest,
    Boosting,
}

impl ModelBank {
    /// Train the full bank against the split's train partition.
    pub fn train(split: &TrainTestSplit, config: &ModelBankConfig) -> Result<Self> {
        let kinds = [
            RegressorKind::Linear,
            RegressorKind::Tree,
            RegressorKind::Forest,
            RegressorKind::Boosting,
        ];
        let regressors: Result<Vec<ModelHandle>> = kinds
            .par_iter()
            .map(|&kind| train_regressor(kind, &split.x_train, &split.y_train, config))
            .collect();
        let mut handles = regressors?;

        handles.push(ModelHandle {
            name: "naive_last_value".to_string(),
            category: ModelCategory::Baseline,
            model: FittedModel::NaiveLast(NaiveLastValue::fit(&split.y_train)?),
        });

        for &window in &config.baseline.rolling_windows {
            let days = window * config.baseline.period_days;
            handles.push(ModelHandle {
                name: format!("rolling_mean_{}", window),
                category: ModelCategory::Baseline,
                model: FittedModel::RollingMean(RollingMeanForecast::fit(
                    &split.y_train,
                    days,
                )?),
            });
        }

        let mut skipped = Vec::new();
        let period = config.baseline.seasonal_period_days;
        if split.n_total() >= period {
            handles.push(ModelHandle {
                name: "seasonal_naive".to_string(),
                category: ModelCategory::Baseline,
                model: FittedModel::SeasonalNaive(SeasonalNaive::fit(&split.y_train, period)?),
            });
        } else {
            info!(
                observed_days = split.n_total(),
                required_days = period,
                "seasonal_naive skipped"
            );
            skipped.push(SkippedModel {
                name: "seasonal_naive".to_string(),
                reason: format!(
                    "insufficient history: {} days observed, {} required",
                    split.n_total(),
                    period
                ),
            });
        }

        debug!(models = handles.len(), skipped = skipped.len(), "model bank trained");
        Ok(Self { handles, skipped })
    }

    pub fn handles(&self) -> &[ModelHandle] {
        &self.handles
    }

    pub fn regression_handles(&self) -> impl Iterator<Item = &ModelHandle> {
        self.handles
            .iter()
            .filter(|h| h.category == ModelCategory::Regression)
    }

    pub fn baseline_handles(&self) -> impl Iterator<Item = &ModelHandle> {
        self.handles
            .iter()
            .filter(|h| h.category == ModelCategory::Baseline)
    }

    pub fn get(&self, name: &str) -> Option<&ModelHandle> {
        self.handles.iter().find(|h| h.name == name)
    }

    pub fn skipped(&self) -> &[SkippedModel] {
        &self.skipped
    }
}

fn train_regressor(
    kind: RegressorKind,
    x: &Array2<f64>,
    y: &Array1<f64>,
    config: &ModelBankConfig,
) -> Result<ModelHandle> {
    let (name, model) = match kind {
        RegressorKind::Linear => {
            let mut m = LinearRegression::new(config.linear.ridge_alpha);
            m.fit(x, y)?;
            ("linear_regression", FittedModel::Linear(m))
        }
        RegressorKind::Tree => {
            let mut m = DecisionTree::new()
                .with_min_samples_split(config.tree.min_samples_split)
                .with_min_samples_leaf(config.tree.min_samples_leaf)
                .with_ccp_alpha(config.tree.ccp_alpha)
                .with_seed(config.tree.seed);
            if let Some(d) = config.tree.max_depth {
                m = m.with_max_depth(d);
            }
            m.fit(x, y)?;
            ("decision_tree", FittedModel::Tree(m))
        }
        RegressorKind::Forest => {
            let mut m = RandomForest::new(config.forest.n_estimators)
                .with_min_samples_split(config.forest.min_samples_split)
                .with_min_samples_leaf(config.forest.min_samples_leaf)
                .with_max_features(config.forest.max_features)
                .with_seed(config.forest.seed);
            if let Some(d) = config.forest.max_depth {
                m = m.with_max_depth(d);
            }
            m.fit(x, y)?;
            ("random_forest", FittedModel::Forest(m))
        }
        RegressorKind::Boosting => {
            let mut m = GradientBoosting::new(config.boosting.clone());
            m.fit(x, y)?;
            ("gradient_boosting", FittedModel::Boosting(m))
        }
    };

    debug!(model = name, "regressor trained");
    Ok(ModelHandle {
        name: name.to_string(),
        category: ModelCategory::Regression,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::build_training_matrix;
    use crate::series::{DailySeries, TransactionRecord};
    use crate::split::{chronological_split, SplitConfig};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn split_of_days(n: u64) -> TrainTestSplit {
        let records: Vec<TransactionRecord> = (0..n)
            .map(|i| TransactionRecord {
                date: d(2022, 1, 1) + chrono::Days::new(i),
                amount: 100.0 + (i % 7) as f64,
            })
            .collect();
        let today = d(2022, 1, 1) + chrono::Days::new(n);
        let series = DailySeries::complete(&records, today).unwrap();
        let matrix = build_training_matrix(&series).unwrap();
        chronological_split(&matrix, &SplitConfig::default()).unwrap()
    }

    #[test]
    fn test_trains_four_regressors_and_baselines() {
        let split = split_of_days(120);
        let bank = ModelBank::train(&split, &ModelBankConfig::default()).unwrap();

        assert_eq!(bank.regression_handles().count(), 4);
        assert!(bank.get("linear_regression").is_some());
        assert!(bank.get("decision_tree").is_some());
        assert!(bank.get("random_forest").is_some());
        assert!(bank.get("gradient_boosting").is_some());
        assert!(bank.get("naive_last_value").is_some());
        assert!(bank.get("rolling_mean_3").is_some());
        assert!(bank.get("rolling_mean_6").is_some());
    }

    #[test]
    fn test_seasonal_skipped_on_short_history() {
        let split = split_of_days(120);
        let bank = ModelBank::train(&split, &ModelBankConfig::default()).unwrap();

        assert!(bank.get("seasonal_naive").is_none());
        assert_eq!(bank.skipped().len(), 1);
        assert!(bank.skipped()[0].reason.contains("insufficient history"));
    }

    #[test]
    fn test_seasonal_enabled_with_full_year() {
        let split = split_of_days(400);
        let bank = ModelBank::train(&split, &ModelBankConfig::default()).unwrap();

        assert!(bank.get("seasonal_naive").is_some());
        assert!(bank.skipped().is_empty());
    }

    #[test]
    fn test_handles_predict_on_test_partition() {
        let split = split_of_days(120);
        let bank = ModelBank::train(&split, &ModelBankConfig::default()).unwrap();

        let positions: Vec<usize> =
            (split.split_index..split.n_total()).collect();
        for handle in bank.handles() {
            let preds = handle.predict(&split.x_test, &positions).unwrap();
            assert_eq!(preds.len(), split.test_dates.len(), "model {}", handle.name);
            assert!(preds.iter().all(|p| p.is_finite()), "model {}", handle.name);
        }
    }
}
