//! Model scoring and ranking
//!
//! Every trained model is scored on both partitions with the same metric
//! set, then ranked into a single comparison table. Baselines compete in the
//! same ranking as the regressors: a regressor that cannot beat
//! naive-last-value should be visibly behind it.

use crate::error::{FlowcastError, Result};
use crate::split::TrainTestSplit;
use crate::training::{ModelBank, ModelCategory};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Denominator floor for SMAPE, keeping exact-zero actuals finite.
const SMAPE_FLOOR: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitLabel {
    Train,
    Test,
}

impl std::fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitLabel::Train => write!(f, "train"),
            SplitLabel::Test => write!(f, "test"),
        }
    }
}

/// One (model, split, metric, value) observation for the report sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub model: String,
    pub split: SplitLabel,
    pub metric: String,
    pub value: f64,
}

/// Regression metric set computed for each (model, split) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// Can go negative for models worse than predicting the mean.
    pub r2: f64,
    pub medae: f64,
    /// Symmetric percentage error with a floored denominator.
    pub smape: f64,
    pub p50_abs_err: f64,
    pub p75_abs_err: f64,
    pub p90_abs_err: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        let n = y_true.len();
        if n != y_pred.len() {
            return Err(FlowcastError::Shape {
                expected: format!("{} predictions", n),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if n == 0 {
            return Err(FlowcastError::DataShape(
                "cannot score an empty partition".to_string(),
            ));
        }

        let nf = n as f64;
        let errors: Vec<f64> = y_true.iter().zip(y_pred.iter()).map(|(t, p)| t - p).collect();

        let mse = errors.iter().map(|e| e * e).sum::<f64>() / nf;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / nf;

        let y_mean = y_true.sum() / nf;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        let smape = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| {
                let denom = ((t.abs() + p.abs()) / 2.0).max(SMAPE_FLOOR);
                (t - p).abs() / denom
            })
            .sum::<f64>()
            / nf
            * 100.0;

        let mut abs_errors: Vec<f64> = errors.iter().map(|e| e.abs()).collect();
        abs_errors.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Ok(Self {
            rmse: mse.sqrt(),
            mae,
            r2,
            medae: percentile(&abs_errors, 0.50),
            smape,
            p50_abs_err: percentile(&abs_errors, 0.50),
            p75_abs_err: percentile(&abs_errors, 0.75),
            p90_abs_err: percentile(&abs_errors, 0.90),
        })
    }

    fn to_records(self, model: &str, split: SplitLabel) -> Vec<EvaluationRecord> {
        let pairs = [
            ("rmse", self.rmse),
            ("mae", self.mae),
            ("r2", self.r2),
            ("medae", self.medae),
            ("smape", self.smape),
            ("p50_abs_err", self.p50_abs_err),
            ("p75_abs_err", self.p75_abs_err),
            ("p90_abs_err", self.p90_abs_err),
        ];
        pairs
            .into_iter()
            .map(|(metric, value)| EvaluationRecord {
                model: model.to_string(),
                split,
                metric: metric.to_string(),
                value,
            })
            .collect()
    }
}

/// Linear-interpolated percentile over pre-sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// One ranked entry in the cross-model comparison report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub model: String,
    pub category: ModelCategory,
    pub rank: usize,
    pub test: RegressionMetrics,
    pub train_mae: f64,
}

/// Full evaluation output: raw records plus the ranked comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub records: Vec<EvaluationRecord>,
    pub comparison: Vec<ComparisonRow>,
}

/// Score every model in the bank on both partitions and rank by test MAE
/// ascending, ties broken by test RMSE.
pub fn evaluate(bank: &ModelBank, split: &TrainTestSplit) -> Result<Evaluation> {
    let train_positions: Vec<usize> = (0..split.split_index).collect();
    let test_positions: Vec<usize> = (split.split_index..split.n_total()).collect();

    let mut records = Vec::new();
    let mut rows = Vec::new();

    for handle in bank.handles() {
        let pred_train = handle.predict(&split.x_train, &train_positions)?;
        let pred_test = handle.predict(&split.x_test, &test_positions)?;

        let train_metrics = RegressionMetrics::compute(&split.y_train, &pred_train)?;
        let test_metrics = RegressionMetrics::compute(&split.y_test, &pred_test)?;
        debug!(
            model = %handle.name,
            test_mae = test_metrics.mae,
            test_rmse = test_metrics.rmse,
            "scored"
        );

        records.extend(train_metrics.to_records(&handle.name, SplitLabel::Train));
        records.extend(test_metrics.to_records(&handle.name, SplitLabel::Test));
        rows.push(ComparisonRow {
            model: handle.name.clone(),
            category: handle.category,
            rank: 0,
            test: test_metrics,
            train_mae: train_metrics.mae,
        });
    }

    rows.sort_by(|a, b| {
        (a.test.mae, a.test.rmse)
            .partial_cmp(&(b.test.mae, b.test.rmse))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }

    Ok(Evaluation { records, comparison: rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        let metrics = RegressionMetrics::compute(&y, &y.clone()).unwrap();
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.r2, 1.0);
        assert_eq!(metrics.p90_abs_err, 0.0);
    }

    #[test]
    fn test_r2_negative_for_bad_model() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![10.0, -10.0, 10.0, -10.0];
        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert!(metrics.r2 < 0.0);
    }

    #[test]
    fn test_smape_finite_for_exact_zero_actuals() {
        let y_true = array![0.0, 0.0, 0.0];
        let y_pred = array![0.0, 1.0, 0.0];
        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert!(metrics.smape.is_finite());
        // |1-0| / max(0.5, floor) = 2.0 on one of three rows
        assert!((metrics.smape - 200.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_smape_all_zero_is_zero() {
        let y = array![0.0, 0.0, 0.0];
        let metrics = RegressionMetrics::compute(&y, &y.clone()).unwrap();
        assert_eq!(metrics.smape, 0.0);
    }

    #[test]
    fn test_percentiles_interpolate() {
        let sorted = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.50), 2.0);
        assert_eq!(percentile(&sorted, 0.75), 3.0);
        assert!((percentile(&sorted, 0.90) - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_medae_matches_p50() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.5, 2.0, 3.5, 4.0, 9.0];
        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert_eq!(metrics.medae, metrics.p50_abs_err);
    }

    #[test]
    fn test_record_count_per_split() {
        let y = array![1.0, 2.0, 3.0];
        let metrics = RegressionMetrics::compute(&y, &y.clone()).unwrap();
        let records = metrics.to_records("m", SplitLabel::Test);
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.split == SplitLabel::Test));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = array![1.0, 2.0];
        let b = array![1.0];
        assert!(RegressionMetrics::compute(&a, &b).is_err());
    }
}
