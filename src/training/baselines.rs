//! Naive baseline forecasters
//!
//! Computed directly from the train-partition label sequence with no
//! parametric fit. Each is fixed once at training time and reused for both
//! scoring and extrapolation, mirroring how the regression models are
//! trained once and queried everywhere.

use crate::error::{FlowcastError, Result};
use ndarray::Array1;

/// Repeats the final train-partition value for every requested point.
#[derive(Debug, Clone)]
pub struct NaiveLastValue {
    value: f64,
}

impl NaiveLastValue {
    pub fn fit(y_train: &Array1<f64>) -> Result<Self> {
        let value = *y_train
            .last()
            .ok_or_else(|| FlowcastError::DataShape("empty train partition".to_string()))?;
        Ok(Self { value })
    }

    pub fn predict(&self, n: usize) -> Array1<f64> {
        Array1::from_elem(n, self.value)
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Mean of the trailing `window_days` train values, repeated forward.
#[derive(Debug, Clone)]
pub struct RollingMeanForecast {
    window_days: usize,
    value: f64,
}

impl RollingMeanForecast {
    /// `window_days` is clamped to the train length when history is shorter
    /// than the window.
    pub fn fit(y_train: &Array1<f64>, window_days: usize) -> Result<Self> {
        if y_train.is_empty() {
            return Err(FlowcastError::DataShape("empty train partition".to_string()));
        }
        if window_days == 0 {
            return Err(FlowcastError::InvalidParameter {
                name: "window_days".to_string(),
                value: "0".to_string(),
                reason: "rolling window must be at least one day".to_string(),
            });
        }
        let window = window_days.min(y_train.len());
        let tail = y_train.slice(ndarray::s![y_train.len() - window..]);
        let value = tail.sum() / window as f64;
        Ok(Self { window_days, value })
    }

    pub fn predict(&self, n: usize) -> Array1<f64> {
        Array1::from_elem(n, self.value)
    }

    pub fn window_days(&self) -> usize {
        self.window_days
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Repeats the train-partition value from the same position one seasonal
/// period (nominally 365 days) earlier.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    train_labels: Vec<f64>,
    period: usize,
    fallback: f64,
}

impl SeasonalNaive {
    pub fn fit(y_train: &Array1<f64>, period: usize) -> Result<Self> {
        if y_train.is_empty() {
            return Err(FlowcastError::DataShape("empty train partition".to_string()));
        }
        if period == 0 {
            return Err(FlowcastError::InvalidParameter {
                name: "period".to_string(),
                value: "0".to_string(),
                reason: "seasonal period must be at least one day".to_string(),
            });
        }
        let fallback = y_train.mean().unwrap_or(0.0);
        Ok(Self {
            train_labels: y_train.to_vec(),
            period,
            fallback,
        })
    }

    /// Predict for a position expressed as an absolute index into the
    /// completed daily series. Positions with no prior-period train
    /// observation use the train mean; positions whose lookback lands past
    /// the train boundary step back additional whole periods.
    pub fn predict_position(&self, position: usize) -> f64 {
        if position < self.period {
            return self.fallback;
        }
        let mut p = position - self.period;
        while p >= self.train_labels.len() {
            match p.checked_sub(self.period) {
                Some(q) => p = q,
                None => return self.fallback,
            }
        }
        self.train_labels[p]
    }

    pub fn predict_positions(&self, positions: &[usize]) -> Array1<f64> {
        Array1::from_vec(positions.iter().map(|&p| self.predict_position(p)).collect())
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Whether `position` resolves to a direct prior-period train
    /// observation, without fallback or extra period steps.
    pub fn is_aligned(&self, position: usize) -> bool {
        position >= self.period && position - self.period < self.train_labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_naive_last_repeats_final_value() {
        let y = Array1::from_vec(vec![1.0, 2.0, 3.0, 42.0]);
        let model = NaiveLastValue::fit(&y).unwrap();
        let preds = model.predict(5);
        assert!(preds.iter().all(|&p| p == 42.0));
    }

    #[test]
    fn test_naive_last_empty_rejected() {
        let y = Array1::from_vec(vec![]);
        assert!(NaiveLastValue::fit(&y).is_err());
    }

    #[test]
    fn test_rolling_mean_uses_trailing_window() {
        let y = Array1::from_vec(vec![0.0, 0.0, 10.0, 20.0, 30.0]);
        let model = RollingMeanForecast::fit(&y, 3).unwrap();
        assert!((model.value() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_mean_clamps_to_history() {
        let y = Array1::from_vec(vec![4.0, 6.0]);
        let model = RollingMeanForecast::fit(&y, 180).unwrap();
        assert!((model.value() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_naive_looks_back_one_period() {
        let labels: Vec<f64> = (0..400).map(|i| i as f64).collect();
        let y = Array1::from_vec(labels);
        let model = SeasonalNaive::fit(&y, 365).unwrap();

        assert_eq!(model.predict_position(365), 0.0);
        assert_eq!(model.predict_position(399), 34.0);
    }

    #[test]
    fn test_seasonal_naive_fallback_before_first_period() {
        let y = Array1::from_vec(vec![2.0, 4.0, 6.0]);
        let model = SeasonalNaive::fit(&y, 365).unwrap();
        // No prior-year observation: train mean.
        assert!((model.predict_position(10) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_naive_steps_back_past_train_boundary() {
        // Train covers positions 0..400; position 800 looks back to 435,
        // which is outside train, so it steps back another period to 70.
        let labels: Vec<f64> = (0..400).map(|i| i as f64).collect();
        let y = Array1::from_vec(labels);
        let model = SeasonalNaive::fit(&y, 365).unwrap();
        assert_eq!(model.predict_position(800), 70.0);
        assert!(!model.is_aligned(800));
        assert!(model.is_aligned(700));
    }
}
