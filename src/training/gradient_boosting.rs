//! Boosted shallow-tree ensemble
//!
//! Sequential gradient boosting for squared error: each round fits a shallow
//! tree to the current residuals and adds a shrunken copy of its predictions.

use super::config::BoostingConfig;
use super::decision_tree::DecisionTree;
use crate::error::{FlowcastError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    config: BoostingConfig,
    trees: Vec<DecisionTree>,
    initial_prediction: f64,
    is_fitted: bool,
}

impl GradientBoosting {
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            initial_prediction: 0.0,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(FlowcastError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(FlowcastError::DataShape(
                "cannot boost on zero samples".to_string(),
            ));
        }

        self.initial_prediction = y.mean().unwrap_or(0.0);
        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);

        self.trees = Vec::with_capacity(self.config.n_estimators);
        for round in 0..self.config.n_estimators {
            let residuals: Array1<f64> = y - &predictions;

            let row_indices = self.subsample_indices(n_samples, &mut rng);
            let (x_fit, r_fit) = if row_indices.len() < n_samples {
                let x_sub = x.select(Axis(0), &row_indices);
                let r_sub =
                    Array1::from_vec(row_indices.iter().map(|&i| residuals[i]).collect());
                (x_sub, r_sub)
            } else {
                (x.to_owned(), residuals)
            };

            let mut tree = DecisionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf)
                .with_seed(self.config.seed.wrapping_add(round as u64));
            tree.fit(&x_fit, &r_fit)?;

            // Update every row's running prediction, sampled or not, so the
            // next round's residuals stay consistent.
            let tree_pred = tree.predict(x)?;
            predictions = predictions + tree_pred * self.config.learning_rate;

            self.trees.push(tree);
        }

        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(FlowcastError::ModelNotFitted);
        }

        let mut predictions = Array1::from_elem(x.nrows(), self.initial_prediction);
        for tree in &self.trees {
            let tree_pred = tree.predict(x)?;
            predictions = predictions + tree_pred * self.config.learning_rate;
        }
        Ok(predictions)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn subsample_indices(&self, n: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if self.config.subsample >= 1.0 {
            return (0..n).collect();
        }
        let sample_size = ((n as f64) * self.config.subsample).ceil() as usize;
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        indices.truncate(sample_size.max(1));
        indices.sort_unstable();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn config(n: usize, lr: f64) -> BoostingConfig {
        BoostingConfig {
            n_estimators: n,
            learning_rate: lr,
            max_depth: 2,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 42,
        }
    }

    #[test]
    fn test_reduces_training_error_over_rounds() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0];

        let mut short = GradientBoosting::new(config(5, 0.1));
        let mut long = GradientBoosting::new(config(100, 0.1));
        short.fit(&x, &y).unwrap();
        long.fit(&x, &y).unwrap();

        let mse = |m: &GradientBoosting| {
            let p = m.predict(&x).unwrap();
            p.iter().zip(y.iter()).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / y.len() as f64
        };
        assert!(mse(&long) < mse(&short));
    }

    #[test]
    fn test_zero_rounds_predicts_mean() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![3.0, 6.0, 9.0];

        let mut model = GradientBoosting::new(config(0, 0.1));
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        for p in preds.iter() {
            assert!((p - 6.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_subsample_still_converges() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0], [9.0], [10.0]];
        let y = array![1.0, 1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0, 9.0];

        let mut cfg = config(80, 0.1);
        cfg.subsample = 0.7;
        let mut model = GradientBoosting::new(cfg);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        assert!(preds[0] < 5.0);
        assert!(preds[9] > 5.0);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = GradientBoosting::new(config(10, 0.1));
        assert!(matches!(
            model.predict(&array![[1.0]]).unwrap_err(),
            FlowcastError::ModelNotFitted
        ));
    }
}
