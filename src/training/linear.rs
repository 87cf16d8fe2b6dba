//! Linear regression via normal equations

use crate::error::{FlowcastError, Result};
use ndarray::{Array1, Array2, Axis};

/// Solve the symmetric positive-definite system Ax = b by Cholesky
/// decomposition. A semi-definite system (a constant feature column after
/// centering) gets one retry with a tiny ridge on the diagonal.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }
    if let Some(x) = cholesky_solve_inner(a, b) {
        return Some(x);
    }

    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    if ridge <= 0.0 {
        return None;
    }
    let mut a_reg = a.clone();
    for k in 0..n {
        a_reg[[k, k]] += ridge;
    }
    cholesky_solve_inner(&a_reg, b)
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();

    // A = L * L^T
    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Gauss-Jordan inverse, the fallback for near-singular systems.
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }
        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }
        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}

/// Ordinary least squares with optional ridge penalty, solved through the
/// normal equations `(X^T X + alpha*I) w = X^T y`.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    /// L2 regularization strength (0.0 = OLS).
    pub ridge_alpha: f64,
}

impl LinearRegression {
    pub fn new(ridge_alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            ridge_alpha,
        }
    }

    /// Fit against centered data so the intercept absorbs the means.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() {
            return Err(FlowcastError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(FlowcastError::DataShape("cannot fit on zero samples".to_string()));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| FlowcastError::Computation("empty design matrix".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let mut xtx = x_centered.t().dot(&x_centered);
        if self.ridge_alpha > 0.0 {
            for i in 0..n_features {
                xtx[[i, i]] += self.ridge_alpha;
            }
        }
        let xty = x_centered.t().dot(&y_centered);

        let coefficients = match cholesky_solve(&xtx, &xty) {
            Some(w) => w,
            None => match matrix_inverse(&xtx) {
                Some(inv) => inv.dot(&xty),
                None => {
                    return Err(FlowcastError::Computation(
                        "normal equations are singular; check for constant feature columns"
                            .to_string(),
                    ))
                }
            },
        };

        self.intercept = y_mean - coefficients.dot(&x_mean);
        self.coefficients = Some(coefficients);
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(FlowcastError::ModelNotFitted)?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_recovers_exact_linear_relation() {
        let x = array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0], [4.0, 2.0], [5.0, 4.0]];
        let y = array![8.0, 9.0, 22.0, 18.0, 25.0]; // y = 2*x1 + 3*x2

        let mut model = LinearRegression::new(0.0);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        for (p, a) in preds.iter().zip(y.iter()) {
            assert!((p - a).abs() < 1e-6, "pred {p} vs actual {a}");
        }
    }

    #[test]
    fn test_ridge_handles_collinear_columns() {
        // Second column is an exact copy of the first; OLS is singular
        // there, ridge is not.
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::new(1.0);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        assert!((preds[1] - 4.0).abs() < 1.0);
    }

    #[test]
    fn test_constant_column_survives_ols() {
        // A constant column centers to zero, making the normal equations
        // semi-definite; the regularized retry must absorb it.
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::new(0.0);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        for (p, a) in preds.iter().zip(y.iter()) {
            assert!((p - a).abs() < 1e-3, "pred {p} vs actual {a}");
        }
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = LinearRegression::new(0.0);
        let err = model.predict(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, FlowcastError::ModelNotFitted));
    }

    #[test]
    fn test_cholesky_matches_known_solution() {
        // A = [[4,2],[2,3]], b = [10, 8] -> x = [1.75, 1.5]
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![10.0, 8.0];
        let x = cholesky_solve(&a, &b).unwrap();
        assert!((x[0] - 1.75).abs() < 1e-9);
        assert!((x[1] - 1.5).abs() < 1e-9);
    }
}
