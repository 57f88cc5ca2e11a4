//! Binomial GLM with logit link, fitted by iteratively reweighted least squares

use faer::linalg::solvers::{Cholesky, SolverCore, SpSolver};
use faer::{Mat, Side};
use tracing::{debug, trace};

use super::error::RegressionError;

/// Relative pivot size below which the information matrix is treated as singular
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Clamp for fitted probabilities so weights never reach exactly zero
const MU_EPSILON: f64 = 1e-12;

/// Standard logistic function `1 / (1 + e^(-x))`
#[inline]
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// IRLS settings
#[derive(Debug, Clone, Copy)]
pub struct LogisticRegression {
    pub max_iterations: usize,
    /// Convergence threshold on `|dev - dev_old| / (|dev| + 0.1)`
    pub tolerance: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-8,
        }
    }
}

/// Raw output of a converged fit, in design-matrix column order
#[derive(Debug, Clone)]
pub struct LogisticFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub deviance: f64,
    pub null_deviance: f64,
    pub iterations: usize,
}

impl LogisticRegression {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Fit `y ~ X` where `y` is 0/1 and `x` already carries the intercept column.
    ///
    /// Starts from `mu = (y + 0.5) / 2` and iterates Newton steps until the
    /// relative deviance change falls below `tolerance`. Standard errors come
    /// from the inverse Fisher information at the final estimate.
    pub fn fit(&self, x: &Mat<f64>, y: &[f64]) -> Result<LogisticFit, RegressionError> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(RegressionError::EmptyInput);
        }

        let mut eta: Vec<f64> = y
            .iter()
            .map(|&yi| {
                let mu = (yi + 0.5) / 2.0;
                (mu / (1.0 - mu)).ln()
            })
            .collect();
        let mut deviance = binomial_deviance(y, &eta);
        let mut last_change = f64::INFINITY;

        for iteration in 1..=self.max_iterations {
            let (information, score) = weighted_normal_equations(x, y, &eta);
            let beta = factorize(&information)?.solve(score.as_ref());

            eta = linear_predictor(x, &beta);
            let new_deviance = binomial_deviance(y, &eta);
            last_change = (new_deviance - deviance).abs() / (new_deviance.abs() + 0.1);
            trace!(iteration, deviance = new_deviance, change = last_change, "IRLS step");
            deviance = new_deviance;

            if last_change < self.tolerance {
                let std_errors = standard_errors(x, &eta)?;
                let null_deviance = null_deviance(y);
                debug!(iteration, deviance, null_deviance, "IRLS converged");

                return Ok(LogisticFit {
                    coefficients: (0..beta.nrows()).map(|i| beta[(i, 0)]).collect(),
                    std_errors,
                    deviance,
                    null_deviance,
                    iterations: iteration,
                });
            }
        }

        Err(RegressionError::NoConvergence {
            iterations: self.max_iterations,
            change: last_change,
        })
    }
}

/// Build `X^T W X` and `X^T W z` for the current linear predictor, where
/// `z = eta + (y - mu) / w` is the working response
fn weighted_normal_equations(x: &Mat<f64>, y: &[f64], eta: &[f64]) -> (Mat<f64>, Mat<f64>) {
    let (n, k) = (x.nrows(), x.ncols());
    let mut weighted_x = Mat::<f64>::zeros(n, k);
    let mut weighted_z = Mat::<f64>::zeros(n, 1);

    for i in 0..n {
        let mu = logistic(eta[i]).clamp(MU_EPSILON, 1.0 - MU_EPSILON);
        let w = mu * (1.0 - mu);
        let z = eta[i] + (y[i] - mu) / w;
        for j in 0..k {
            weighted_x[(i, j)] = w * x[(i, j)];
        }
        weighted_z[(i, 0)] = w * z;
    }

    let xt = x.transpose();
    (xt * &weighted_x, xt * &weighted_z)
}

fn linear_predictor(x: &Mat<f64>, beta: &Mat<f64>) -> Vec<f64> {
    let eta = x * beta;
    (0..eta.nrows()).map(|i| eta[(i, 0)]).collect()
}

fn standard_errors(x: &Mat<f64>, eta: &[f64]) -> Result<Vec<f64>, RegressionError> {
    let zeros = vec![0.0; eta.len()];
    let (information, _) = weighted_normal_equations(x, &zeros, eta);
    let covariance = factorize(&information)?.inverse();

    Ok((0..covariance.nrows())
        .map(|j| covariance[(j, j)].sqrt())
        .collect())
}

/// `-2 * log-likelihood` of 0/1 outcomes under `mu = logistic(eta)`
fn binomial_deviance(y: &[f64], eta: &[f64]) -> f64 {
    -2.0 * y
        .iter()
        .zip(eta)
        .map(|(&yi, &e)| {
            let mu = logistic(e).clamp(MU_EPSILON, 1.0 - MU_EPSILON);
            yi * mu.ln() + (1.0 - yi) * (1.0 - mu).ln()
        })
        .sum::<f64>()
}

/// Deviance of the intercept-only model
fn null_deviance(y: &[f64]) -> f64 {
    let p = y.iter().sum::<f64>() / y.len() as f64;
    let eta = (p / (1.0 - p)).ln();
    binomial_deviance(y, &vec![eta; y.len()])
}

/// Cholesky factorization of the Fisher information.
///
/// A pivot below `PIVOT_TOLERANCE` relative to its diagonal entry flags an
/// empty level or collinear columns. faer only rejects non-positive pivots, so
/// rank deficiency can otherwise survive as rounding noise.
fn factorize(information: &Mat<f64>) -> Result<Cholesky<f64>, RegressionError> {
    let factor = information
        .cholesky(Side::Lower)
        .map_err(|e| RegressionError::SingularDesign {
            pivot: e.non_positive_definite_minor.saturating_sub(1),
            value: 0.0,
        })?;

    let l = factor.compute_l();
    for j in 0..l.nrows() {
        let pivot = l[(j, j)] * l[(j, j)];
        if !(pivot > PIVOT_TOLERANCE * information[(j, j)].abs().max(f64::MIN_POSITIVE)) {
            return Err(RegressionError::SingularDesign { pivot: j, value: pivot });
        }
    }

    Ok(factor)
}
