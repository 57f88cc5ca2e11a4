//! Error types for the logistic regression fit.
//!
//! Degenerate inputs get their own variants so callers can tell them apart
//! from I/O or table errors and never mistake them for a valid fit.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegressionError {
    /// No complete observations were left to fit
    #[error("no observations available for the regression")]
    EmptyInput,

    /// Column required by the model is absent
    #[error("column '{0}' not found")]
    MissingColumn(String),

    /// Outcome column holds something other than 0/1
    #[error("outcome '{column}' must be binary 0/1, found {value}")]
    NonBinaryOutcome { column: String, value: i64 },

    /// Requested reference category was never observed
    #[error("reference category '{reference}' not observed in '{predictor}' (levels: {levels:?})")]
    MissingReference {
        predictor: String,
        reference: String,
        levels: Vec<String>,
    },

    /// Nothing to contrast against the baseline
    #[error("predictor '{predictor}' has a single level '{level}'; at least two are required")]
    SingleLevel { predictor: String, level: String },

    /// A level whose outcome is constant; its maximum-likelihood estimate is infinite
    #[error(
        "perfect separation: level '{level}' has {events} event(s) in {rows} row(s); \
         its coefficient would diverge"
    )]
    PerfectSeparation {
        level: String,
        events: usize,
        rows: usize,
    },

    /// Fisher information matrix is not positive definite
    #[error("singular design matrix: pivot {pivot} is {value:e}")]
    SingularDesign { pivot: usize, value: f64 },

    /// IRLS ran out of iterations
    #[error("IRLS did not converge after {iterations} iterations (last relative deviance change {change:e})")]
    NoConvergence { iterations: usize, change: f64 },

    /// Estimate or standard error came out NaN or infinite
    #[error("non-finite estimate for term '{term}'")]
    NonFiniteEstimate { term: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl RegressionError {
    /// True for inputs on which a logistic fit is not well defined, as opposed
    /// to table access failures
    pub fn is_degenerate(&self) -> bool {
        !matches!(
            self,
            RegressionError::MissingColumn(_) | RegressionError::Polars(_)
        )
    }
}
