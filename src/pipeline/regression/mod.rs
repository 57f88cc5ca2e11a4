//! Logistic regression of undocumented perpetrator race on victim race.
//!
//! Fits `PERP_RACE_MISSING ~ VIC_RACE` (binomial, logit link) with a
//! configurable baseline level and turns the coefficients into odds ratios,
//! Wald intervals and predicted probabilities.

mod design;
mod error;
mod irls;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use super::schema::{DEFAULT_REFERENCE_CATEGORY, IMPUTED_LABEL, PERP_RACE, PERP_RACE_MISSING, VIC_RACE};

pub use design::{CategoricalPredictor, LevelCount, INTERCEPT};
pub use error::RegressionError;
pub use irls::{logistic, LogisticFit, LogisticRegression};

/// Two-sided 95% normal quantile used for Wald intervals
pub const WALD_Z_95: f64 = 1.96;

/// Model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionOptions {
    /// Baseline level of the victim race predictor
    pub reference: String,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        let solver = LogisticRegression::default();
        Self {
            reference: DEFAULT_REFERENCE_CATEGORY.to_string(),
            max_iterations: solver.max_iterations,
            tolerance: solver.tolerance,
        }
    }
}

/// One row of the coefficient table
#[derive(Debug, Clone, Serialize)]
pub struct CoefficientRow {
    pub term: String,
    /// Log-odds estimate
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
    /// Wald 95% interval on the log-odds scale
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub odds_ratio: f64,
    pub odds_ratio_lower: f64,
    pub odds_ratio_upper: f64,
    /// `logistic(intercept)` for the intercept row, `logistic(intercept + estimate)` otherwise
    pub predicted_probability: f64,
}

impl CoefficientRow {
    pub fn is_intercept(&self) -> bool {
        self.term == INTERCEPT
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Fitted model with its derived coefficient table
#[derive(Debug, Clone, Serialize)]
pub struct RegressionReport {
    pub response: String,
    pub predictor: String,
    pub reference: String,
    pub observations: usize,
    /// Rows dropped because the predictor was null
    pub dropped_incomplete: usize,
    pub iterations: usize,
    pub deviance: f64,
    pub null_deviance: f64,
    pub aic: f64,
    pub levels: Vec<LevelSummary>,
    pub coefficients: Vec<CoefficientRow>,
}

/// Observed outcome rate of one predictor level
#[derive(Debug, Clone, Serialize)]
pub struct LevelSummary {
    pub level: String,
    pub rows: usize,
    pub events: usize,
    pub event_rate: f64,
}

impl RegressionReport {
    pub fn intercept(&self) -> Option<&CoefficientRow> {
        self.coefficients.iter().find(|row| row.is_intercept())
    }

    /// Non-intercept rows
    pub fn contrasts(&self) -> impl Iterator<Item = &CoefficientRow> {
        self.coefficients.iter().filter(|row| !row.is_intercept())
    }

    /// The coefficient table as a DataFrame, one row per term
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = &self.coefficients;
        let pick = |f: fn(&CoefficientRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

        df! {
            "term" => rows.iter().map(|r| r.term.as_str()).collect::<Vec<_>>(),
            "estimate" => pick(|r| r.estimate),
            "odds_ratio" => pick(|r| r.odds_ratio),
            "std_error" => pick(|r| r.std_error),
            "z_value" => pick(|r| r.z_value),
            "p_value" => pick(|r| r.p_value),
            "ci_lower" => pick(|r| r.ci_lower),
            "ci_upper" => pick(|r| r.ci_upper),
            "odds_ratio_lower" => pick(|r| r.odds_ratio_lower),
            "odds_ratio_upper" => pick(|r| r.odds_ratio_upper),
            "predicted_probability" => pick(|r| r.predicted_probability),
        }
    }
}

/// Attach `PERP_RACE_MISSING`: 1 when `PERP_RACE` is the imputed label, else 0
pub fn derive_missing_indicator(cleaned: &DataFrame) -> Result<DataFrame, RegressionError> {
    if cleaned.get_column_index(PERP_RACE).is_none() {
        return Err(RegressionError::MissingColumn(PERP_RACE.to_string()));
    }

    let out = cleaned
        .clone()
        .lazy()
        .with_column(
            when(col(PERP_RACE).eq(lit(IMPUTED_LABEL)))
                .then(lit(1i32))
                .otherwise(lit(0i32))
                .alias(PERP_RACE_MISSING),
        )
        .collect()?;

    Ok(out)
}

/// Fit the undocumented-perpetrator-race model on the cleaned murder table
pub fn fit_missing_race_model(
    cleaned: &DataFrame,
    options: &RegressionOptions,
) -> Result<RegressionReport, RegressionError> {
    if cleaned.get_column_index(VIC_RACE).is_none() {
        return Err(RegressionError::MissingColumn(VIC_RACE.to_string()));
    }

    let with_indicator = derive_missing_indicator(cleaned)?;
    let complete = with_indicator
        .lazy()
        .filter(col(VIC_RACE).is_not_null())
        .collect()?;
    let dropped_incomplete = cleaned.height() - complete.height();
    if dropped_incomplete > 0 {
        warn!(dropped = dropped_incomplete, "rows without {} left out of the model", VIC_RACE);
    }

    let race = complete.column(VIC_RACE)?.cast(&DataType::String)?;
    let values: Vec<&str> = race.str()?.into_no_null_iter().collect();
    let outcome = outcome_values(&complete, PERP_RACE_MISSING)?;

    fit_categorical(VIC_RACE, &values, PERP_RACE_MISSING, &outcome, options).map(|mut report| {
        report.dropped_incomplete = dropped_incomplete;
        report
    })
}

/// Fit `outcome ~ predictor` for one categorical predictor and derive the
/// coefficient table
pub fn fit_categorical(
    predictor_name: &str,
    values: &[&str],
    response_name: &str,
    outcome: &[f64],
    options: &RegressionOptions,
) -> Result<RegressionReport, RegressionError> {
    if values.is_empty() {
        return Err(RegressionError::EmptyInput);
    }

    let predictor = CategoricalPredictor::new(predictor_name, values, &options.reference)?;
    predictor.check_separation(outcome)?;

    let solver = LogisticRegression::new(options.max_iterations, options.tolerance);
    let fit = solver.fit(&predictor.design_matrix(), outcome)?;
    debug!(
        iterations = fit.iterations,
        deviance = fit.deviance,
        "fitted {} ~ {}",
        response_name,
        predictor_name
    );

    let coefficients = coefficient_table(&predictor.term_names(), &fit)?;
    let levels = predictor
        .level_counts(outcome)
        .into_iter()
        .map(|count| LevelSummary {
            event_rate: count.events as f64 / count.rows as f64,
            level: count.level,
            rows: count.rows,
            events: count.events,
        })
        .collect();

    Ok(RegressionReport {
        response: response_name.to_string(),
        predictor: predictor_name.to_string(),
        reference: options.reference.clone(),
        observations: predictor.n_rows(),
        dropped_incomplete: 0,
        iterations: fit.iterations,
        deviance: fit.deviance,
        null_deviance: fit.null_deviance,
        aic: fit.deviance + 2.0 * predictor.n_terms() as f64,
        levels,
        coefficients,
    })
}

/// Derive odds ratios, Wald intervals, p-values and predicted probabilities.
///
/// Every non-intercept probability composes additively with the intercept:
/// `logistic(b0 + bj)`, never `logistic(bj)`.
pub fn coefficient_table(
    terms: &[String],
    fit: &LogisticFit,
) -> Result<Vec<CoefficientRow>, RegressionError> {
    let normal = Normal::standard();
    let intercept = fit.coefficients[0];

    terms
        .iter()
        .zip(fit.coefficients.iter().zip(&fit.std_errors))
        .enumerate()
        .map(|(idx, (term, (&estimate, &std_error)))| {
            if !estimate.is_finite() || !std_error.is_finite() {
                return Err(RegressionError::NonFiniteEstimate { term: term.clone() });
            }

            let z_value = estimate / std_error;
            let ci_lower = estimate - WALD_Z_95 * std_error;
            let ci_upper = estimate + WALD_Z_95 * std_error;
            let linear = if idx == 0 { intercept } else { intercept + estimate };

            Ok(CoefficientRow {
                term: term.clone(),
                estimate,
                std_error,
                z_value,
                p_value: 2.0 * normal.sf(z_value.abs()),
                ci_lower,
                ci_upper,
                odds_ratio: estimate.exp(),
                odds_ratio_lower: ci_lower.exp(),
                odds_ratio_upper: ci_upper.exp(),
                predicted_probability: logistic(linear),
            })
        })
        .collect()
}

/// Read a 0/1 integer column as f64 outcomes
fn outcome_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, RegressionError> {
    let column = df
        .column(name)
        .map_err(|_| RegressionError::MissingColumn(name.to_string()))?
        .cast(&DataType::Int64)?;

    column
        .i64()?
        .into_iter()
        .map(|value| match value {
            Some(0) => Ok(0.0),
            Some(1) => Ok(1.0),
            Some(other) => Err(RegressionError::NonBinaryOutcome {
                column: name.to_string(),
                value: other,
            }),
            None => Err(RegressionError::NonBinaryOutcome {
                column: name.to_string(),
                value: i64::MIN,
            }),
        })
        .collect()
}
