//! Treatment-contrast encoding of a single categorical predictor

use faer::Mat;

use super::error::RegressionError;

/// Term name of the intercept column
pub const INTERCEPT: &str = "(Intercept)";

/// Categorical predictor with an explicit baseline level.
///
/// The baseline is absorbed into the intercept; every other level gets an
/// indicator column. Non-baseline levels are ordered lexicographically.
#[derive(Debug, Clone)]
pub struct CategoricalPredictor {
    pub name: String,
    pub reference: String,
    /// Non-reference levels in design-matrix order
    pub levels: Vec<String>,
    /// Per row: 0 for the reference, `i + 1` for `levels[i]`
    codes: Vec<usize>,
}

impl CategoricalPredictor {
    pub fn new(name: &str, values: &[&str], reference: &str) -> Result<Self, RegressionError> {
        if values.is_empty() {
            return Err(RegressionError::EmptyInput);
        }

        let mut observed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        observed.sort();
        observed.dedup();

        if !observed.iter().any(|level| level == reference) {
            return Err(RegressionError::MissingReference {
                predictor: name.to_string(),
                reference: reference.to_string(),
                levels: observed,
            });
        }

        let levels: Vec<String> = observed.into_iter().filter(|l| l != reference).collect();
        if levels.is_empty() {
            return Err(RegressionError::SingleLevel {
                predictor: name.to_string(),
                level: reference.to_string(),
            });
        }

        let codes = values
            .iter()
            .map(|&value| {
                levels
                    .binary_search_by(|level| level.as_str().cmp(value))
                    .map(|idx| idx + 1)
                    .unwrap_or(0)
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            reference: reference.to_string(),
            levels,
            codes,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.codes.len()
    }

    /// Intercept plus one contrast per non-reference level
    pub fn n_terms(&self) -> usize {
        self.levels.len() + 1
    }

    /// Term names in design-matrix column order
    pub fn term_names(&self) -> Vec<String> {
        std::iter::once(INTERCEPT.to_string())
            .chain(self.levels.iter().cloned())
            .collect()
    }

    /// Level name of the given design column (column 0 is the reference)
    pub fn level_name(&self, code: usize) -> &str {
        if code == 0 {
            &self.reference
        } else {
            &self.levels[code - 1]
        }
    }

    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    /// Dense n x k design matrix: a column of ones followed by level indicators
    pub fn design_matrix(&self) -> Mat<f64> {
        let codes = &self.codes;
        Mat::from_fn(self.n_rows(), self.n_terms(), |i, j| {
            if j == 0 || codes[i] == j {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Row and event counts per level, reference first
    pub fn level_counts(&self, outcome: &[f64]) -> Vec<LevelCount> {
        let mut counts: Vec<LevelCount> = (0..self.n_terms())
            .map(|code| LevelCount {
                level: self.level_name(code).to_string(),
                rows: 0,
                events: 0,
            })
            .collect();

        for (&code, &y) in self.codes.iter().zip(outcome) {
            counts[code].rows += 1;
            if y > 0.5 {
                counts[code].events += 1;
            }
        }

        counts
    }

    /// Fail on any level whose outcome never varies.
    ///
    /// With a saturated categorical model such a level has an infinite
    /// maximum-likelihood log-odds, so IRLS would drift instead of converging.
    pub fn check_separation(&self, outcome: &[f64]) -> Result<(), RegressionError> {
        for count in self.level_counts(outcome) {
            if count.events == 0 || count.events == count.rows {
                return Err(RegressionError::PerfectSeparation {
                    level: count.level,
                    events: count.events,
                    rows: count.rows,
                });
            }
        }
        Ok(())
    }
}

/// Observations and outcome events for one predictor level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCount {
    pub level: String,
    pub rows: usize,
    pub events: usize,
}
