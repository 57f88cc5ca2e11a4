//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::schema::{DATASET_URL, DEFAULT_REFERENCE_CATEGORY};
use crate::pipeline::DataSource;

/// shooting-eda - Exploratory analysis of NYPD shooting incidents
#[derive(Parser, Debug)]
#[command(name = "shooting-eda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// URL of the incident CSV to download
    #[arg(long, default_value = DATASET_URL)]
    pub url: String,

    /// Local CSV file to analyze instead of downloading (overrides --url)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Baseline victim race for the regression; its effect is absorbed into the intercept.
    /// Matched case-insensitively against the data (values are upper-case).
    #[arg(short, long, default_value = DEFAULT_REFERENCE_CATEGORY)]
    pub reference: String,

    /// Directory the three PNG charts are written to
    #[arg(long, default_value = "charts")]
    pub charts_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long, default_value = "false")]
    pub no_charts: bool,

    /// Write descriptive statistics, murder counts and coefficients to this JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Maximum IRLS iterations for the logistic regression
    #[arg(long, default_value = "25", value_parser = validate_max_iterations)]
    pub max_iterations: usize,

    /// Relative deviance change below which IRLS is considered converged
    #[arg(long, default_value = "1e-8", value_parser = validate_tolerance)]
    pub tolerance: f64,

    /// Increase diagnostic log verbosity on stderr (-v info, -vv debug, -vvv trace).
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Local file wins over the URL
    pub fn source(&self) -> DataSource {
        match &self.input {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Url(self.url.clone()),
        }
    }

    /// Chart directory, or None when charts are disabled
    pub fn charts_dir(&self) -> Option<PathBuf> {
        if self.no_charts {
            None
        } else {
            Some(self.charts_dir.clone())
        }
    }

    /// Default tracing filter derived from `-v` occurrences
    pub fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        format!("shooting_eda={}", level)
    }
}

/// Validator for max_iterations parameter
fn validate_max_iterations(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid iteration count", s))?;

    if value == 0 {
        Err("max_iterations must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for tolerance parameter
fn validate_tolerance(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value.is_finite() && value > 0.0) {
        Err(format!("tolerance must be a positive number, got {}", value))
    } else {
        Ok(value)
    }
}
