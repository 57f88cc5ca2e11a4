//! Resolved run configuration

use std::path::PathBuf;

use serde::Serialize;

use super::Cli;
use crate::pipeline::{DataSource, RegressionOptions};

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    pub source: DataSource,
    pub regression: RegressionOptions,
    /// None when chart rendering is disabled
    pub charts_dir: Option<PathBuf>,
    pub export: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            source: cli.source(),
            regression: RegressionOptions {
                reference: cli.reference.trim().to_uppercase(),
                max_iterations: cli.max_iterations,
                tolerance: cli.tolerance,
            },
            charts_dir: cli.charts_dir(),
            export: cli.export.clone(),
        }
    }
}
