//! JSON export of the analysis results

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::cli::AnalysisConfig;
use crate::pipeline::{DescriptiveStats, MonthlyCount, RegressionReport};

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub version: String,
    /// Resolved run configuration
    pub config: AnalysisConfig,
}

/// Complete analysis export
#[derive(Serialize)]
pub struct AnalysisExport<'a> {
    pub metadata: ExportMetadata,
    pub descriptive: &'a DescriptiveStats,
    /// Murders per (month, borough), sorted by month then borough
    pub murder_counts: &'a [MonthlyCount],
    pub regression: &'a RegressionReport,
}

impl<'a> AnalysisExport<'a> {
    pub fn new(
        config: &AnalysisConfig,
        descriptive: &'a DescriptiveStats,
        murder_counts: &'a [MonthlyCount],
        regression: &'a RegressionReport,
    ) -> Self {
        Self {
            metadata: ExportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                config: config.clone(),
            },
            descriptive,
            murder_counts,
            regression,
        }
    }
}

/// Write the export as pretty-printed JSON
pub fn export_analysis(export: &AnalysisExport<'_>, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(export).context("Failed to serialize analysis to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis to {}", output_path.display()))?;

    Ok(())
}
