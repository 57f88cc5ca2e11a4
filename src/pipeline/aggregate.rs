//! Monthly murder counts per borough

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

use super::cleaner::date_from_days;
use super::schema::{BORO, COUNT, MONTH_YEAR};

/// One observed (month, borough) combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month_year: NaiveDate,
    pub borough: String,
    pub count: u64,
}

/// Group the cleaned murders by (`MONTH_YEAR`, `BORO`) and count rows.
///
/// Only observed combinations are materialized. Output is sorted by month,
/// then borough.
pub fn aggregate_murder_counts(cleaned: &DataFrame) -> Result<DataFrame> {
    cleaned
        .clone()
        .lazy()
        .group_by([col(MONTH_YEAR), col(BORO)])
        .agg([len().cast(DataType::UInt64).alias(COUNT)])
        .sort([MONTH_YEAR, BORO], SortMultipleOptions::default())
        .collect()
        .context("Failed to aggregate murder counts")
}

/// Typed view of the aggregate table for charting and export
pub fn monthly_counts(counts: &DataFrame) -> Result<Vec<MonthlyCount>> {
    let months = counts
        .column(MONTH_YEAR)
        .with_context(|| format!("Column '{}' not found", MONTH_YEAR))?
        .cast(&DataType::Int32)?;
    let boroughs = counts
        .column(BORO)
        .with_context(|| format!("Column '{}' not found", BORO))?
        .cast(&DataType::String)?;
    let totals = counts
        .column(COUNT)
        .with_context(|| format!("Column '{}' not found", COUNT))?
        .cast(&DataType::UInt64)?;

    months
        .i32()?
        .into_iter()
        .zip(boroughs.str()?.into_iter())
        .zip(totals.u64()?.into_iter())
        .map(|((days, borough), count)| {
            let month_year = days
                .and_then(date_from_days)
                .context("Aggregate row without a valid MONTH_YEAR")?;
            Ok(MonthlyCount {
                month_year,
                borough: borough.unwrap_or_default().to_string(),
                count: count.unwrap_or(0),
            })
        })
        .collect()
}

/// Sum of the `Count` column
pub fn total_count(counts: &DataFrame) -> Result<u64> {
    let totals = counts.column(COUNT)?.cast(&DataType::UInt64)?;
    Ok(totals.u64()?.into_no_null_iter().sum())
}
