//! Cleaning pipeline: projection, murder filter, missing-value imputation and
//! month truncation of the occurrence date.
//!
//! Every step takes a `&DataFrame` and returns a new one, so the order of
//! operations is explicit in [`clean`].

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::{debug, warn};

use super::schema::{
    DROPPED_COLUMNS, IMPUTED_COLUMNS, IMPUTED_LABEL, MISSING_ENCODINGS, MONTH_YEAR, MURDER_FLAG,
    MURDER_FLAG_TRUE, OCCUR_DATE, OCCUR_DATE_FORMAT,
};

/// `NaiveDate::num_days_from_ce` of 1970-01-01; polars stores dates as days since epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Result of the cleaning pipeline
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    /// Cleaned murder records with `MONTH_YEAR` attached
    pub data: DataFrame,
    /// Murder rows removed because `OCCUR_DATE` did not parse as month/day/year
    pub dropped_unparsed_dates: usize,
}

/// Run the full cleaning chain on the raw incident table.
///
/// Rows whose `OCCUR_DATE` fails strict `%m/%d/%Y` parsing are dropped and
/// counted, so every row of the result carries a non-null `MONTH_YEAR`.
pub fn clean(raw: &DataFrame) -> Result<CleanOutcome> {
    let projected = project_columns(raw)?;
    let murders = filter_murders(&projected)?;
    let normalized = normalize_missing(&murders, &IMPUTED_COLUMNS)?;
    let imputed = impute_missing(&normalized, &IMPUTED_COLUMNS, IMPUTED_LABEL)?;
    let dated = derive_month_year(&imputed)?;

    let before = dated.height();
    let data = dated
        .lazy()
        .filter(col(MONTH_YEAR).is_not_null())
        .collect()
        .context("Failed to drop rows with unparseable OCCUR_DATE")?;
    let dropped_unparsed_dates = before - data.height();

    if dropped_unparsed_dates > 0 {
        warn!(
            dropped = dropped_unparsed_dates,
            "dropped murder rows whose OCCUR_DATE is not month/day/year"
        );
    }

    debug!(rows = data.height(), cols = data.width(), "cleaning complete");

    Ok(CleanOutcome {
        data,
        dropped_unparsed_dates,
    })
}

/// Drop the identifier, geo-coordinate and jurisdiction columns.
///
/// Columns from [`DROPPED_COLUMNS`] that are absent are ignored; every other
/// column keeps its position and row order is unchanged.
pub fn project_columns(df: &DataFrame) -> Result<DataFrame> {
    let present: Vec<&str> = DROPPED_COLUMNS
        .iter()
        .copied()
        .filter(|name| df.get_column_index(name).is_some())
        .collect();

    if present.len() < DROPPED_COLUMNS.len() {
        debug!(
            dropped = present.len(),
            expected = DROPPED_COLUMNS.len(),
            "some identifier/geo columns were not in the dataset"
        );
    }

    Ok(df.drop_many(present))
}

/// Keep rows whose murder flag upper-cases to the literal "TRUE".
///
/// The comparison is string based on purpose: the source does not guarantee a
/// boolean encoding or consistent casing. A null flag is not a murder.
pub fn filter_murders(df: &DataFrame) -> Result<DataFrame> {
    df.clone()
        .lazy()
        .filter(
            col(MURDER_FLAG)
                .cast(DataType::String)
                .str()
                .to_uppercase()
                .eq(lit(MURDER_FLAG_TRUE)),
        )
        .collect()
        .with_context(|| format!("Failed to filter on {}", MURDER_FLAG))
}

/// Collapse every missing encoding ("", "(null)") to null in the given columns
pub fn normalize_missing(df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let exprs: Vec<Expr> = columns
        .iter()
        .map(|&name| {
            let is_missing = MISSING_ENCODINGS
                .iter()
                .fold(lit(false), |acc, encoding| acc.or(col(name).eq(lit(*encoding))));

            when(is_missing)
                .then(lit(NULL).cast(DataType::String))
                .otherwise(col(name))
                .alias(name)
        })
        .collect();

    df.clone()
        .lazy()
        .with_columns(exprs)
        .collect()
        .context("Failed to normalize missing values")
}

/// Replace nulls with `label` in the given columns.
///
/// Must run after [`normalize_missing`]; raw encodings left in place would
/// survive as categories of their own.
pub fn impute_missing(df: &DataFrame, columns: &[&str], label: &str) -> Result<DataFrame> {
    let exprs: Vec<Expr> = columns
        .iter()
        .map(|&name| col(name).fill_null(lit(label)).alias(name))
        .collect();

    df.clone()
        .lazy()
        .with_columns(exprs)
        .collect()
        .context("Failed to impute missing values")
}

/// Attach `MONTH_YEAR`: the first day of the month of `OCCUR_DATE`.
///
/// Values that do not parse under strict `%m/%d/%Y` become null.
pub fn derive_month_year(df: &DataFrame) -> Result<DataFrame> {
    let dates = df
        .column(OCCUR_DATE)
        .with_context(|| format!("Column '{}' not found", OCCUR_DATE))?
        .cast(&DataType::String)?;

    let days: Vec<Option<i32>> = dates
        .str()?
        .into_iter()
        .map(|value| value.and_then(month_start).map(days_since_epoch))
        .collect();

    let month_year = Series::new(MONTH_YEAR.into(), days).cast(&DataType::Date)?;

    let mut out = df.clone();
    out.with_column(month_year)?;
    Ok(out)
}

/// Parse a month/day/year string and truncate it to the first of its month.
///
/// The year must be exactly four digits and the value carries no surrounding
/// whitespace; chrono alone would read `03/17/20` as year 20.
pub fn month_start(raw: &str) -> Option<NaiveDate> {
    let year = raw.rsplit('/').next()?;
    if raw.trim() != raw || year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let date = NaiveDate::parse_from_str(raw, OCCUR_DATE_FORMAT).ok()?;
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

/// Convert a polars physical date (days since 1970-01-01) back to a calendar date
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}
