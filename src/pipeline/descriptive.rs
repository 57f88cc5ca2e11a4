//! Descriptive statistics over the raw and cleaned incident tables

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::cleaner::CleanOutcome;
use super::schema::{
    BORO, IMPUTED_LABEL, PERP_RACE, UNRECORDED_LABEL, VIC_AGE_GROUP, VIC_RACE, VIC_SEX,
};

/// Count of rows sharing one category value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Murders of one (victim race, victim age group) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeRaceCount {
    pub victim_race: String,
    pub victim_age_group: String,
    pub count: usize,
}

/// Undocumented perpetrator race share within one victim race
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRaceShare {
    pub victim_race: String,
    pub murders: usize,
    pub perp_race_missing: usize,
    pub share: f64,
}

/// Summary numbers answering the descriptive part of the report
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub total_incidents: usize,
    pub murders: usize,
    /// Murders as a fraction of all incidents (before the date policy)
    pub murder_share: f64,
    pub dropped_unparsed_dates: usize,
    pub by_borough: Vec<CategoryCount>,
    pub by_victim_race: Vec<CategoryCount>,
    pub by_victim_sex: Vec<CategoryCount>,
    pub age_by_race: Vec<AgeRaceCount>,
    pub missing_perp_race: Vec<MissingRaceShare>,
}

/// Compute every descriptive table from the raw and cleaned data
pub fn describe(raw: &DataFrame, cleaned: &CleanOutcome) -> Result<DescriptiveStats> {
    let data = &cleaned.data;
    let total_incidents = raw.height();
    let murders = data.height() + cleaned.dropped_unparsed_dates;
    let murder_share = if total_incidents > 0 {
        murders as f64 / total_incidents as f64
    } else {
        0.0
    };

    Ok(DescriptiveStats {
        total_incidents,
        murders,
        murder_share,
        dropped_unparsed_dates: cleaned.dropped_unparsed_dates,
        by_borough: category_counts(data, BORO)?,
        by_victim_race: category_counts(data, VIC_RACE)?,
        by_victim_sex: category_counts(data, VIC_SEX)?,
        age_by_race: age_by_race(data)?,
        missing_perp_race: missing_perp_race_by_victim_race(data)?,
    })
}

/// Row counts per value of `column`, largest first, ties by name.
/// Nulls are reported as [`UNRECORDED_LABEL`], apart from the imputed label.
pub fn category_counts(df: &DataFrame, column: &str) -> Result<Vec<CategoryCount>> {
    let grouped = df
        .clone()
        .lazy()
        .group_by([col(column).cast(DataType::String).fill_null(lit(UNRECORDED_LABEL))])
        .agg([len().cast(DataType::UInt64).alias("n")])
        .collect()
        .with_context(|| format!("Failed to count values of '{}'", column))?;

    let names = grouped.column(column)?.str()?.clone();
    let counts = grouped.column("n")?.u64()?.clone();

    let mut out: Vec<CategoryCount> = names
        .into_iter()
        .zip(counts.into_iter())
        .map(|(name, n)| CategoryCount {
            category: name.unwrap_or(UNRECORDED_LABEL).to_string(),
            count: n.unwrap_or(0) as usize,
        })
        .collect();

    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    Ok(out)
}

/// Victim age group distribution within each victim race, sorted by race
/// then age group
pub fn age_by_race(df: &DataFrame) -> Result<Vec<AgeRaceCount>> {
    let races = string_values(df, VIC_RACE)?;
    let ages = string_values(df, VIC_AGE_GROUP)?;

    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for (race, age) in races.into_iter().zip(ages) {
        *counts.entry((race, age)).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|((victim_race, victim_age_group), count)| AgeRaceCount {
            victim_race,
            victim_age_group,
            count,
        })
        .collect())
}

/// Share of murders with undocumented perpetrator race, per victim race
pub fn missing_perp_race_by_victim_race(df: &DataFrame) -> Result<Vec<MissingRaceShare>> {
    let races = string_values(df, VIC_RACE)?;
    let perp = string_values(df, PERP_RACE)?;

    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for (race, perp_race) in races.into_iter().zip(perp) {
        let entry = counts.entry(race).or_insert((0, 0));
        entry.0 += 1;
        if perp_race == IMPUTED_LABEL {
            entry.1 += 1;
        }
    }

    Ok(counts
        .into_iter()
        .map(|(victim_race, (murders, missing))| MissingRaceShare {
            victim_race,
            murders,
            perp_race_missing: missing,
            share: missing as f64 / murders as f64,
        })
        .collect())
}

fn string_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values = df
        .column(column)
        .with_context(|| format!("Column '{}' not found", column))?
        .cast(&DataType::String)?;

    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(UNRECORDED_LABEL).to_string())
        .collect())
}
