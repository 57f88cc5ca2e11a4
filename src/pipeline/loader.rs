//! Dataset loader: one-shot HTTP download or local CSV file

use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::schema::REQUIRED_COLUMNS;
use crate::utils::{create_download_bar, create_spinner};

/// Upper bound for the whole download, the dataset is a few tens of MB at most
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Where the raw incident table comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the raw dataset with a progress indicator.
///
/// Returns the DataFrame together with its row count, column count and
/// estimated memory footprint in MB. Any transport or parse failure aborts.
pub fn load_dataset_with_progress(source: &DataSource) -> Result<(DataFrame, usize, usize, f64)> {
    let bytes = match source {
        DataSource::Url(url) => download_csv(url)?,
        DataSource::File(path) => read_csv_file(path)?,
    };

    let spinner = create_spinner("Parsing CSV...");
    let df = parse_csv(bytes)?;
    spinner.finish_and_clear();

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    info!(rows, cols, memory_mb, "dataset loaded");

    Ok((df, rows, cols, memory_mb))
}

/// Load the raw dataset without any terminal output
pub fn load_dataset(source: &DataSource) -> Result<DataFrame> {
    let bytes = match source {
        DataSource::Url(url) => fetch(url)?.bytes()?.to_vec(),
        DataSource::File(path) => read_csv_file(path)?,
    };
    parse_csv(bytes)
}

/// Parse an in-memory CSV document with a header row.
///
/// Every column is read as a string column; the cleaner decides how each
/// value is interpreted.
pub fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("Failed to parse CSV data")
}

/// Verify that every column read by the cleaner and analyzer is present
pub fn validate_schema(df: &DataFrame) -> Result<()> {
    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !column_names.iter().any(|c| c == required))
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "Dataset is missing required column(s) {:?}. Available columns: {:?}",
            missing,
            column_names
        );
    }

    Ok(())
}

fn fetch(url: &str) -> Result<reqwest::blocking::Response> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    debug!(url, "GET");
    client
        .get(url)
        .send()
        .with_context(|| format!("Failed to download dataset from {}", url))?
        .error_for_status()
        .with_context(|| format!("Server rejected dataset request for {}", url))
}

fn download_csv(url: &str) -> Result<Vec<u8>> {
    let response = fetch(url)?;

    let pb = match response.content_length() {
        Some(len) => create_download_bar(len, "Downloading"),
        None => create_spinner("Downloading dataset..."),
    };

    let mut bytes = Vec::new();
    pb.wrap_read(response)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read response body from {}", url))?;
    pb.finish_and_clear();

    debug!(bytes = bytes.len(), "download complete");
    Ok(bytes)
}

fn read_csv_file(path: &Path) -> Result<Vec<u8>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "csv" {
        anyhow::bail!("Unsupported file format: {}. Supported formats: csv", extension);
    }

    std::fs::read(path).with_context(|| format!("Failed to load CSV file: {}", path.display()))
}
