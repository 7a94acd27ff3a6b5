//! Cleaner module for turning raw datasets into analysis-ready ones
//!
//! This module handles:
//! - Reading a raw dataset and applying the cleaning rules in order
//! - Resolving the GBP to USD exchange rate
//! - Writing the date-stamped clean dataset and reporting what changed

mod rates;
mod report;
mod rules;

pub use rates::{resolve_exchange_rate, FALLBACK_GBP_TO_USD};
pub use report::{print_clean_report, CleanReport};
pub use rules::{clean_records, CleanedBook, PriceBand, MISSING_DESCRIPTION};

use crate::config::Config;
use crate::output::{read_dataset, ExportError};
use chrono::Local;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while cleaning a dataset
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Exchange rate unavailable: {0}")]
    ExchangeRate(String),

    #[error("Failed to read dataset: {0}")]
    Read(#[from] ExportError),

    #[error("Dataset {0} holds no records")]
    EmptyInput(String),
}

/// The clean dataset's column order; consumers rely on it exactly
pub const CLEAN_HEADER: [&str; 12] = [
    "title",
    "category",
    "price_gbp",
    "price_usd",
    "price_band",
    "rating",
    "availability",
    "in_stock",
    "stock_quantity",
    "upc",
    "product_page_url",
    "description",
];

/// Writes cleaned records as CSV to any writer
pub fn write_cleaned<W: io::Write>(writer: W, records: &[CleanedBook]) -> Result<(), CleanError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CLEAN_HEADER)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Writes the clean dataset to a date-stamped file in the given directory
///
/// The directory is created if missing. The file is named
/// `books_clean_YYYYMMDD.csv` after the local date.
pub fn export_cleaned(records: &[CleanedBook], dir: &Path) -> Result<PathBuf, CleanError> {
    std::fs::create_dir_all(dir)?;

    let filename = format!("books_clean_{}.csv", Local::now().format("%Y%m%d"));
    let path = dir.join(filename);

    let file = File::create(&path)?;
    write_cleaned(file, records)?;

    Ok(path)
}

/// Runs the cleaning stage end to end
///
/// Reads the raw dataset, resolves the exchange rate, applies every
/// cleaning rule, and writes the clean dataset to the configured
/// directory.
///
/// # Arguments
///
/// * `config` - Validated application configuration
/// * `input` - Path to the raw dataset to clean
///
/// # Returns
///
/// * `Ok((CleanReport, PathBuf))` - Tallies and the clean dataset's path
/// * `Err(CleanError)` - Reading, cleaning, or writing failed
pub async fn run_clean(config: &Config, input: &Path) -> Result<(CleanReport, PathBuf), CleanError> {
    let records = read_dataset(input)?;
    if records.is_empty() {
        return Err(CleanError::EmptyInput(input.display().to_string()));
    }

    tracing::info!(
        input = %input.display(),
        rows = records.len(),
        "cleaning dataset"
    );

    let exchange_rate = resolve_exchange_rate(&config.cleaning).await;
    let (cleaned, report) = clean_records(records, exchange_rate);

    let path = export_cleaned(&cleaned, Path::new(&config.output.clean_dir))?;
    tracing::info!(
        path = %path.display(),
        rows = report.final_rows,
        "clean dataset written"
    );

    Ok((report, path))
}
