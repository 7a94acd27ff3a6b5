//! CSV dataset writer and reader
//!
//! This module serializes accumulated records into the raw dataset file and
//! reads such files back for statistics and cleaning:
//! - Fixed column order, UTF-8, header row always present
//! - Absent descriptions and unknown stock quantities become empty fields
//! - Date-stamped file naming under the configured output directory

use crate::record::BookRecord;
use chrono::Local;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while writing or reading a dataset
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No dataset found in {0}")]
    NoDataset(String),
}

/// The raw dataset's column order; consumers rely on it exactly
pub const RAW_HEADER: [&str; 9] = [
    "title",
    "category",
    "price_gbp",
    "rating",
    "availability",
    "stock_quantity",
    "upc",
    "product_page_url",
    "description",
];

/// Writes records as CSV to any writer
///
/// # Arguments
///
/// * `writer` - Destination for the CSV bytes
/// * `records` - The records to serialize, written in slice order
///
/// # Returns
///
/// * `Ok(())` - All rows written and flushed
/// * `Err(ExportError)` - Serialization or IO failure
pub fn write_records<W: io::Write>(writer: W, records: &[BookRecord]) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(RAW_HEADER)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Reads records back from CSV produced by [`write_records`]
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<BookRecord>, ExportError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Reads a dataset file into records
///
/// # Arguments
///
/// * `path` - Path to a CSV file with the raw dataset schema
pub fn read_dataset(path: &Path) -> Result<Vec<BookRecord>, ExportError> {
    let file = File::open(path)?;
    read_records(file)
}

/// Writes the dataset to a date-stamped file in the given directory
///
/// The directory is created if missing. The file is named
/// `books_raw_YYYYMMDD.csv` after the local date, so one run per day
/// overwrites, and runs on different days accumulate.
///
/// # Arguments
///
/// * `records` - The records to export
/// * `dir` - Output directory for raw datasets
///
/// # Returns
///
/// * `Ok(PathBuf)` - The path written
/// * `Err(ExportError)` - Directory creation, file, or serialization failure
pub fn export_records(records: &[BookRecord], dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;

    let filename = format!("books_raw_{}.csv", Local::now().format("%Y%m%d"));
    let path = dir.join(filename);

    let file = File::create(&path)?;
    write_records(file, records)?;

    Ok(path)
}

/// Finds the newest raw dataset in a directory
///
/// Date-stamped names sort lexicographically, so the greatest matching
/// filename is the newest.
pub fn latest_dataset(dir: &Path) -> Result<PathBuf, ExportError> {
    let mut newest: Option<PathBuf> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("books_raw_") && name.ends_with(".csv") {
            let path = entry.path();
            if newest.as_ref().map_or(true, |best| path > *best) {
                newest = Some(path);
            }
        }
    }

    newest.ok_or_else(|| ExportError::NoDataset(dir.display().to_string()))
}
