//! Output module for exporting datasets and reporting on them
//!
//! This module handles:
//! - Writing accumulated records to date-stamped CSV files
//! - Reading exported datasets back for later stages
//! - Computing and displaying summary statistics

mod csv_output;
pub mod stats;

pub use csv_output::{
    export_records, latest_dataset, read_dataset, read_records, write_records, ExportError,
    RAW_HEADER,
};
pub use stats::{print_summary, DatasetSummary};
