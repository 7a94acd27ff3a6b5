//! Cleaning run report
//!
//! Tallies describing what a cleaning pass did to a dataset.

/// Summary of a cleaning run
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    /// Rows read from the raw dataset
    pub initial_rows: usize,

    /// Rows written to the clean dataset
    pub final_rows: usize,

    /// Rows dropped for sharing a title and UPC with an earlier row
    pub duplicates_removed: usize,

    /// Absent descriptions replaced with the placeholder text
    pub missing_descriptions_filled: usize,

    /// Descriptions altered by tidying
    pub descriptions_cleaned: usize,

    /// Categories renamed or backfilled
    pub categories_changed: usize,

    /// GBP to USD rate applied to prices
    pub exchange_rate: f64,
}

/// Prints a cleaning report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_clean_report(report: &CleanReport) {
    println!("=== Cleaning Report ===\n");

    println!("Overview:");
    println!("  Initial rows: {}", report.initial_rows);
    println!("  Final rows: {}", report.final_rows);
    println!("  Exchange rate (GBP to USD): {:.4}", report.exchange_rate);
    println!();

    println!("Adjustments:");
    println!("  Duplicates removed: {}", report.duplicates_removed);
    println!(
        "  Missing descriptions filled: {}",
        report.missing_descriptions_filled
    );
    println!("  Descriptions tidied: {}", report.descriptions_cleaned);
    println!("  Categories changed: {}", report.categories_changed);
}
