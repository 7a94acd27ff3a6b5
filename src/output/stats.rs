//! Statistics generation from exported datasets
//!
//! This module provides functionality for computing and displaying
//! summary statistics over a set of book records.

use crate::record::BookRecord;
use std::collections::HashMap;

/// Dataset summary statistics
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    /// Total number of records
    pub total_records: usize,

    /// Count of records by category
    pub category_counts: HashMap<String, usize>,

    /// Lowest listed price in GBP
    pub min_price: f64,

    /// Highest listed price in GBP
    pub max_price: f64,

    /// Mean listed price in GBP
    pub mean_price: f64,

    /// Count of records by star rating (index 0 holds one-star)
    pub rating_counts: [usize; 5],

    /// Number of records carrying a description
    pub with_description: usize,

    /// UPC values appearing on more than one record, sorted
    pub duplicate_upcs: Vec<String>,
}

impl DatasetSummary {
    /// Computes summary statistics over a set of records
    ///
    /// # Arguments
    ///
    /// * `records` - The records to summarize
    ///
    /// # Returns
    ///
    /// * `DatasetSummary` - Aggregates over the whole slice; prices are 0.0
    ///   for an empty slice
    pub fn compute(records: &[BookRecord]) -> Self {
        let total_records = records.len();

        let mut category_counts: HashMap<String, usize> = HashMap::new();
        let mut rating_counts = [0usize; 5];
        let mut with_description = 0;
        let mut upc_counts: HashMap<&str, usize> = HashMap::new();

        let mut min_price = f64::INFINITY;
        let mut max_price = 0.0f64;
        let mut price_sum = 0.0f64;

        for record in records {
            *category_counts.entry(record.category.clone()).or_insert(0) += 1;

            // Ratings read from files may fall outside the scale
            if (1..=5).contains(&record.rating) {
                rating_counts[record.rating as usize - 1] += 1;
            }

            if record.description.is_some() {
                with_description += 1;
            }

            *upc_counts.entry(record.upc.as_str()).or_insert(0) += 1;

            min_price = min_price.min(record.price_gbp);
            max_price = max_price.max(record.price_gbp);
            price_sum += record.price_gbp;
        }

        if total_records == 0 {
            min_price = 0.0;
        }
        let mean_price = if total_records > 0 {
            price_sum / total_records as f64
        } else {
            0.0
        };

        let mut duplicate_upcs: Vec<String> = upc_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(upc, _)| upc.to_string())
            .collect();
        duplicate_upcs.sort();

        DatasetSummary {
            total_records,
            category_counts,
            min_price,
            max_price,
            mean_price,
            rating_counts,
            with_description,
            duplicate_upcs,
        }
    }
}

/// Prints a summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &DatasetSummary) {
    println!("=== Dataset Summary ===\n");

    println!("Overview:");
    println!("  Total records: {}", summary.total_records);
    println!("  Categories: {}", summary.category_counts.len());
    println!(
        "  Price range: £{:.2} - £{:.2} (mean £{:.2})",
        summary.min_price, summary.max_price, summary.mean_price
    );
    println!();

    println!("Rating Distribution:");
    for (index, count) in summary.rating_counts.iter().enumerate() {
        let percentage = if summary.total_records > 0 {
            (*count as f64 / summary.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {} star: {} ({:.1}%)", index + 1, count, percentage);
    }
    println!();

    println!("Top Categories:");
    // Sort categories by count (descending), name-tied alphabetically
    let mut category_counts: Vec<_> = summary.category_counts.iter().collect();
    category_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (category, count) in category_counts.iter().take(10) {
        println!("  {}: {}", category, count);
    }
    println!();

    if !summary.duplicate_upcs.is_empty() {
        println!("Duplicate UPCs ({}):", summary.duplicate_upcs.len());
        for upc in &summary.duplicate_upcs {
            println!("  - {}", upc);
        }
        println!();
    }

    let coverage = if summary.total_records > 0 {
        (summary.with_description as f64 / summary.total_records as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Description Coverage: {:.1}% ({} / {} records)",
        coverage, summary.with_description, summary.total_records
    );
}
