//! Cleaning rules
//!
//! This module turns raw records into the clean analysis dataset:
//! - Deduplication on the title and UPC pair, keeping the first occurrence
//! - Description backfill and tidying
//! - GBP to USD conversion at a resolved exchange rate
//! - Category renames and derived stock and price-band fields

use super::report::CleanReport;
use crate::record::{BookRecord, StockQuantity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Placeholder stored when a record has no description
pub const MISSING_DESCRIPTION: &str = "Description not available";

/// Price band assigned from the USD price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceBand {
    Budget,
    #[serde(rename = "Mid-range")]
    MidRange,
    Premium,
    Luxury,
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceBand::Budget => "Budget",
            PriceBand::MidRange => "Mid-range",
            PriceBand::Premium => "Premium",
            PriceBand::Luxury => "Luxury",
        };
        write!(f, "{}", name)
    }
}

/// A cleaned and enriched record
///
/// Field order matches the clean dataset's column order exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedBook {
    pub title: String,
    pub category: String,
    pub price_gbp: f64,
    pub price_usd: f64,
    pub price_band: Option<PriceBand>,
    pub rating: u8,
    pub availability: String,
    pub in_stock: bool,
    pub stock_quantity: StockQuantity,
    pub upc: String,
    pub product_page_url: String,
    pub description: String,
}

/// Applies every cleaning rule to a set of records
///
/// Rules run in a fixed order: deduplication, description backfill and
/// tidying, currency conversion, category fixes, then derived fields.
///
/// # Arguments
///
/// * `records` - Raw records in dataset order
/// * `exchange_rate` - GBP to USD rate for price conversion
///
/// # Returns
///
/// * `(Vec<CleanedBook>, CleanReport)` - Cleaned rows in their surviving
///   order and the tallies describing what changed
pub fn clean_records(
    records: Vec<BookRecord>,
    exchange_rate: f64,
) -> (Vec<CleanedBook>, CleanReport) {
    let initial_rows = records.len();

    // Deduplicate on (title, upc), first occurrence wins
    let mut seen = HashSet::new();
    let mut deduped = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert((record.title.clone(), record.upc.clone())) {
            deduped.push(record);
        }
    }
    let duplicates_removed = initial_rows - deduped.len();

    let mut missing_descriptions_filled = 0;
    let mut descriptions_cleaned = 0;
    let mut categories_changed = 0;

    let mut cleaned = Vec::with_capacity(deduped.len());
    for record in deduped {
        let description = match record.description {
            Some(text) => {
                let tidied = tidy_description(&text);
                if tidied != text {
                    descriptions_cleaned += 1;
                }
                tidied
            }
            None => {
                missing_descriptions_filled += 1;
                MISSING_DESCRIPTION.to_string()
            }
        };

        let category = match fix_category(&record.category) {
            Some(fixed) => {
                categories_changed += 1;
                fixed
            }
            None => record.category,
        };

        let price_usd = to_usd(record.price_gbp, exchange_rate);
        let in_stock = record.availability.to_lowercase().contains("in stock");

        cleaned.push(CleanedBook {
            title: record.title,
            category,
            price_gbp: record.price_gbp,
            price_usd,
            price_band: band_for(price_usd),
            rating: record.rating,
            availability: record.availability,
            in_stock,
            stock_quantity: record.stock_quantity,
            upc: record.upc,
            product_page_url: record.product_page_url,
            description,
        });
    }

    let report = CleanReport {
        initial_rows,
        final_rows: cleaned.len(),
        duplicates_removed,
        missing_descriptions_filled,
        descriptions_cleaned,
        categories_changed,
        exchange_rate,
    };

    (cleaned, report)
}

/// Tidies a scraped description
///
/// Strips a trailing "...more" marker, collapses whitespace runs to single
/// spaces, and squeezes runs of four or more dots down to an ellipsis.
fn tidy_description(text: &str) -> String {
    let stripped = strip_more_suffix(text);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    squeeze_dots(&collapsed)
}

fn strip_more_suffix(text: &str) -> &str {
    let trimmed = text.trim_end();
    match trimmed.get(trimmed.len().saturating_sub(7)..) {
        Some(tail) if tail.eq_ignore_ascii_case("...more") => &trimmed[..trimmed.len() - 7],
        _ => trimmed,
    }
}

fn squeeze_dots(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut dots = 0;
    for ch in text.chars() {
        if ch == '.' {
            dots += 1;
            continue;
        }
        flush_dots(&mut result, dots);
        dots = 0;
        result.push(ch);
    }
    flush_dots(&mut result, dots);
    result
}

fn flush_dots(result: &mut String, dots: usize) {
    if dots >= 4 {
        result.push_str("...");
    } else {
        for _ in 0..dots {
            result.push('.');
        }
    }
}

/// Returns the replacement category, if the stored one needs fixing
fn fix_category(category: &str) -> Option<String> {
    if category == "Default" {
        Some("Adult".to_string())
    } else if category.trim().is_empty() {
        Some("Uncategorized".to_string())
    } else {
        None
    }
}

fn to_usd(price_gbp: f64, rate: f64) -> f64 {
    (price_gbp * rate * 100.0).round() / 100.0
}

/// Assigns a price band from the USD price
///
/// Bands cover (0, 25], (25, 45], (45, 65] and (65, 150]. Prices outside
/// every band get no label.
fn band_for(price_usd: f64) -> Option<PriceBand> {
    if price_usd <= 0.0 {
        None
    } else if price_usd <= 25.0 {
        Some(PriceBand::Budget)
    } else if price_usd <= 45.0 {
        Some(PriceBand::MidRange)
    } else if price_usd <= 65.0 {
        Some(PriceBand::Premium)
    } else if price_usd <= 150.0 {
        Some(PriceBand::Luxury)
    } else {
        None
    }
}
