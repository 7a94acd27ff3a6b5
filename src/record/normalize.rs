//! Merges a listing entry and its detail entry into one validated record
//!
//! This is the gate between raw page text and the exported dataset:
//! - Price text becomes a positive GBP amount
//! - Availability text becomes a stock quantity, with zero and unknown kept apart
//! - The detail href becomes an absolute product URL
//! - A missing rating or UPC rejects the item

use crate::record::book::{BookRecord, StockQuantity};
use crate::scrape::{RawDetailEntry, RawListingEntry};
use crate::ValidationError;
use url::Url;

/// Builds a `BookRecord` from the two raw entries for one book
///
/// # Arguments
///
/// * `listing` - Fields from the listing card
/// * `detail` - Fields from the product detail page
/// * `page_url` - URL of the listing page, for resolving the detail href
///
/// # Returns
///
/// * `Ok(BookRecord)` - All required fields present and valid
/// * `Err(ValidationError)` - The item must be skipped, with the reason
pub fn normalize(
    listing: &RawListingEntry,
    detail: &RawDetailEntry,
    page_url: &Url,
) -> Result<BookRecord, ValidationError> {
    let product_page_url = page_url
        .join(&listing.detail_href)
        .map_err(|source| ValidationError::BadUrl {
            href: listing.detail_href.clone(),
            base: page_url.to_string(),
            source,
        })?
        .to_string();

    if listing.price_text.trim().is_empty() {
        return Err(ValidationError::MissingPrice {
            url: product_page_url,
        });
    }
    let price_gbp = match parse_price(&listing.price_text) {
        Some(price) if price > 0.0 => price,
        _ => {
            return Err(ValidationError::InvalidPrice {
                value: listing.price_text.clone(),
                url: product_page_url,
            })
        }
    };

    let rating = listing.rating.ok_or(ValidationError::MissingRating {
        url: product_page_url.clone(),
    })?;

    if detail.upc.trim().is_empty() {
        return Err(ValidationError::MissingUpc {
            url: product_page_url,
        });
    }

    // Detail availability wins whenever present; the listing is the fallback
    let availability = if detail.availability.trim().is_empty() {
        listing.availability.clone()
    } else {
        if !listing.availability.trim().is_empty()
            && claims_in_stock(&listing.availability) != claims_in_stock(&detail.availability)
        {
            tracing::debug!(
                listing = %listing.availability,
                detail = %detail.availability,
                url = %product_page_url,
                "listing and detail pages disagree about availability"
            );
        }
        detail.availability.clone()
    };

    let stock_quantity = parse_stock(&availability);

    Ok(BookRecord {
        title: listing.title.clone(),
        category: detail.category.clone(),
        price_gbp,
        rating,
        availability,
        stock_quantity,
        upc: detail.upc.clone(),
        product_page_url,
        description: detail.description.clone(),
    })
}

/// Parses a displayed price like "£51.77" into its numeric value
///
/// Currency symbols and thousands separators are dropped; anything left
/// that does not read as a number is rejected by the caller.
fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '£' && *c != ',')
        .collect();
    let cleaned = cleaned.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');

    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}

/// Derives the stock quantity from an availability string
///
/// "In stock (22 available)" gives a count. "In stock" with no number is an
/// unknown quantity, never zero. Anything else, including empty text, is a
/// confirmed zero.
fn parse_stock(availability: &str) -> StockQuantity {
    if let Some(count) = parenthesized_count(availability) {
        return StockQuantity::Count(count);
    }
    if availability.contains("In stock") {
        StockQuantity::Unknown
    } else {
        StockQuantity::Count(0)
    }
}

/// Matches the "(N available)" tail of the site's availability strings
fn parenthesized_count(text: &str) -> Option<u32> {
    let open = text.find('(')?;
    let rest = &text[open + 1..];
    let close = rest.find(')')?;
    let number = rest[..close].strip_suffix(" available")?;
    number.trim().parse::<u32>().ok()
}

fn claims_in_stock(text: &str) -> bool {
    text.to_lowercase().contains("in stock")
}
