//! Record types produced by the normalizer
//!
//! This module defines the canonical book record and its stock quantity field.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How many copies the site claims to have on hand
///
/// `Count(0)` means the page confirmed an empty shelf. `Unknown` means the page
/// said "In stock" without a number. The two are never collapsed into each
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockQuantity {
    /// A stated number of copies (possibly zero)
    Count(u32),

    /// In stock, but the page did not state a number
    Unknown,
}

impl StockQuantity {
    /// Returns the stated count, if the page stated one
    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for StockQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// A stated count serializes as a plain number, Unknown as an empty
// CSV field (JSON null).
impl Serialize for StockQuantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Count(n) => serializer.serialize_u32(*n),
            Self::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for StockQuantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<u32>::deserialize(deserializer)?;
        Ok(match value {
            Some(n) => Self::Count(n),
            None => Self::Unknown,
        })
    }
}

/// One fully normalized book
///
/// Field order matches the exported CSV column order exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Book title as shown on the listing card
    pub title: String,

    /// Breadcrumb category, or "Unknown" when the breadcrumb was malformed
    pub category: String,

    /// Price in GBP, always positive
    pub price_gbp: f64,

    /// Star rating, 1 through 5
    pub rating: u8,

    /// Raw availability text the quantity was derived from
    pub availability: String,

    /// Parsed stock quantity
    pub stock_quantity: StockQuantity,

    /// Product code from the detail page table
    pub upc: String,

    /// Absolute URL of the detail page
    pub product_page_url: String,

    /// Detail-page description, absent when the page had none
    pub description: Option<String>,
}
