//! Scrape module for catalog traversal and extraction
//!
//! This module contains the crawl pipeline, including:
//! - HTTP fetching with pacing and retry
//! - Listing page parsing (cards and next-page links)
//! - Detail page parsing (UPC, category, description)
//! - Orchestration of the page-by-page, item-by-item traversal

mod detail;
mod fetcher;
mod listing;
mod orchestrator;

pub use detail::{parse_detail, RawDetailEntry};
pub use fetcher::{build_http_client, PageFetcher};
pub use listing::{parse_listing, ParsedListing, RawListingEntry};
pub use orchestrator::{CrawlReport, CrawlStatus, ItemFailure, Orchestrator, PageFailure, Stage};

use crate::{Config, ScrapeError};

/// Runs a complete scrape of the configured catalog
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client and rate-limit clock
/// 2. Walk listing pages from the configured start URL
/// 3. Fetch and parse each book's detail page
/// 4. Normalize and accumulate records
///
/// # Arguments
///
/// * `config` - The full configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Records plus page/item failure tallies
/// * `Err(ScrapeError)` - Setup failed or no page could be fetched
pub async fn run_scrape(config: &Config) -> Result<CrawlReport, ScrapeError> {
    let mut orchestrator = Orchestrator::new(config)?;
    orchestrator.run().await
}
