//! Crawl orchestrator - the page-by-page, item-by-item traversal
//!
//! This module drives the whole scrape, including:
//! - Following next-page links from page 1 until the catalog ends
//! - Fetching and parsing each book's detail page
//! - Merging listing and detail data through the normalizer
//! - Isolating per-item and per-page failures so the run keeps going
//! - Accumulating records and failure tallies into a final report

use crate::record::{normalize, BookRecord};
use crate::scrape::detail::parse_detail;
use crate::scrape::fetcher::PageFetcher;
use crate::scrape::listing::{parse_listing, RawListingEntry};
use crate::{Config, ScrapeError};
use std::fmt;
use url::Url;

/// The per-item pipeline stage a skipped item failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fetching the detail page
    Fetch,

    /// Parsing listing card or detail page content
    Parse,

    /// Validating and merging the parsed fields
    Normalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Normalize => "normalize",
        };
        write!(f, "{}", name)
    }
}

/// One skipped item: where it failed and why
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// The URL being processed when the item was given up
    pub url: String,

    /// The stage that failed
    pub stage: Stage,

    /// Rendered cause
    pub message: String,
}

/// One skipped listing page
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub url: String,
    pub message: String,
}

/// Whether the traversal reached the catalog's natural end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// The last page had no next link (or the page bound was reached)
    Completed,

    /// A listing page failed and no next page could be derived from it
    Incomplete,
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Incomplete => write!(f, "incomplete"),
        }
    }
}

/// Everything one run produced
#[derive(Debug)]
pub struct CrawlReport {
    /// Successfully assembled records, in page-then-item order
    pub records: Vec<BookRecord>,

    /// Listing pages fully processed
    pub pages_visited: u32,

    /// Listing pages skipped after the retry budget was spent
    pub page_failures: Vec<PageFailure>,

    /// Items skipped, with stage and cause
    pub item_failures: Vec<ItemFailure>,

    /// How the traversal ended
    pub status: CrawlStatus,
}

/// Main crawl orchestrator structure
pub struct Orchestrator {
    fetcher: PageFetcher,
    start_url: Url,
    max_pages: u32,
}

impl Orchestrator {
    /// Creates a new orchestrator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The full configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(ScrapeError)` - Bad start URL or HTTP client build failure
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        let start_url = Url::parse(&config.scraper.base_url)?;
        let fetcher = PageFetcher::new(&config.scraper)?;

        Ok(Self {
            fetcher,
            start_url,
            max_pages: config.scraper.max_pages,
        })
    }

    /// Runs the crawl to completion
    ///
    /// The loop follows next-page links until none remains, the page bound
    /// is hit, or a failed page leaves no derivable next URL. A failed
    /// listing page is skipped; its successor is derived from the page
    /// number pattern in its URL when possible, since that page's own next
    /// link was never seen.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - At least one page was processed
    /// * `Err(ScrapeError)` - Not a single listing page could be fetched
    pub async fn run(&mut self) -> Result<CrawlReport, ScrapeError> {
        tracing::info!(start = %self.start_url, max_pages = self.max_pages, "starting crawl");

        let mut records = Vec::new();
        let mut page_failures: Vec<PageFailure> = Vec::new();
        let mut item_failures: Vec<ItemFailure> = Vec::new();
        let mut pages_visited = 0u32;
        let mut pages_attempted = 0u32;
        let mut status = CrawlStatus::Completed;

        let mut current = Some(self.start_url.clone());

        while let Some(page_url) = current {
            if pages_attempted >= self.max_pages {
                tracing::warn!(
                    max_pages = self.max_pages,
                    "page bound reached before the catalog ended"
                );
                break;
            }
            pages_attempted += 1;

            current = match self
                .process_listing_page(&page_url, &mut records, &mut item_failures)
                .await
            {
                Ok(next_href) => {
                    pages_visited += 1;
                    resolve_next(&page_url, next_href)
                }
                Err(error) => {
                    tracing::error!(url = %page_url, error = %error, "listing page skipped");
                    page_failures.push(PageFailure {
                        url: page_url.to_string(),
                        message: error.to_string(),
                    });

                    // The failed page's next link was never seen, so the
                    // only way forward is the page number in its URL.
                    let next = next_url_by_pattern(&page_url);
                    if next.is_none() {
                        status = CrawlStatus::Incomplete;
                    }
                    next
                }
            };
        }

        if pages_visited == 0 {
            return Err(ScrapeError::NothingFetched {
                start_url: self.start_url.to_string(),
            });
        }

        tracing::info!(
            pages = pages_visited,
            records = records.len(),
            page_skips = page_failures.len(),
            item_skips = item_failures.len(),
            status = %status,
            "crawl finished"
        );

        Ok(CrawlReport {
            records,
            pages_visited,
            page_failures,
            item_failures,
            status,
        })
    }

    /// Processes one listing page and every card on it
    ///
    /// Card and item failures are recorded and skipped here; only a page
    /// fetch failure or a cardless page escalates to the caller.
    async fn process_listing_page(
        &mut self,
        page_url: &Url,
        records: &mut Vec<BookRecord>,
        item_failures: &mut Vec<ItemFailure>,
    ) -> Result<Option<String>, ScrapeError> {
        let body = self.fetcher.fetch(page_url).await?;
        let parsed = parse_listing(&body)?;

        let cards = parsed.items.len();
        let mut emitted = 0usize;

        for item in parsed.items {
            match item {
                Ok(entry) => match self.process_item(&entry, page_url).await {
                    Ok(record) => {
                        records.push(record);
                        emitted += 1;
                    }
                    Err(failure) => {
                        tracing::error!(
                            url = %failure.url,
                            stage = %failure.stage,
                            cause = %failure.message,
                            "item skipped"
                        );
                        item_failures.push(failure);
                    }
                },
                Err(error) => {
                    tracing::error!(url = %page_url, cause = %error, "malformed card skipped");
                    item_failures.push(ItemFailure {
                        url: page_url.to_string(),
                        stage: Stage::Parse,
                        message: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(url = %page_url, cards, records = emitted, "listing page processed");
        Ok(parsed.next_page)
    }

    /// Fetch, parse, and normalize one book
    async fn process_item(
        &mut self,
        entry: &RawListingEntry,
        page_url: &Url,
    ) -> Result<BookRecord, ItemFailure> {
        let detail_url = page_url
            .join(&entry.detail_href)
            .map_err(|error| ItemFailure {
                url: entry.detail_href.clone(),
                stage: Stage::Fetch,
                message: format!("cannot resolve detail URL: {}", error),
            })?;

        let body = self
            .fetcher
            .fetch(&detail_url)
            .await
            .map_err(|error| ItemFailure {
                url: detail_url.to_string(),
                stage: Stage::Fetch,
                message: error.to_string(),
            })?;

        let detail = parse_detail(&body).map_err(|error| ItemFailure {
            url: detail_url.to_string(),
            stage: Stage::Parse,
            message: error.to_string(),
        })?;

        normalize(entry, &detail, page_url).map_err(|error| ItemFailure {
            url: detail_url.to_string(),
            stage: Stage::Normalize,
            message: error.to_string(),
        })
    }
}

/// Resolves a parsed next-page href against the page it came from
fn resolve_next(page_url: &Url, next_href: Option<String>) -> Option<Url> {
    let href = next_href?;
    match page_url.join(&href) {
        Ok(next) => Some(next),
        Err(error) => {
            tracing::warn!(href = %href, error = %error, "ignoring unresolvable next-page link");
            None
        }
    }
}

/// Derives the next listing URL from a `page-N.html` final segment
///
/// Returns None when the URL does not follow the numbered pattern, in which
/// case a failed page ends the traversal.
fn next_url_by_pattern(url: &Url) -> Option<Url> {
    let last = url.path_segments()?.last()?;
    let number: u32 = last
        .strip_prefix("page-")?
        .strip_suffix(".html")?
        .parse()
        .ok()?;

    let mut next = url.clone();
    {
        let mut segments = next.path_segments_mut().ok()?;
        segments.pop();
        segments.push(&format!("page-{}.html", number + 1));
    }
    Some(next)
}
