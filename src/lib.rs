//! Bookscrape: a two-stage book catalog scraper
//!
//! This crate crawls a paginated book catalog, enriches each listing with its
//! detail page, normalizes the results into typed records, and exports a
//! fixed-schema CSV dataset. A second stage cleans the raw dataset into an
//! analysis-ready one.

pub mod cleaner;
pub mod config;
pub mod output;
pub mod record;
pub mod scrape;

use thiserror::Error;

/// Main error type for bookscrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("Cleaning error: {0}")]
    Clean(#[from] cleaner::CleanError),

    #[error("No listing pages could be fetched from {start_url}")]
    NothingFetched { start_url: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// A page-level fetch failure after the retry budget is spent
#[derive(Debug, Error)]
#[error("Failed to fetch {url} after {attempts} attempts: {cause}")]
pub struct FetchError {
    /// The URL that could not be retrieved
    pub url: String,
    /// Total attempts made (first try plus retries)
    pub attempts: u32,
    /// Description of the final failure
    pub cause: FetchCause,
}

/// The last observed cause of a failed fetch
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed")]
    Connect,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors raised while extracting structured data from HTML
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    #[error("Missing required attribute {attribute} on {element}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Unparseable field {field}: {value:?}")]
    BadField { field: &'static str, value: String },

    #[error("Page contains no product cards")]
    NoProductCards,
}

/// Errors raised while normalizing parsed fields into a record
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing price in {url}")]
    MissingPrice { url: String },

    #[error("Invalid price {value:?} in {url}")]
    InvalidPrice { value: String, url: String },

    #[error("Missing rating in {url}")]
    MissingRating { url: String },

    #[error("Missing UPC in {url}")]
    MissingUpc { url: String },

    #[error("Cannot resolve product URL {href:?} against {base}: {source}")]
    BadUrl {
        href: String,
        base: String,
        source: url::ParseError,
    },
}

/// Result type alias for bookscrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{BookRecord, StockQuantity};
pub use scrape::{CrawlReport, CrawlStatus, ItemFailure, Orchestrator, Stage};
