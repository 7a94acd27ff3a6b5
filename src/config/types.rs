use serde::Deserialize;

/// Main configuration structure for bookscrape
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// First listing page of the catalog
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Upper bound on listing pages visited in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Minimum time between any two requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Retries after a failed fetch before the page is given up
    #[serde(rename = "fetch-retries")]
    pub fetch_retries: u32,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for raw scraped datasets
    #[serde(rename = "raw-dir")]
    pub raw_dir: String,

    /// Directory for cleaned datasets
    #[serde(rename = "clean-dir")]
    pub clean_dir: String,
}

/// Cleaning stage configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CleaningConfig {
    /// Fixed GBP to USD rate; when absent the cleaner asks an exchange-rate API
    #[serde(rename = "gbp-to-usd-rate")]
    pub gbp_to_usd_rate: Option<f64>,
}
