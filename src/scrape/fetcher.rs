//! HTTP fetcher for listing and detail pages
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building an HTTP client with the configured user agent
//! - A single rate-limit clock covering every request the run makes
//! - Retry logic with the same fixed delay before every attempt
//! - Error classification

use crate::config::ScraperConfig;
use crate::{FetchCause, FetchError};
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value to send
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages politely: one request at a time, a minimum interval between
/// any two requests, and a fixed retry budget per page
///
/// The fetcher owns the only rate-limit clock in the program. Listing and
/// detail requests all pass through the same instance, so the configured
/// delay holds across the whole run, not per page kind.
pub struct PageFetcher {
    client: Client,
    min_interval: Duration,
    retries: u32,
    last_request: Option<Instant>,
}

impl PageFetcher {
    /// Creates a fetcher from the scraper configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration (user agent, delay, retries)
    ///
    /// # Returns
    ///
    /// * `Ok(PageFetcher)` - Ready-to-use fetcher
    /// * `Err(reqwest::Error)` - Failed to build the HTTP client
    pub fn new(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self {
            client,
            min_interval: Duration::from_millis(config.request_delay_ms),
            retries: config.fetch_retries,
            last_request: None,
        })
    }

    /// Fetches a page body, retrying transient failures
    ///
    /// Every attempt waits out the remainder of the configured interval
    /// first. All failure kinds count against the same retry budget: a
    /// non-success status, a timeout, a refused connection, and a failed
    /// body read are retried alike, with no backoff growth.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(FetchError)` - The URL, total attempts made, and the last cause
    pub async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.pace().await;

            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(cause) if attempt <= self.retries => {
                    tracing::warn!(url = %url, attempt, cause = %cause, "retrying failed fetch");
                }
                Err(cause) => {
                    return Err(FetchError {
                        url: url.to_string(),
                        attempts: attempt,
                        cause,
                    });
                }
            }
        }
    }

    /// Sleeps out the remainder of the interval, then stamps the clock
    async fn pace(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::trace!(wait_ms = wait.as_millis() as u64, "pacing before request");
            tokio::time::sleep(wait).await;
        }
        self.last_request = Some(Instant::now());
    }

    /// Returns how long the next request must still wait, if at all
    ///
    /// The first request never waits. After that, the wait is whatever is
    /// left of `min_interval` since the previous request was issued.
    fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.duration_since(last);
        if elapsed >= self.min_interval {
            None
        } else {
            Some(self.min_interval - elapsed)
        }
    }

    /// One GET attempt, classified into a FetchCause on failure
    async fn try_fetch(&self, url: &Url) -> Result<String, FetchCause> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        response.text().await.map_err(classify_error)
    }
}

/// Classifies a reqwest error into a retryable cause
fn classify_error(e: reqwest::Error) -> FetchCause {
    if e.is_timeout() {
        FetchCause::Timeout
    } else if e.is_connect() {
        FetchCause::Connect
    } else {
        FetchCause::Transport(e.to_string())
    }
}
