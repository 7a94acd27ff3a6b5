//! Exchange-rate resolution
//!
//! A configured rate always wins. Without one, the rate is fetched from the
//! open exchange-rate API, and a fixed fallback covers outages.

use super::CleanError;
use crate::config::CleaningConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Rate applied when no rate is configured and the fetch fails
pub const FALLBACK_GBP_TO_USD: f64 = 1.27;

const RATE_ENDPOINT: &str = "https://open.er-api.com/v6/latest/GBP";
const RATE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RatePayload {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Resolves the GBP to USD exchange rate for a cleaning run
///
/// # Arguments
///
/// * `config` - Cleaning configuration, checked for a pinned rate first
///
/// # Returns
///
/// * `f64` - The configured rate, a freshly fetched one, or the fallback
pub async fn resolve_exchange_rate(config: &CleaningConfig) -> f64 {
    if let Some(rate) = config.gbp_to_usd_rate {
        tracing::debug!(rate, "using configured exchange rate");
        return rate;
    }

    match fetch_exchange_rate().await {
        Ok(rate) => {
            tracing::info!(rate, "fetched GBP to USD exchange rate");
            rate
        }
        Err(error) => {
            tracing::warn!(
                error = %error,
                fallback = FALLBACK_GBP_TO_USD,
                "exchange rate fetch failed, using fallback"
            );
            FALLBACK_GBP_TO_USD
        }
    }
}

async fn fetch_exchange_rate() -> Result<f64, CleanError> {
    let client = reqwest::Client::builder()
        .timeout(RATE_FETCH_TIMEOUT)
        .build()?;

    let body = client
        .get(RATE_ENDPOINT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    rate_from_payload(&body)
}

/// Extracts the USD rate from an API response body
fn rate_from_payload(body: &str) -> Result<f64, CleanError> {
    let payload: RatePayload = serde_json::from_str(body)?;

    if payload.result != "success" {
        return Err(CleanError::ExchangeRate(format!(
            "API reported result {:?}",
            payload.result
        )));
    }

    let rate = payload
        .rates
        .get("USD")
        .copied()
        .ok_or_else(|| CleanError::ExchangeRate("USD missing from rates".to_string()))?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(CleanError::ExchangeRate(format!(
            "unusable USD rate {}",
            rate
        )));
    }

    Ok(rate)
}
