//! HTTP rate source for the exchangerate-api.com "latest rates" endpoint.

use crate::rates::{RateMatrix, RateSource};
use crate::Result;
use anyhow::{ensure, Context};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::trace;

const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches latest-rate matrices from exchangerate-api.com.
///
/// The API key is optional at construction so the provider can be built without
/// credentials; every fetch then fails fast and the provider degrades to its fallback
/// tiers instead.
pub struct ExchangeRateApi {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl ExchangeRateApi {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Used by tests to point the client at a local server.
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }
}

/// The wire shape of a "latest rates" response.
#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    #[serde(default)]
    base_code: String,
    #[serde(default)]
    conversion_rates: BTreeMap<String, Decimal>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait::async_trait]
impl RateSource for ExchangeRateApi {
    async fn latest(&self, pivot: &str) -> Result<RateMatrix> {
        let api_key = self
            .api_key
            .as_deref()
            .context("exchange rate API key is not configured")?;
        let url = format!("{}/{api_key}/latest/{pivot}", self.base_url);
        trace!("fetching rates for pivot {pivot}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("rate request for pivot {pivot} failed"))?;
        ensure!(
            response.status().is_success(),
            "rate request for pivot {pivot} returned HTTP {}",
            response.status()
        );

        let body: LatestResponse = response
            .json()
            .await
            .with_context(|| format!("rate response for pivot {pivot} is not valid JSON"))?;
        ensure!(
            body.result == "success",
            "rate source rejected pivot {pivot}: {}",
            body.error_type.unwrap_or_else(|| "unknown error".to_string())
        );

        // Restricted tiers may answer with a different base than the one requested.
        let actual_pivot = if body.base_code.is_empty() {
            pivot.to_string()
        } else {
            body.base_code
        };
        Ok(RateMatrix::new(actual_pivot, body.conversion_rates))
    }
}
