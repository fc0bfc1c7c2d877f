//! Birdeye spot-price client.

use crate::error::GatewayError;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://public-api.birdeye.so";

#[derive(Debug, Deserialize)]
struct PriceEnvelope {
    success: Option<bool>,
    data: Option<PriceData>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    value: f64,
}

/// Birdeye REST client for price-by-address lookups.
#[derive(Clone)]
pub struct BirdeyeClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl BirdeyeClient {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(http, api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        http: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the current USD spot price for a token address.
    pub async fn fetch_price(&self, token_address: &str) -> Result<f64, GatewayError> {
        let url = format!("{}/defi/price?address={}", self.base_url, token_address);

        let response = self
            .http
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status().as_u16()));
        }

        let envelope: PriceEnvelope = response.json().await?;
        if envelope.success == Some(false) {
            return Err(GatewayError::Upstream("price lookup rejected".to_string()));
        }

        let price = envelope
            .data
            .map(|d| d.value)
            .ok_or_else(|| GatewayError::ParseError("missing price data".to_string()))?;

        debug!(price_usd = price, "birdeye price fetched");
        Ok(price)
    }
}
