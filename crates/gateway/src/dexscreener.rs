//! DexScreener pairs-by-token client.
//!
//! One call to `/latest/dex/tokens/{address}` returns every tracked trading
//! pair for the asset; this is the pool snapshot the engine reconciles.

use crate::error::GatewayError;
use compact_str::CompactString;
use poolwatch_core::PoolEntry;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com";

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    pairs: Option<Vec<PairDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairDto {
    pair_address: String,
    dex_id: String,
    url: Option<String>,
    base_token: Option<TokenDto>,
    quote_token: Option<TokenDto>,
    /// DexScreener serializes prices as strings.
    price_native: Option<String>,
    price_usd: Option<String>,
    liquidity: Option<LiquidityDto>,
}

#[derive(Debug, Deserialize)]
struct TokenDto {
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LiquidityDto {
    usd: Option<f64>,
}

impl PairDto {
    fn into_entry(self) -> PoolEntry {
        let pair_label = match (
            self.base_token.and_then(|t| t.symbol),
            self.quote_token.and_then(|t| t.symbol),
        ) {
            (Some(base), Some(quote)) => Some(CompactString::new(format!("{base}-{quote}"))),
            _ => None,
        };

        PoolEntry {
            pool_id: self.pair_address,
            dex_id: CompactString::new(&self.dex_id),
            pair_label,
            url: self.url,
            price_native: self.price_native.and_then(|s| s.parse().ok()),
            price_usd: self.price_usd.and_then(|s| s.parse().ok()),
            liquidity_usd: self.liquidity.and_then(|l| l.usd),
        }
    }
}

/// DexScreener REST client.
#[derive(Clone)]
pub struct DexScreenerClient {
    http: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch all currently tracked pairs for a token address.
    pub async fn fetch_pairs(&self, token_address: &str) -> Result<Vec<PoolEntry>, GatewayError> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, token_address);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status().as_u16()));
        }

        let body: TokenPairsResponse = response.json().await?;
        let entries: Vec<PoolEntry> = body
            .pairs
            .unwrap_or_default()
            .into_iter()
            .map(PairDto::into_entry)
            .collect();

        debug!(pairs = entries.len(), "dexscreener pairs fetched");
        Ok(entries)
    }
}
