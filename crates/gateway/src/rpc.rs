//! JSON-RPC client for token supply and holder-count lookups.

use crate::error::GatewayError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Page size for the holder scan. The last page is signalled by an empty
/// token-account array.
const HOLDER_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorDto>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorDto {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SupplyResult {
    value: SupplyValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupplyValue {
    ui_amount: Option<f64>,
    ui_amount_string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenAccountsResult {
    token_accounts: Vec<serde_json::Value>,
}

/// JSON-RPC client for the chain node / indexer endpoint.
#[derive(Clone)]
pub struct RpcClient {
    http: Client,
    url: String,
}

impl RpcClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, GatewayError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.http.post(&self.url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status().as_u16()));
        }

        let envelope: RpcEnvelope<T> = response.json().await?;
        if let Some(err) = envelope.error {
            return Err(GatewayError::Upstream(err.message));
        }
        envelope
            .result
            .ok_or_else(|| GatewayError::ParseError(format!("{method}: missing result")))
    }

    /// Fetch the circulating supply (UI amount) for a mint.
    pub async fn fetch_supply(&self, mint: &str) -> Result<f64, GatewayError> {
        let result: SupplyResult = self.call("getTokenSupply", json!([mint])).await?;

        let supply = match (result.value.ui_amount, result.value.ui_amount_string) {
            (Some(amount), _) => amount,
            (None, Some(s)) => s
                .parse()
                .map_err(|_| GatewayError::ParseError("unparseable supply amount".to_string()))?,
            (None, None) => {
                return Err(GatewayError::ParseError("missing supply amount".to_string()))
            }
        };

        debug!(supply, "token supply fetched");
        Ok(supply)
    }

    /// Count token accounts for a mint by scanning fixed-size pages until an
    /// empty page. Every account counts as one holder, including multiple
    /// accounts held by the same owner.
    pub async fn fetch_holder_count(&self, mint: &str) -> Result<u64, GatewayError> {
        let mut total: u64 = 0;
        let mut page: u32 = 1;

        loop {
            let result: TokenAccountsResult = self
                .call(
                    "getTokenAccounts",
                    json!({
                        "mint": mint,
                        "page": page,
                        "limit": HOLDER_PAGE_SIZE,
                    }),
                )
                .await?;

            let fetched = result.token_accounts.len() as u64;
            if fetched == 0 {
                break;
            }

            total += fetched;
            debug!(page, total, "holder scan page fetched");
            page += 1;
        }

        Ok(total)
    }
}
