//! Market data gateway: typed clients for the upstream price, supply, pool
//! and holder-count sources.
//!
//! All clients share one `reqwest::Client` with bounded timeouts; a timeout
//! surfaces as a `GatewayError` and the pass treats the value as unavailable.
//! The `MarketData` trait is the seam the engine depends on, so tests can
//! substitute a mock.

pub mod birdeye;
pub mod dexscreener;
pub mod error;
pub mod rpc;

pub use birdeye::BirdeyeClient;
pub use dexscreener::DexScreenerClient;
pub use error::GatewayError;
pub use rpc::RpcClient;

use async_trait::async_trait;
use poolwatch_core::PoolEntry;
use std::time::Duration;

/// Build the shared HTTP client with bounded timeouts.
pub fn build_http_client() -> Result<reqwest::Client, GatewayError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_idle_timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

/// Upstream market-data operations for a single asset.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Current USD spot price.
    async fn fetch_price(&self) -> Result<f64, GatewayError>;
    /// Circulating supply (UI amount).
    async fn fetch_supply(&self) -> Result<f64, GatewayError>;
    /// All currently tracked pools for the asset.
    async fn fetch_pool_snapshot(&self) -> Result<Vec<PoolEntry>, GatewayError>;
    /// Total token-account count (coarse holder approximation).
    async fn fetch_holder_count(&self) -> Result<u64, GatewayError>;
}

/// Production gateway backed by the HTTP clients.
pub struct HttpMarketData {
    token_address: String,
    dexscreener: DexScreenerClient,
    birdeye: BirdeyeClient,
    rpc: RpcClient,
}

impl HttpMarketData {
    pub fn new(
        token_address: impl Into<String>,
        dexscreener: DexScreenerClient,
        birdeye: BirdeyeClient,
        rpc: RpcClient,
    ) -> Self {
        Self {
            token_address: token_address.into(),
            dexscreener,
            birdeye,
            rpc,
        }
    }
}

#[async_trait]
impl MarketData for HttpMarketData {
    async fn fetch_price(&self) -> Result<f64, GatewayError> {
        self.birdeye.fetch_price(&self.token_address).await
    }

    async fn fetch_supply(&self) -> Result<f64, GatewayError> {
        self.rpc.fetch_supply(&self.token_address).await
    }

    async fn fetch_pool_snapshot(&self) -> Result<Vec<PoolEntry>, GatewayError> {
        self.dexscreener.fetch_pairs(&self.token_address).await
    }

    async fn fetch_holder_count(&self) -> Result<u64, GatewayError> {
        self.rpc.fetch_holder_count(&self.token_address).await
    }
}
