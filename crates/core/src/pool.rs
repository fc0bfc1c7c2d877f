//! Persisted pool records and synthetic sample buckets.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Bucket id for the hourly price sample slot.
pub const HOURLY_PRICE_BUCKET: &str = "hourly_price";
/// Bucket id for the once-per-day price sample slot (Birdeye spot price).
pub const DAILY_PRICE_BUCKET: &str = "birdeye_price";

/// One persisted row: either a real liquidity pool (keyed by its on-chain
/// pair address) or a synthetic single-slot sample bucket (keyed by a fixed
/// sentinel like `hourly_price`). Both share the same table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// Unique key: pair address for real pools, sentinel for buckets.
    pub pool_id: String,
    /// Exchange/source identifier (e.g. "raydium").
    pub dex_id: CompactString,
    /// Human-readable pair label (e.g. "TOKE-USDC").
    pub pair_label: Option<CompactString>,
    /// Canonical link to the pair page.
    pub url: Option<String>,
    /// Price in the chain's native currency.
    pub price_native: Option<f64>,
    /// Price in USD.
    pub price_usd: Option<f64>,
    /// Pooled liquidity in USD.
    pub liquidity_usd: Option<f64>,
    /// Circulating supply; only populated on synthetic supply-tracking rows.
    pub supply: Option<f64>,
    /// Last reconciliation that touched this record (ms since epoch).
    /// Monotonically non-decreasing per record.
    pub last_seen_ms: i64,
}

impl PoolRecord {
    /// Create a synthetic sample bucket holding a single price slot.
    pub fn bucket(bucket_id: &str, price_usd: f64, now_ms: i64) -> Self {
        Self {
            pool_id: bucket_id.to_string(),
            dex_id: CompactString::new("sample"),
            pair_label: None,
            url: None,
            price_native: None,
            price_usd: Some(price_usd),
            liquidity_usd: None,
            supply: None,
            last_seen_ms: now_ms,
        }
    }

    /// Whether this row is a synthetic sample bucket rather than a real pool.
    pub fn is_bucket(&self) -> bool {
        self.pool_id == HOURLY_PRICE_BUCKET || self.pool_id == DAILY_PRICE_BUCKET
    }
}
