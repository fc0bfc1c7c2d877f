//! Ephemeral market data as read from upstream sources.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One trading pair as observed in an upstream pool listing.
///
/// This is the unpersisted snapshot input to reconciliation; `PoolRecord` is
/// what survives it. A snapshot is the whole `Vec<PoolEntry>` returned by one
/// gateway fetch; scalar reads (spot price, supply, holder count) are fetched
/// separately per pass because the holder scan is a paginated full table
/// walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// On-chain pair address, unique within one snapshot (duplicates are
    /// resolved last-seen-wins by the engine).
    pub pool_id: String,
    pub dex_id: CompactString,
    pub pair_label: Option<CompactString>,
    pub url: Option<String>,
    pub price_native: Option<f64>,
    pub price_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
}
