//! Store-backed rate calculation over single-slot sample buckets.

use poolwatch_core::{change_percent, round_hourly_rate, DAILY_PRICE_BUCKET, HOURLY_PRICE_BUCKET};
use poolwatch_store::{PoolStore, StoreError};
use tracing::debug;

/// Rate calculator that re-uses the pool store as its one-step sample
/// history. Every call both reads the prior baseline and resets it to the
/// current price, so a bucket always measures change since the last call to
/// that bucket. Independently keyed buckets keep the hourly cadence and the
/// daily cadence from clobbering each other's baselines.
pub struct RateCalculator {
    store: PoolStore,
}

impl RateCalculator {
    pub fn new(store: PoolStore) -> Self {
        Self { store }
    }

    /// Sample a bucket and return the raw change percent since its previous
    /// sample. A bucket seen for the first time is created with the current
    /// price and reports 0.0 (cold start).
    pub async fn sample_and_compare(
        &self,
        bucket_id: &str,
        current_price: f64,
        now_ms: i64,
    ) -> Result<f64, StoreError> {
        let previous = self
            .store
            .swap_price_sample(bucket_id, current_price, now_ms)
            .await?;

        let rate = match previous {
            Some(prev) => change_percent(prev, current_price),
            None => 0.0,
        };

        debug!(bucket = bucket_id, rate_pct = rate, "rate sampled");
        Ok(rate)
    }

    /// Hourly bucket sample with the display rounding policy applied.
    pub async fn sample_hourly(&self, current_price: f64, now_ms: i64) -> Result<f64, StoreError> {
        let raw = self
            .sample_and_compare(HOURLY_PRICE_BUCKET, current_price, now_ms)
            .await?;
        Ok(round_hourly_rate(raw))
    }

    /// Daily bucket sample. Only called once per day, so the baseline is
    /// effectively yesterday's price.
    pub async fn sample_daily(&self, current_price: f64, now_ms: i64) -> Result<f64, StoreError> {
        self.sample_and_compare(DAILY_PRICE_BUCKET, current_price, now_ms)
            .await
    }
}
