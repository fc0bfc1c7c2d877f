//! Monitoring passes: the engine's entry points.
//!
//! A pass is a linear sequence of awaited operations. All fetches happen
//! before any store mutation in the rollover path, so an unavailable
//! upstream never burns the once-a-day baseline.

use crate::{reconcile_pools, EngineError, RateCalculator};
use chrono::{DateTime, Timelike, Utc};
use poolwatch_core::{
    is_rollover_hour, supply_burn_percent, ChangeEvent, DailySummary, Direction,
    DAILY_PRICE_BUCKET,
};
use poolwatch_gateway::MarketData;
use poolwatch_store::PoolStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Thresholds and constants the engine alerts on.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Absolute hourly change percent at which a volatility event is raised.
    pub volatility_threshold_pct: f64,
    /// UTC hour that triggers the daily summary.
    pub rollover_hour: u32,
    /// Genesis total supply; burn percent is measured against this.
    pub genesis_supply: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            volatility_threshold_pct: 10.0,
            rollover_hour: 0,
            genesis_supply: 420_000_069.0,
        }
    }
}

/// Result of one price pass. The routine hourly price post is built from
/// this; `events` carries only the newsworthy changes.
#[derive(Debug, Clone)]
pub struct PricePassOutcome {
    pub price_usd: f64,
    pub rate_percent: f64,
    pub direction: Direction,
    pub events: Vec<ChangeEvent>,
}

/// The reconciliation engine with its injected collaborators.
/// No process-wide singletons: everything the passes touch comes in here.
pub struct Monitor {
    gateway: Arc<dyn MarketData>,
    store: PoolStore,
    rates: RateCalculator,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(gateway: Arc<dyn MarketData>, store: PoolStore, config: MonitorConfig) -> Self {
        let rates = RateCalculator::new(store.clone());
        Self {
            gateway,
            store,
            rates,
            config,
        }
    }

    /// Hourly pass: sample the spot price against the hourly bucket, raise a
    /// volatility event past the threshold, and assemble the daily summary
    /// when the UTC day rolled over.
    ///
    /// An unavailable price aborts the whole pass with no mutation; an
    /// unavailable daily-summary input skips only the rollover event.
    pub async fn price_pass(&self, now: DateTime<Utc>) -> Result<PricePassOutcome, EngineError> {
        let price_usd = self.gateway.fetch_price().await?;
        let now_ms = now.timestamp_millis();

        let rate_percent = self.rates.sample_hourly(price_usd, now_ms).await?;
        let direction = Direction::from_rate(rate_percent);

        let mut events = Vec::new();
        if rate_percent.abs() >= self.config.volatility_threshold_pct {
            events.push(ChangeEvent::PriceVolatility {
                rate_percent,
                direction,
            });
        }

        if is_rollover_hour(now.hour(), self.config.rollover_hour) {
            match self.daily_summary(price_usd, now_ms).await {
                Ok(summary) => events.push(ChangeEvent::DayRollover { summary }),
                Err(e) => warn!(error = %e, "daily summary unavailable, skipping rollover event"),
            }
        }

        info!(
            price_usd,
            rate_pct = rate_percent,
            events = events.len(),
            "price pass complete"
        );

        Ok(PricePassOutcome {
            price_usd,
            rate_percent,
            direction,
            events,
        })
    }

    /// Pool pass: fetch the current pool snapshot and reconcile it against
    /// the store. A failed fetch mutates nothing and produces no events.
    pub async fn pool_pass(&self, now: DateTime<Utc>) -> Result<Vec<ChangeEvent>, EngineError> {
        let snapshot = self.gateway.fetch_pool_snapshot().await?;
        let now_ms = now.timestamp_millis();

        let total = snapshot.len();
        let events = reconcile_pools(&self.store, snapshot, now_ms).await;

        info!(pools = total, new = events.len(), "pool pass complete");
        Ok(events)
    }

    /// Assemble the day-rollover summary. Fetches first, bucket mutation
    /// last: the daily baseline is only consumed once everything needed for
    /// the summary is in hand.
    async fn daily_summary(
        &self,
        price_usd: f64,
        now_ms: i64,
    ) -> Result<DailySummary, EngineError> {
        let supply = self.gateway.fetch_supply().await?;
        let holder_count = self.gateway.fetch_holder_count().await?;

        let change_24h_pct = self.rates.sample_daily(price_usd, now_ms).await?;
        self.store
            .set_bucket_supply(DAILY_PRICE_BUCKET, supply, now_ms)
            .await?;

        Ok(DailySummary {
            price_usd,
            change_24h_pct,
            supply,
            burned_pct: supply_burn_percent(supply, self.config.genesis_supply),
            holder_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use compact_str::CompactString;
    use poolwatch_core::PoolEntry;
    use poolwatch_gateway::GatewayError;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Scripted gateway: each operation returns a preset value or fails.
    struct MockGateway {
        price: Mutex<Result<f64, ()>>,
        supply: f64,
        pools: Vec<PoolEntry>,
        holder_count: u64,
    }

    impl MockGateway {
        fn with_price(price: f64) -> Self {
            Self {
                price: Mutex::new(Ok(price)),
                supply: 419_000_000.0,
                pools: Vec::new(),
                holder_count: 1234,
            }
        }

        fn set_price(&self, price: f64) {
            *self.price.lock().unwrap() = Ok(price);
        }
    }

    #[async_trait]
    impl MarketData for MockGateway {
        async fn fetch_price(&self) -> Result<f64, GatewayError> {
            self.price
                .lock()
                .unwrap()
                .map_err(|_| GatewayError::ConnectionFailed("mock outage".to_string()))
        }

        async fn fetch_supply(&self) -> Result<f64, GatewayError> {
            Ok(self.supply)
        }

        async fn fetch_pool_snapshot(&self) -> Result<Vec<PoolEntry>, GatewayError> {
            Ok(self.pools.clone())
        }

        async fn fetch_holder_count(&self) -> Result<u64, GatewayError> {
            Ok(self.holder_count)
        }
    }

    fn entry(pool_id: &str, price_usd: f64) -> PoolEntry {
        PoolEntry {
            pool_id: pool_id.to_string(),
            dex_id: CompactString::new("raydium"),
            pair_label: None,
            url: None,
            price_native: None,
            price_usd: Some(price_usd),
            liquidity_usd: None,
        }
    }

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    async fn monitor_with(gateway: MockGateway) -> (Monitor, PoolStore) {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let monitor = Monitor::new(Arc::new(gateway), store.clone(), MonitorConfig::default());
        (monitor, store)
    }

    #[tokio::test]
    async fn test_price_pass_cold_start_is_flat() {
        let (monitor, _) = monitor_with(MockGateway::with_price(1.0)).await;

        let outcome = monitor.price_pass(at_hour(12)).await.unwrap();
        assert_eq!(outcome.rate_percent, 0.0);
        assert_eq!(outcome.direction, Direction::Flat);
        assert_eq!(outcome.events, vec![]);
    }

    #[tokio::test]
    async fn test_price_pass_below_threshold_is_silent() {
        let gateway = Arc::new(MockGateway::with_price(1.0));
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let monitor = Monitor::new(gateway.clone(), store, MonitorConfig::default());

        monitor.price_pass(at_hour(11)).await.unwrap();

        // +5% stays under the 10% default threshold.
        gateway.set_price(1.05);
        let outcome = monitor.price_pass(at_hour(12)).await.unwrap();
        assert_eq!(outcome.direction, Direction::Up);
        assert_eq!(outcome.events, vec![]);
    }

    #[tokio::test]
    async fn test_price_pass_raises_volatility_event() {
        let gateway = Arc::new(MockGateway::with_price(1.0));
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let monitor = Monitor::new(gateway.clone(), store, MonitorConfig::default());

        monitor.price_pass(at_hour(11)).await.unwrap();

        gateway.set_price(1.12); // +12%
        let outcome = monitor.price_pass(at_hour(12)).await.unwrap();

        assert_eq!(outcome.direction, Direction::Up);
        assert_eq!(
            outcome.events,
            vec![ChangeEvent::PriceVolatility {
                rate_percent: 12.0,
                direction: Direction::Up,
            }]
        );
    }

    #[tokio::test]
    async fn test_rollover_only_at_trigger_hour() {
        let gateway = Arc::new(MockGateway::with_price(1.0));
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let monitor = Monitor::new(gateway.clone(), store, MonitorConfig::default());

        let outcome = monitor.price_pass(at_hour(12)).await.unwrap();
        assert!(outcome.events.is_empty());

        let outcome = monitor.price_pass(at_hour(0)).await.unwrap();
        let rollover = outcome
            .events
            .iter()
            .find_map(|e| match e {
                ChangeEvent::DayRollover { summary } => Some(summary.clone()),
                _ => None,
            })
            .expect("rollover event at hour 0");

        assert_eq!(rollover.price_usd, 1.0);
        assert_eq!(rollover.supply, 419_000_000.0);
        assert_eq!(rollover.holder_count, 1234);
        // (420_000_069 - 419_000_000) / 420_000_069 * 100
        let expected_burn = (420_000_069.0 - 419_000_000.0) / 420_000_069.0 * 100.0;
        assert!((rollover.burned_pct - expected_burn).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rollover_records_supply_on_daily_bucket() {
        let gateway = Arc::new(MockGateway::with_price(1.0));
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let monitor = Monitor::new(gateway, store.clone(), MonitorConfig::default());

        monitor.price_pass(at_hour(0)).await.unwrap();

        let bucket = store.get(DAILY_PRICE_BUCKET).await.unwrap().unwrap();
        assert_eq!(bucket.supply, Some(419_000_000.0));
        assert_eq!(bucket.price_usd, Some(1.0));
    }

    #[tokio::test]
    async fn test_failed_price_fetch_mutates_nothing() {
        let gateway = MockGateway::with_price(1.0);
        *gateway.price.lock().unwrap() = Err(());
        let (monitor, store) = monitor_with(gateway).await;

        let result = monitor.price_pass(at_hour(12)).await;
        assert!(result.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pool_pass_reports_new_pools() {
        let mut gateway = MockGateway::with_price(1.0);
        gateway.pools = vec![entry("pool-a", 1.0), entry("pool-b", 2.0)];
        let (monitor, store) = monitor_with(gateway).await;

        let events = monitor.pool_pass(at_hour(12)).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(store.count().await.unwrap(), 2);

        // Same snapshot again: novelty only.
        let events = monitor.pool_pass(at_hour(13)).await.unwrap();
        assert_eq!(events, vec![]);
    }
}
