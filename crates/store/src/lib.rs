//! SQLite-backed pool store.
//!
//! One durable table keyed by `pool_id` holds both real liquidity pools and
//! the synthetic single-slot sample buckets used for rate calculation.
//! Records are inserted once and mutated afterwards; nothing here deletes.

use compact_str::CompactString;
use poolwatch_core::PoolRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Row tuple as selected from the pools table.
type PoolRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    i64,
);

fn record_from_row(row: PoolRow) -> PoolRecord {
    let (pool_id, dex_id, pair_label, url, price_native, price_usd, liquidity_usd, supply, last_seen_ms) =
        row;
    PoolRecord {
        pool_id,
        dex_id: CompactString::new(&dex_id),
        pair_label: pair_label.map(|s| CompactString::new(&s)),
        url,
        price_native,
        price_usd,
        liquidity_usd,
        supply,
        last_seen_ms,
    }
}

/// Durable pool store.
#[derive(Clone)]
pub struct PoolStore {
    pool: SqlitePool,
}

impl PoolStore {
    /// Connect to the SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pools (
                pool_id TEXT PRIMARY KEY,
                dex_id TEXT NOT NULL,
                pair_label TEXT,
                url TEXT,
                price_native REAL,
                price_usd REAL,
                liquidity_usd REAL,
                supply REAL,
                last_seen_ms INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Point lookup by pool id.
    pub async fn get(&self, pool_id: &str) -> Result<Option<PoolRecord>, StoreError> {
        let row = sqlx::query_as::<_, PoolRow>(
            r#"
            SELECT pool_id, dex_id, pair_label, url, price_native, price_usd,
                   liquidity_usd, supply, last_seen_ms
            FROM pools WHERE pool_id = ?
            "#,
        )
        .bind(pool_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(record_from_row))
    }

    /// Insert a record observed for the first time.
    pub async fn insert(&self, record: &PoolRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pools (
                pool_id, dex_id, pair_label, url,
                price_native, price_usd, liquidity_usd, supply, last_seen_ms
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.pool_id)
        .bind(record.dex_id.as_str())
        .bind(record.pair_label.as_ref().map(|s| s.as_str()))
        .bind(&record.url)
        .bind(record.price_native)
        .bind(record.price_usd)
        .bind(record.liquidity_usd)
        .bind(record.supply)
        .bind(record.last_seen_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Refresh the market-data fields of an existing record.
    /// Identity fields (`dex_id`, `pair_label`, `url`) are never touched, and
    /// `last_seen_ms` can only move forward.
    pub async fn update_market_fields(
        &self,
        pool_id: &str,
        price_native: Option<f64>,
        price_usd: Option<f64>,
        liquidity_usd: Option<f64>,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE pools
            SET price_native = ?, price_usd = ?, liquidity_usd = ?,
                last_seen_ms = MAX(last_seen_ms, ?)
            WHERE pool_id = ?
            "#,
        )
        .bind(price_native)
        .bind(price_usd)
        .bind(liquidity_usd)
        .bind(now_ms)
        .bind(pool_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read-then-overwrite the single price slot of a sample bucket, inside
    /// one transaction so concurrent same-key passes cannot interleave.
    ///
    /// Returns the previous price, or `None` when the bucket held no
    /// baseline yet (cold start; the bucket is created with the current
    /// price).
    pub async fn swap_price_sample(
        &self,
        bucket_id: &str,
        current_price: f64,
        now_ms: i64,
    ) -> Result<Option<f64>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query_as::<_, (Option<f64>,)>(
            "SELECT price_usd FROM pools WHERE pool_id = ?",
        )
        .bind(bucket_id)
        .fetch_optional(&mut *tx)
        .await?;

        match previous {
            Some((prev,)) => {
                sqlx::query(
                    r#"
                    UPDATE pools
                    SET price_usd = ?, last_seen_ms = MAX(last_seen_ms, ?)
                    WHERE pool_id = ?
                    "#,
                )
                .bind(current_price)
                .bind(now_ms)
                .bind(bucket_id)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                Ok(prev)
            }
            None => {
                let record = PoolRecord::bucket(bucket_id, current_price, now_ms);
                sqlx::query(
                    r#"
                    INSERT INTO pools (
                        pool_id, dex_id, pair_label, url,
                        price_native, price_usd, liquidity_usd, supply, last_seen_ms
                    )
                    VALUES (?, ?, NULL, NULL, NULL, ?, NULL, NULL, ?)
                    "#,
                )
                .bind(&record.pool_id)
                .bind(record.dex_id.as_str())
                .bind(record.price_usd)
                .bind(record.last_seen_ms)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                Ok(None)
            }
        }
    }

    /// Record the latest observed supply on a synthetic sample row.
    pub async fn set_bucket_supply(
        &self,
        bucket_id: &str,
        supply: f64,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE pools
            SET supply = ?, last_seen_ms = MAX(last_seen_ms, ?)
            WHERE pool_id = ?
            "#,
        )
        .bind(supply)
        .bind(now_ms)
        .bind(bucket_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pools")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolwatch_core::HOURLY_PRICE_BUCKET;
    use pretty_assertions::assert_eq;

    fn sample_record(pool_id: &str) -> PoolRecord {
        PoolRecord {
            pool_id: pool_id.to_string(),
            dex_id: CompactString::new("raydium"),
            pair_label: Some(CompactString::new("TOKE-USDC")),
            url: Some(format!("https://dexscreener.com/solana/{pool_id}")),
            price_native: Some(0.0021),
            price_usd: Some(0.45),
            liquidity_usd: Some(125_000.0),
            supply: None,
            last_seen_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let record = sample_record("pool-a");

        store.insert(&record).await.unwrap();
        let loaded = store.get("pool-a").await.unwrap().unwrap();
        assert_eq!(loaded, record);

        assert!(store.get("pool-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_touches_only_market_fields() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let record = sample_record("pool-a");
        store.insert(&record).await.unwrap();

        store
            .update_market_fields("pool-a", Some(0.0025), Some(0.50), Some(130_000.0), 2_000)
            .await
            .unwrap();

        let loaded = store.get("pool-a").await.unwrap().unwrap();
        assert_eq!(loaded.price_usd, Some(0.50));
        assert_eq!(loaded.price_native, Some(0.0025));
        assert_eq!(loaded.liquidity_usd, Some(130_000.0));
        assert_eq!(loaded.last_seen_ms, 2_000);
        // Identity fields survive untouched.
        assert_eq!(loaded.dex_id, record.dex_id);
        assert_eq!(loaded.pair_label, record.pair_label);
        assert_eq!(loaded.url, record.url);
    }

    #[tokio::test]
    async fn test_last_seen_never_goes_backwards() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        store.insert(&sample_record("pool-a")).await.unwrap();

        store
            .update_market_fields("pool-a", None, Some(0.46), None, 5_000)
            .await
            .unwrap();
        store
            .update_market_fields("pool-a", None, Some(0.47), None, 3_000)
            .await
            .unwrap();

        let loaded = store.get("pool-a").await.unwrap().unwrap();
        assert_eq!(loaded.last_seen_ms, 5_000);
        assert_eq!(loaded.price_usd, Some(0.47));
    }

    #[tokio::test]
    async fn test_sample_swap_cold_start_then_read() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();

        // First-ever sample creates the bucket and has no baseline.
        let prev = store
            .swap_price_sample(HOURLY_PRICE_BUCKET, 1.0, 1_000)
            .await
            .unwrap();
        assert_eq!(prev, None);

        // Second sample returns the stored baseline and overwrites it.
        let prev = store
            .swap_price_sample(HOURLY_PRICE_BUCKET, 1.1, 2_000)
            .await
            .unwrap();
        assert_eq!(prev, Some(1.0));

        let bucket = store.get(HOURLY_PRICE_BUCKET).await.unwrap().unwrap();
        assert_eq!(bucket.price_usd, Some(1.1));
        assert_eq!(bucket.last_seen_ms, 2_000);
    }

    #[tokio::test]
    async fn test_bucket_supply() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        store
            .swap_price_sample("birdeye_price", 0.5, 1_000)
            .await
            .unwrap();

        store
            .set_bucket_supply("birdeye_price", 419_000_000.0, 2_000)
            .await
            .unwrap();

        let bucket = store.get("birdeye_price").await.unwrap().unwrap();
        assert_eq!(bucket.supply, Some(419_000_000.0));
    }
}
