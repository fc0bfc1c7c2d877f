//! Pool snapshot reconciliation.

use poolwatch_core::{ChangeEvent, PoolEntry, PoolRecord};
use poolwatch_store::PoolStore;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Collapse duplicate pool ids within one snapshot, last entry winning.
fn dedupe_last_wins(entries: Vec<PoolEntry>) -> Vec<PoolEntry> {
    let mut order: Vec<PoolEntry> = Vec::with_capacity(entries.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        match index.get(&entry.pool_id) {
            Some(&i) => order[i] = entry,
            None => {
                index.insert(entry.pool_id.clone(), order.len());
                order.push(entry);
            }
        }
    }
    order
}

fn record_from_entry(entry: &PoolEntry, now_ms: i64) -> PoolRecord {
    PoolRecord {
        pool_id: entry.pool_id.clone(),
        dex_id: entry.dex_id.clone(),
        pair_label: entry.pair_label.clone(),
        url: entry.url.clone(),
        price_native: entry.price_native,
        price_usd: entry.price_usd,
        liquidity_usd: entry.liquidity_usd,
        supply: None,
        last_seen_ms: now_ms,
    }
}

/// Diff a fresh pool snapshot against the store.
///
/// Unknown pools are inserted and reported as `NewPool`; known pools get a
/// silent refresh of their market-data fields. Pools absent from the
/// snapshot are left alone. Each upsert is an independent single-key write:
/// a failing pool is skipped with a warning and the rest of the pass
/// continues.
pub async fn reconcile_pools(
    store: &PoolStore,
    entries: Vec<PoolEntry>,
    now_ms: i64,
) -> Vec<ChangeEvent> {
    let entries = dedupe_last_wins(entries);
    let mut events = Vec::new();

    for entry in entries {
        let existing = match store.get(&entry.pool_id).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!(pool = %entry.pool_id, error = %e, "lookup failed, skipping pool");
                continue;
            }
        };

        match existing {
            Some(_) => {
                if let Err(e) = store
                    .update_market_fields(
                        &entry.pool_id,
                        entry.price_native,
                        entry.price_usd,
                        entry.liquidity_usd,
                        now_ms,
                    )
                    .await
                {
                    warn!(pool = %entry.pool_id, error = %e, "refresh failed, skipping pool");
                }
            }
            None => {
                let record = record_from_entry(&entry, now_ms);
                match store.insert(&record).await {
                    Ok(()) => {
                        debug!(pool = %record.pool_id, dex = %record.dex_id, "new pool discovered");
                        events.push(ChangeEvent::NewPool { record });
                    }
                    Err(e) => {
                        warn!(pool = %entry.pool_id, error = %e, "insert failed, skipping pool");
                    }
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use pretty_assertions::assert_eq;

    fn entry(pool_id: &str, price_usd: f64) -> PoolEntry {
        PoolEntry {
            pool_id: pool_id.to_string(),
            dex_id: CompactString::new("raydium"),
            pair_label: Some(CompactString::new("TOKE-USDC")),
            url: Some(format!("https://dexscreener.com/solana/{pool_id}")),
            price_native: Some(price_usd / 200.0),
            price_usd: Some(price_usd),
            liquidity_usd: Some(100_000.0),
        }
    }

    #[tokio::test]
    async fn test_unseen_pools_produce_one_event_each() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let events =
            reconcile_pools(&store, vec![entry("pool-a", 1.0), entry("pool-b", 2.0)], 1_000).await;

        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, ChangeEvent::NewPool { .. })));
        assert_eq!(store.count().await.unwrap(), 2);

        // Every snapshot field is copied verbatim into the record.
        let record = store.get("pool-a").await.unwrap().unwrap();
        assert_eq!(record.dex_id, "raydium");
        assert_eq!(record.pair_label.as_deref(), Some("TOKE-USDC"));
        assert_eq!(record.price_usd, Some(1.0));
        assert_eq!(record.last_seen_ms, 1_000);
    }

    #[tokio::test]
    async fn test_seen_pools_refresh_silently() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        reconcile_pools(&store, vec![entry("pool-a", 1.0), entry("pool-b", 2.0)], 1_000).await;

        let events =
            reconcile_pools(&store, vec![entry("pool-a", 1.1), entry("pool-b", 2.0)], 2_000).await;

        assert_eq!(events, vec![]);
        let a = store.get("pool-a").await.unwrap().unwrap();
        let b = store.get("pool-b").await.unwrap().unwrap();
        assert_eq!(a.price_usd, Some(1.1));
        assert_eq!(a.last_seen_ms, 2_000);
        assert_eq!(b.price_usd, Some(2.0));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent_modulo_last_seen() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let snapshot = vec![entry("pool-a", 1.0)];

        let first = reconcile_pools(&store, snapshot.clone(), 1_000).await;
        assert_eq!(first.len(), 1);
        let after_first = store.get("pool-a").await.unwrap().unwrap();

        let second = reconcile_pools(&store, snapshot, 2_000).await;
        assert_eq!(second, vec![]);
        let after_second = store.get("pool-a").await.unwrap().unwrap();

        assert_eq!(
            PoolRecord {
                last_seen_ms: 0,
                ..after_first
            },
            PoolRecord {
                last_seen_ms: 0,
                ..after_second.clone()
            }
        );
        assert_eq!(after_second.last_seen_ms, 2_000);
    }

    #[tokio::test]
    async fn test_duplicate_ids_last_entry_wins() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        let events = reconcile_pools(
            &store,
            vec![entry("pool-a", 1.0), entry("pool-a", 1.5)],
            1_000,
        )
        .await;

        // One pool, one event, with the last-seen price.
        assert_eq!(events.len(), 1);
        let record = store.get("pool-a").await.unwrap().unwrap();
        assert_eq!(record.price_usd, Some(1.5));
    }

    #[tokio::test]
    async fn test_disappeared_pools_are_left_alone() {
        let store = PoolStore::connect("sqlite::memory:").await.unwrap();
        reconcile_pools(&store, vec![entry("pool-a", 1.0), entry("pool-b", 2.0)], 1_000).await;

        let events = reconcile_pools(&store, vec![entry("pool-a", 1.1)], 2_000).await;

        assert_eq!(events, vec![]);
        let b = store.get("pool-b").await.unwrap().unwrap();
        assert_eq!(b.price_usd, Some(2.0));
        assert_eq!(b.last_seen_ms, 1_000);
    }
}
