// In crates/database/src/cache.rs

use crate::{Result, TradeStore};
use async_trait::async_trait;
use core_types::Trade;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A per-calendar read cache in front of another `TradeStore`.
///
/// The cache is owned by whoever constructs it and injected where needed.
/// Failed reads are never cached, and writes invalidate the calendar they touch.
pub struct CachedTradeStore<S> {
    inner: S,
    cache: RwLock<HashMap<String, Vec<Trade>>>,
    /// Bumped under the write lock on every invalidation. A read that started
    /// in an older epoch must not fill the cache.
    epoch: AtomicU64,
}

impl<S: TradeStore> CachedTradeStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops the cached trades of one calendar.
    pub async fn invalidate(&self, calendar_id: &str) {
        let mut cache = self.cache.write().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if cache.remove(calendar_id).is_some() {
            tracing::debug!(calendar_id, "Trade cache invalidated.");
        }
    }

    /// Drops every cached calendar.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        cache.clear();
    }
}

#[async_trait]
impl<S: TradeStore> TradeStore for CachedTradeStore<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn trades_for_calendar(&self, calendar_id: &str) -> Result<Vec<Trade>> {
        if let Some(trades) = self.cache.read().await.get(calendar_id) {
            return Ok(trades.clone());
        }
        let epoch = self.epoch.load(Ordering::SeqCst);
        let trades = self.inner.trades_for_calendar(calendar_id).await?;

        let mut cache = self.cache.write().await;
        if self.epoch.load(Ordering::SeqCst) == epoch {
            cache.insert(calendar_id.to_string(), trades.clone());
        } else {
            tracing::debug!(calendar_id, "Skipping cache fill for a read that overlapped a write.");
        }
        Ok(trades)
    }

    async fn insert_trades(&self, calendar_id: &str, trades: &[Trade]) -> Result<()> {
        let result = self.inner.insert_trades(calendar_id, trades).await;
        self.invalidate(calendar_id).await;
        result
    }
}
