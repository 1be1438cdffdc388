// In crates/database/src/memory.rs

use crate::{Error, Result, TradeStore};
use async_trait::async_trait;
use core_types::Trade;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A trade store held entirely in memory.
///
/// Used by the CLI for file-based reports and by tests, which can also switch
/// it into an "unavailable" state to exercise error propagation.
#[derive(Debug, Default)]
pub struct InMemoryTradeStore {
    calendars: RwLock<HashMap<String, Vec<Trade>>>,
    outage: RwLock<Option<String>>,
    fetches: AtomicUsize,
}

impl InMemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a single calendar.
    pub fn with_trades(calendar_id: impl Into<String>, trades: Vec<Trade>) -> Self {
        let mut calendars = HashMap::new();
        calendars.insert(calendar_id.into(), trades);
        Self {
            calendars: RwLock::new(calendars),
            ..Self::default()
        }
    }

    /// Makes every subsequent read fail with `reason`, or recovers when `None`.
    pub async fn set_outage(&self, reason: Option<String>) {
        *self.outage.write().await = reason;
    }

    /// How many reads reached this store.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TradeStore for InMemoryTradeStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn trades_for_calendar(&self, calendar_id: &str) -> Result<Vec<Trade>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.outage.read().await.clone() {
            return Err(Error::Unavailable(reason));
        }
        Ok(self
            .calendars
            .read()
            .await
            .get(calendar_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_trades(&self, calendar_id: &str, trades: &[Trade]) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let stored = calendars.entry(calendar_id.to_string()).or_default();
        for trade in trades {
            match stored.iter_mut().find(|t| t.id == trade.id) {
                Some(existing) => *existing = trade.clone(),
                None => stored.push(trade.clone()),
            }
        }
        Ok(())
    }
}
