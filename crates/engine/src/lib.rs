// In crates/engine/src/lib.rs

pub mod error;
pub mod task;

use analytics::{AnalyticsEngine, AnalyticsInput, PerformanceReport, ProgressObserver, TagComparison};
use app_config::Settings;
use chrono::NaiveDate;
use core_types::{AccountSettings, TimePeriod};
use database::TradeStore;
use events::{EngineEvent, ProgressEvent};
use risk::DynamicRiskSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

pub use error::{Error, Result};
pub use task::{AnalyticsService, PendingRefresh};

/// Capacity of the event broadcast channel.
pub const EVENT_CHANNEL_SIZE: usize = 1024;

/// The explicit configuration a calculation runs with.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub account: AccountSettings,
    pub risk: DynamicRiskSettings,
}

impl From<&Settings> for EngineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            account: settings.account.clone(),
            risk: settings.risk.clone(),
        }
    }
}

/// One analytics request: a calendar and a time window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    pub calendar_id: String,
    pub time_period: TimePeriod,
    pub reference_date: NaiveDate,
    #[serde(default)]
    pub comparison: TagComparison,
}

/// The report produced for the request that was current when it finished.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub request_id: u64,
    pub request: AnalyticsRequest,
    pub report: PerformanceReport,
}

/// Forwards analytics progress onto the event channel.
///
/// Events are only sent while `request_id` is still the current generation,
/// so a superseded calculation goes quiet even if it keeps running.
#[derive(Clone)]
pub struct BroadcastProgress {
    request_id: u64,
    current: Arc<AtomicU64>,
    tx: broadcast::Sender<EngineEvent>,
}

impl BroadcastProgress {
    pub fn new(request_id: u64, current: Arc<AtomicU64>, tx: broadcast::Sender<EngineEvent>) -> Self {
        Self { request_id, current, tx }
    }

    fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.request_id
    }

    fn send(&self, step: &str, current: usize, total: usize) {
        if !self.is_current() {
            return;
        }
        // No receivers is fine; progress is advisory.
        let _ = self.tx.send(EngineEvent::Progress(ProgressEvent {
            request_id: self.request_id,
            step: step.to_string(),
            current,
            total,
        }));
    }
}

impl ProgressObserver for BroadcastProgress {
    fn on_step(&self, step: &'static str, current: usize, total: usize) {
        self.send(step, current, total);
    }
}

/// Fetches the calendar's trades and calculates the report for one request.
///
/// Storage failures are returned as `Error::Storage`; the calculation itself
/// cannot fail and runs on the blocking pool.
pub async fn compute_report<O>(
    store: &dyn TradeStore,
    config: &EngineConfig,
    request: &AnalyticsRequest,
    today: NaiveDate,
    observer: O,
) -> Result<PerformanceReport>
where
    O: ProgressObserver + Send + 'static,
{
    let trades = store.trades_for_calendar(&request.calendar_id).await?;
    tracing::info!(
        calendar_id = %request.calendar_id,
        period = %request.time_period,
        reference_date = %request.reference_date,
        store = store.name(),
        trades = trades.len(),
        "Trades loaded, calculating analytics."
    );

    let config = config.clone();
    let request = request.clone();
    tokio::task::spawn_blocking(move || {
        let input = AnalyticsInput {
            trades: &trades,
            reference_date: request.reference_date,
            period: request.time_period,
            today,
            account: &config.account,
            comparison: &request.comparison,
            risk_settings: &config.risk,
        };
        AnalyticsEngine::new().calculate(&input, &observer)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))
}

/// Today's date in the local calendar.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
