use crate::{compute_report, today, AnalyticsRequest, AnalyticsSnapshot, BroadcastProgress, EngineConfig, Error, Result};
use analytics::engine::TOTAL_STEPS;
use analytics::PerformanceReport;
use database::TradeStore;
use events::{EngineEvent, ProgressEvent, SnapshotEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinHandle};

/// A self-contained analytics view for one consumer (a UI session, a socket).
///
/// Every `refresh` supersedes the previous one: the older in-flight task is
/// aborted, and its result is never returned even if it finishes first.
pub struct AnalyticsService {
    store: Arc<dyn TradeStore>,
    config: EngineConfig,
    events: broadcast::Sender<EngineEvent>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

/// A started request whose result has not been delivered yet.
pub struct PendingRefresh {
    pub request_id: u64,
    request: AnalyticsRequest,
    handle: JoinHandle<Result<PerformanceReport>>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn TradeStore>, config: EngineConfig, events: broadcast::Sender<EngineEvent>) -> Self {
        Self {
            store,
            config,
            events,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// The id of the most recent request.
    pub fn current_request(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, request_id: u64) -> bool {
        self.current_request() == request_id
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn lock_in_flight(&self) -> Result<std::sync::MutexGuard<'_, Option<AbortHandle>>> {
        self.in_flight
            .lock()
            .map_err(|_| Error::Task("in-flight lock poisoned".into()))
    }

    /// Recalculates analytics for `request`, superseding any request in flight.
    ///
    /// Returns `Error::Superseded` when a newer request arrives before this one
    /// is delivered.
    pub async fn refresh(&self, request: AnalyticsRequest) -> Result<AnalyticsSnapshot> {
        let pending = self.start(request)?;
        self.complete(pending).await
    }

    /// Makes `request` the current one and starts calculating it.
    ///
    /// Requests become current in the order `start` is called, so callers
    /// that receive requests in sequence must start them in sequence.
    pub fn start(&self, request: AnalyticsRequest) -> Result<PendingRefresh> {
        // Id assignment and the handle swap share one lock so concurrent
        // starts cannot abort each other out of order.
        let mut in_flight = self.lock_in_flight()?;

        let request_id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            request_id,
            calendar_id = %request.calendar_id,
            period = %request.time_period,
            "Analytics request started."
        );
        // Sent before the task exists so it always precedes the task's own progress.
        self.emit(EngineEvent::Progress(ProgressEvent {
            request_id,
            step: "fetch".into(),
            current: 0,
            total: TOTAL_STEPS,
        }));

        let store = self.store.clone();
        let config = self.config.clone();
        let observer = BroadcastProgress::new(request_id, self.generation.clone(), self.events.clone());
        let task_request = request.clone();
        let handle = tokio::spawn(async move {
            compute_report(store.as_ref(), &config, &task_request, today(), observer).await
        });

        if let Some(previous) = in_flight.replace(handle.abort_handle()) {
            previous.abort();
        }

        Ok(PendingRefresh {
            request_id,
            request,
            handle,
        })
    }

    /// Waits for a started request and delivers its result if it is still current.
    pub async fn complete(&self, pending: PendingRefresh) -> Result<AnalyticsSnapshot> {
        let PendingRefresh {
            request_id,
            request,
            handle,
        } = pending;

        let result = match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Superseded { request_id }),
            Err(e) => Err(Error::Task(e.to_string())),
        };

        let event = match &result {
            Ok(report) => EngineEvent::Snapshot(Box::new(SnapshotEvent {
                request_id,
                report: report.clone(),
            })),
            Err(Error::Superseded { .. }) => EngineEvent::Superseded { request_id },
            Err(e) => EngineEvent::Failed {
                request_id,
                error: e.to_string(),
            },
        };

        if !self.deliver_if_current(request_id, event)? {
            tracing::debug!(request_id, "Discarding result of a superseded request.");
            self.emit(EngineEvent::Superseded { request_id });
            return Err(Error::Superseded { request_id });
        }

        match result {
            Ok(report) => {
                tracing::info!(request_id, trades = report.win_loss.total_trades, "Analytics request completed.");
                Ok(AnalyticsSnapshot {
                    request_id,
                    request,
                    report,
                })
            }
            Err(e) => {
                tracing::error!(request_id, error = %e, "Analytics request failed.");
                Err(e)
            }
        }
    }

    /// Emits `event` only while `request_id` is current.
    ///
    /// Holds the in-flight lock so no newer request can start between the
    /// check and the send.
    fn deliver_if_current(&self, request_id: u64, event: EngineEvent) -> Result<bool> {
        let _in_flight = self.lock_in_flight()?;
        if !self.is_current(request_id) {
            return Ok(false);
        }
        self.emit(event);
        Ok(true)
    }
}
