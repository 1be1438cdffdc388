// In app/src/tracing_layer.rs

use chrono::Utc;
use events::{EngineEvent, LogEvent};
use tokio::sync::broadcast;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use web_server::{WsCache, WS_CACHE_SIZE};

/// Forwards every log event to connected WebSocket clients and the replay cache.
pub struct WsBroadcastLayer {
    tx: broadcast::Sender<EngineEvent>,
    cache: WsCache,
}

impl WsBroadcastLayer {
    pub fn new(tx: broadcast::Sender<EngineEvent>, cache: WsCache) -> Self {
        Self { tx, cache }
    }
}

impl<S> Layer<S> for WsBroadcastLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = LogMessageVisitor::default();
        event.record(&mut visitor);
        let msg = EngineEvent::Log(LogEvent {
            timestamp: Utc::now(),
            level: event.metadata().level().to_string(),
            message: visitor.finish(),
        });

        let _ = self.tx.send(msg.clone());

        // A poisoned cache only loses replay history.
        if let Ok(mut cache) = self.cache.lock() {
            if cache.len() >= WS_CACHE_SIZE {
                cache.pop_front();
            }
            cache.push_back(msg);
        }
    }
}

/// Captures the `message` field of an event, followed by its structured fields.
#[derive(Default)]
struct LogMessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl LogMessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl tracing::field::Visit for LogMessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::prelude::*;

    #[test]
    fn test_logs_reach_channel_and_bounded_cache() {
        let (tx, mut rx) = broadcast::channel(WS_CACHE_SIZE + 8);
        let cache: WsCache = Arc::new(Mutex::new(VecDeque::new()));
        let subscriber = tracing_subscriber::registry().with(WsBroadcastLayer::new(tx, cache.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(calendar_id = "cal", "Report ready.");
            for i in 0..WS_CACHE_SIZE {
                tracing::debug!(i, "filler");
            }
        });

        match rx.try_recv().unwrap() {
            EngineEvent::Log(log) => {
                assert_eq!(log.level, "INFO");
                assert_eq!(log.message, "Report ready. calendar_id=cal");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(cache.lock().unwrap().len(), WS_CACHE_SIZE);
    }
}
