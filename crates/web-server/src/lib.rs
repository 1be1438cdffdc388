// In crates/web-server/src/lib.rs

use analytics::{ChartDataPoint, PerformanceReport, TagComparison};
use app_config::types::ServerSettings;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use database::TradeStore;
use engine::{AnalyticsRequest, AnalyticsService, EngineConfig, EVENT_CHANNEL_SIZE};
use events::EngineEvent;
use futures::{sink::SinkExt, stream::Stream, stream::StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use types::{split_tags, AnalyticsParams};

pub mod error;
pub mod types;

pub use error::{Error, Result};

/// Replay cache of recent log events for newly connected sockets.
pub type WsCache = Arc<Mutex<VecDeque<EngineEvent>>>;

/// The maximum number of messages to keep in the replay cache.
pub const WS_CACHE_SIZE: usize = 200;

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TradeStore>,
    pub config: EngineConfig,
    /// Global log stream, fed by the tracing layer.
    pub ws_tx: broadcast::Sender<EngineEvent>,
    pub ws_cache: WsCache,
}

impl AppState {
    pub fn new(store: Arc<dyn TradeStore>, config: EngineConfig) -> Self {
        let (ws_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            store,
            config,
            ws_tx,
            ws_cache: Arc::new(Mutex::new(VecDeque::with_capacity(WS_CACHE_SIZE))),
        }
    }

    /// Builds the request for one HTTP call, defaulting the reference date to today.
    fn request(&self, calendar_id: String, params: AnalyticsParams) -> AnalyticsRequest {
        AnalyticsRequest {
            calendar_id,
            time_period: params.time_period,
            reference_date: params.reference_date.unwrap_or_else(engine::today),
            comparison: TagComparison {
                primary: split_tags(params.primary_tags.as_deref()),
                secondary: split_tags(params.secondary_tags.as_deref()),
            },
        }
    }

    async fn report(&self, request: &AnalyticsRequest) -> Result<PerformanceReport> {
        if request.calendar_id.trim().is_empty() {
            return Err(Error::BadRequest("calendarId must not be empty".into()));
        }
        let report =
            engine::compute_report(self.store.as_ref(), &self.config, request, engine::today(), ()).await?;
        Ok(report)
    }
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/calendars/{calendarId}/chart", get(get_chart_handler))
        .route("/calendars/{calendarId}/stats", get(get_stats_handler));

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for `GET /api/calendars/{calendarId}/chart`.
/// Returns the cumulative P&L series for the requested window.
async fn get_chart_handler(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Vec<ChartDataPoint>>> {
    let request = state.request(calendar_id, params);
    let report = state.report(&request).await?;
    Ok(Json(report.cumulative))
}

/// Handler for `GET /api/calendars/{calendarId}/stats`.
async fn get_stats_handler(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<PerformanceReport>> {
    let request = state.request(calendar_id, params);
    tracing::debug!(calendar_id = %request.calendar_id, period = %request.time_period, "Stats requested.");
    let report = state.report(&request).await?;
    Ok(Json(report))
}

/// The handler for `GET /ws`.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Serves one socket: replays recent logs, then streams log and analytics events.
///
/// Every `AnalyticsRequest` frame the client sends supersedes the previous one;
/// only the latest request ever produces a snapshot.
async fn handle_socket(socket: WebSocket, state: AppState) {
    tracing::info!("New WebSocket client connected.");
    let (mut sender, receiver) = socket.split();

    let replay: Vec<EngineEvent> = match state.ws_cache.lock() {
        Ok(cache) => cache.iter().cloned().collect(),
        Err(_) => Vec::new(),
    };
    for event in &replay {
        if send_event(&mut sender, event).await.is_err() {
            tracing::info!("WebSocket client disconnected during replay.");
            return;
        }
    }

    let (engine_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
    let service = Arc::new(AnalyticsService::new(state.store.clone(), state.config.clone(), engine_tx));
    let mut engine_rx = service.subscribe();
    let mut log_rx = state.ws_tx.subscribe();
    // Request parse errors are reported back on the same socket.
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<EngineEvent>();

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                Ok(event) = engine_rx.recv() => event,
                Ok(event) = log_rx.recv() => event,
                Some(event) = reply_rx.recv() => event,
                else => break,
            };
            if send_event(&mut sender, &event).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(serve_requests(receiver, service, reply_tx));

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    tracing::info!("WebSocket client connection closed.");
}

/// Starts an analytics request for every text frame until the client closes.
///
/// Each request is started before the next frame is read, so the latest
/// frame always becomes the current request. Results arrive as events.
async fn serve_requests<S, E>(
    mut incoming: S,
    service: Arc<AnalyticsService>,
    reply_tx: mpsc::UnboundedSender<EngineEvent>,
) where
    S: Stream<Item = std::result::Result<Message, E>> + Unpin,
{
    while let Some(Ok(msg)) = incoming.next().await {
        match msg {
            Message::Text(text) => {
                let started = serde_json::from_str::<AnalyticsRequest>(text.as_str())
                    .map_err(|e| format!("malformed request: {e}"))
                    .and_then(|request| service.start(request).map_err(|e| e.to_string()));
                match started {
                    Ok(pending) => {
                        let service = service.clone();
                        tokio::spawn(async move {
                            let _ = service.complete(pending).await;
                        });
                    }
                    Err(error) => {
                        tracing::warn!(%error, "Rejected analytics request.");
                        let _ = reply_tx.send(EngineEvent::Failed {
                            request_id: service.current_request(),
                            error,
                        });
                    }
                }
            }
            Message::Close(_) => {
                tracing::info!("WebSocket client sent close frame.");
                break;
            }
            _ => {}
        }
    }
}

async fn send_event<S>(sender: &mut S, event: &EngineEvent) -> std::result::Result<(), ()>
where
    S: futures::Sink<Message> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize event.");
    })?;
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// The main entry point for running the web server.
///
/// Runs until the process is terminated or the listener fails.
pub async fn run(settings: ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServeError)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use core_types::{Outcome, Trade, TradeId};
    use database::InMemoryTradeStore;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    fn trade(id: &str, day: u32, outcome: Outcome, amount: rust_decimal::Decimal, tags: &[&str]) -> Trade {
        Trade {
            id: TradeId(id.to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            amount,
            outcome,
            risk_to_reward: Some(1.5),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            session: None,
        }
    }

    fn state() -> (AppState, Arc<InMemoryTradeStore>) {
        let store = Arc::new(InMemoryTradeStore::with_trades(
            "cal",
            vec![
                trade("1", 1, Outcome::Win, dec!(100), &["A"]),
                trade("2", 3, Outcome::Loss, dec!(-40), &["A", "B"]),
            ],
        ));
        (AppState::new(store.clone(), EngineConfig::default()), store)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = state();
        let response = create_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chart_covers_every_day_of_the_month() {
        let (state, _) = state();
        let (status, body) = get(
            create_router(state),
            "/api/calendars/cal/chart?timePeriod=month&referenceDate=2024-03-10",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let points = body.as_array().unwrap();
        assert_eq!(points.len(), 31);
        assert_eq!(points[0]["label"], "Mar 01");
    }

    #[tokio::test]
    async fn test_stats_with_tag_comparison() {
        let (state, _) = state();
        let (status, body) = get(
            create_router(state),
            "/api/calendars/cal/stats?timePeriod=month&referenceDate=2024-03-10&primaryTags=B",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["win_loss"]["total_trades"], 2);
        assert_eq!(body["win_loss"]["win_rate"], 50.0);
        let comparison = body["tag_comparison"].as_array().unwrap();
        assert_eq!(comparison.len(), 1);
        assert_eq!(comparison[0]["tag"], "B");
    }

    #[tokio::test]
    async fn test_storage_outage_is_503() {
        let (state, store) = state();
        store.set_outage(Some("connection refused".into())).await;
        let (status, body) = get(
            create_router(state),
            "/api/calendars/cal/stats?timePeriod=all&referenceDate=2024-03-10",
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unknown_time_period_is_rejected() {
        let (state, _) = state();
        let (status, _) = get(create_router(state), "/api/calendars/cal/chart?timePeriod=week").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    /// A store whose "slow" calendar blocks until released.
    struct GatedStore {
        inner: InMemoryTradeStore,
        gate: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl TradeStore for GatedStore {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn trades_for_calendar(&self, calendar_id: &str) -> database::Result<Vec<Trade>> {
            if calendar_id == "slow" {
                self.gate.notified().await;
            }
            self.inner.trades_for_calendar(calendar_id).await
        }

        async fn insert_trades(&self, calendar_id: &str, trades: &[Trade]) -> database::Result<()> {
            self.inner.insert_trades(calendar_id, trades).await
        }
    }

    fn frame(json: &str) -> std::result::Result<Message, axum::Error> {
        Ok(Message::Text(json.to_string().into()))
    }

    #[tokio::test]
    async fn test_socket_requests_latest_frame_wins() {
        let inner = InMemoryTradeStore::with_trades("slow", vec![trade("1", 1, Outcome::Loss, dec!(-5), &[])]);
        inner
            .insert_trades("fast", &[trade("2", 2, Outcome::Win, dec!(9), &[])])
            .await
            .unwrap();
        let store = Arc::new(GatedStore {
            inner,
            gate: tokio::sync::Notify::new(),
        });

        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let service = Arc::new(AnalyticsService::new(store.clone(), EngineConfig::default(), tx));
        let mut events = service.subscribe();
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

        let frames = vec![
            frame(r#"{"calendarId": "slow", "timePeriod": "all", "referenceDate": "2024-03-10"}"#),
            frame("{not json"),
            frame(r#"{"calendarId": "fast", "timePeriod": "all", "referenceDate": "2024-03-10"}"#),
            Ok(Message::Close(None)),
        ];
        serve_requests(futures::stream::iter(frames), service.clone(), reply_tx).await;
        assert_eq!(service.current_request(), 2);

        match reply_rx.recv().await.unwrap() {
            EngineEvent::Failed { request_id, error } => {
                assert_eq!(request_id, 1);
                assert!(error.starts_with("malformed request"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        let mut snapshot = None;
        let mut superseded = false;
        let wait = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while snapshot.is_none() || !superseded {
                match events.recv().await.unwrap() {
                    EngineEvent::Snapshot(s) => snapshot = Some(s),
                    EngineEvent::Superseded { request_id } => {
                        assert_eq!(request_id, 1);
                        superseded = true;
                    }
                    _ => {}
                }
            }
        });
        wait.await.unwrap();

        let snapshot = snapshot.unwrap();
        assert_eq!(snapshot.request_id, 2);
        assert_eq!(snapshot.report.win_loss.total_pnl, dec!(9));
        store.gate.notify_waiters();
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(Some(" A, ,B ")), vec!["A".to_string(), "B".to_string()]);
        assert!(split_tags(None).is_empty());
    }
}
