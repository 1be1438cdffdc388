// --- Engine event structures broadcast to observers (CLI, WebSocket clients) ---

use analytics::PerformanceReport;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a log message event to be sent to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

/// Advisory progress of one analytics request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressEvent {
    pub request_id: u64,
    pub step: String,
    pub current: usize,
    pub total: usize,
}

/// A finished calculation for the request that is still current.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEvent {
    pub request_id: u64,
    pub report: PerformanceReport,
}

/// The top-level event enum.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    Log(LogEvent),
    Progress(ProgressEvent),
    Snapshot(Box<SnapshotEvent>),
    /// A request was replaced by a newer one before it finished.
    Superseded { request_id: u64 },
    /// A request failed, e.g. because the trade store was unavailable.
    Failed { request_id: u64, error: String },
}
