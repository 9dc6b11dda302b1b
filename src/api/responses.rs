//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{LifecycleState, RowView, TimerId, TimerPhase},
    utils::{display_time, progress_fraction},
};

/// Body of `POST /timers`; minutes arrive as raw user input
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimerRequest {
    #[serde(default)]
    pub minutes: serde_json::Value,
}

impl CreateTimerRequest {
    /// The input as the text a user would have typed
    pub fn minutes_text(&self) -> String {
        match &self.minutes {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Optional body of `POST /timers/:id/stop`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopTimerRequest {
    pub remaining_ms: Option<u64>,
}

/// Body of `POST /background`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackgroundRequest {
    pub command: Option<String>,
    pub remaining_ms: Option<u64>,
}

/// One rendered timer row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub id: TimerId,
    pub remaining_ms: u64,
    pub duration_ms: u64,
    pub display: String,
    pub progress: f64,
    pub phase: TimerPhase,
    pub binds: u32,
    pub refreshes: u32,
}

impl TimerView {
    /// Build the view of `row` showing `live_remaining_ms`
    pub fn from_row(row: &RowView, live_remaining_ms: u64) -> Self {
        let record = &row.record;
        Self {
            id: record.id,
            remaining_ms: live_remaining_ms,
            duration_ms: record.duration_ms,
            display: display_time(live_remaining_ms),
            progress: progress_fraction(live_remaining_ms, record.duration_ms),
            phase: record.phase(),
            binds: row.binds,
            refreshes: row.refreshes,
        }
    }
}

/// API response structure for timer endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timers: Vec<TimerView>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timers: Vec<TimerView>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timers,
        }
    }

    /// The operation changed state
    pub fn applied(message: String, timers: Vec<TimerView>) -> Self {
        Self::new("applied".to_string(), message, timers)
    }

    /// The operation was a no-op
    pub fn ignored(message: String, timers: Vec<TimerView>) -> Self {
        Self::new("ignored".to_string(), message, timers)
    }

    /// Create an error response
    pub fn error(message: String, timers: Vec<TimerView>) -> Self {
        Self::new("error".to_string(), message, timers)
    }
}

/// Status response with the running timer and background information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer_count: usize,
    pub running_id: Option<TimerId>,
    pub running_remaining_ms: Option<u64>,
    pub running_display: Option<String>,
    pub lifecycle: LifecycleState,
    pub background_active: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
