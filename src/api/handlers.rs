//! HTTP endpoint handlers
//!
//! The four row intents (start, stop, reset, delete) are the only way client
//! actions reach the timers. Operations on unknown ids answer `ignored`
//! rather than failing.

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::TimerError,
    state::{AppState, TimerId},
    tasks::BackgroundCommand,
    utils::display_time,
};
use super::responses::{
    ApiResponse, BackgroundRequest, CreateTimerRequest, HealthResponse, StatusResponse,
    StopTimerRequest, TimerView,
};

fn internal_error(context: &str, e: TimerError) -> StatusCode {
    error!("{}: {}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn timer_views(state: &AppState) -> Result<Vec<TimerView>, StatusCode> {
    state
        .rows()
        .map(|rows| rows.iter().map(|(row, live)| TimerView::from_row(row, *live)).collect())
        .map_err(|e| internal_error("Failed to read timers", e))
}

/// Wrap the outcome of a row intent into a response with the current rows
fn intent_response(
    state: &AppState,
    outcome: Result<bool, TimerError>,
    action: &str,
    id: TimerId,
) -> Result<Json<ApiResponse>, StatusCode> {
    let applied = outcome.map_err(|e| internal_error(&format!("Failed to {} timer {}", action, id), e))?;
    let timers = timer_views(state)?;

    if applied {
        Ok(Json(ApiResponse::applied(format!("Timer {} {}", id, past_tense(action)), timers)))
    } else {
        Ok(Json(ApiResponse::ignored(format!("Timer {} not {}", id, past_tense(action)), timers)))
    }
}

fn past_tense(action: &str) -> &'static str {
    match action {
        "start" => "started",
        "stop" => "stopped",
        "reset" => "reset",
        "delete" => "deleted",
        _ => "changed",
    }
}

/// Handle GET /timers - Return the rendered rows
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TimerView>>, StatusCode> {
    timer_views(&state).map(Json)
}

/// Handle POST /timers - Create a timer from user input in minutes
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTimerRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let minutes = request.minutes_text();
    match state.add_timer(&minutes) {
        Ok(id) => {
            let timers = timer_views(&state)?;
            Ok((StatusCode::CREATED, Json(ApiResponse::applied(format!("Timer {} created", id), timers))))
        }
        Err(TimerError::InvalidInput(e)) => {
            warn!("Rejected timer input {:?}: {:?}", minutes, e);
            let timers = timer_views(&state)?;
            Ok((StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string(), timers))))
        }
        Err(e) => Err(internal_error("Failed to create timer", e)),
    }
}

/// Handle POST /timers/:id/start
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let outcome = state.start(id).await;
    intent_response(&state, outcome, "start", id)
}

/// Handle POST /timers/:id/stop - Optional body carries the observed remaining time
///
/// A request without a JSON body stops at the live value; a JSON body that
/// does not parse is rejected.
pub async fn stop_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    body: Result<Json<StopTimerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let observed = match body {
        Ok(Json(request)) => request.remaining_ms,
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => {
            warn!("Rejected stop body for timer {}: {}", id, rejection);
            let timers = timer_views(&state)?;
            return Ok((StatusCode::BAD_REQUEST, Json(ApiResponse::error(rejection.body_text(), timers))));
        }
    };
    let outcome = state.stop(id, observed).await;
    intent_response(&state, outcome, "stop", id).map(|response| (StatusCode::OK, response))
}

/// Handle POST /timers/:id/reset
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let outcome = state.reset(id).await;
    intent_response(&state, outcome, "reset", id)
}

/// Handle DELETE /timers/:id
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let outcome = state.delete(id).await;
    intent_response(&state, outcome, "delete", id)
}

/// Handle POST /lifecycle/background - The client is no longer visible
pub async fn background_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let hand_off = state
        .enter_background()
        .await
        .map_err(|e| internal_error("Failed to enter background", e))?;
    let timers = timer_views(&state)?;

    match hand_off {
        Some(remaining) => {
            info!("Background continuation handed {}", display_time(remaining));
            Ok(Json(ApiResponse::applied(
                format!("Background continuation started at {}", display_time(remaining)),
                timers,
            )))
        }
        None => Ok(Json(ApiResponse::ignored("No running timer to continue".to_string(), timers))),
    }
}

/// Handle POST /lifecycle/foreground - The client is visible again
pub async fn foreground_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let correction = state
        .enter_foreground()
        .await
        .map_err(|e| internal_error("Failed to enter foreground", e))?;
    let timers = timer_views(&state)?;

    let message = match correction {
        Some(correction) => format!("Running timer corrected to {}", display_time(correction.remaining_ms())),
        None => "Foreground restored".to_string(),
    };
    Ok(Json(ApiResponse::applied(message, timers)))
}

/// Handle POST /background - Raw START/STOP activation signal
pub async fn background_command_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<BackgroundRequest>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let timers = timer_views(&state)?;

    let Some(command) = BackgroundCommand::parse(request.command.as_deref(), request.remaining_ms) else {
        warn!("Ignoring unrecognized background command: {:?}", request.command);
        return Ok(Json(ApiResponse::ignored("Unrecognized background command".to_string(), timers)));
    };

    match state.send_background(command).await {
        Ok(true) => Ok(Json(ApiResponse::applied(format!("Background command {:?} applied", command), timers))),
        Ok(false) => Ok(Json(ApiResponse::ignored(format!("Background command {:?} had no effect", command), timers))),
        Err(e) => Ok(Json(ApiResponse::error(e.to_string(), timers))),
    }
}

/// Handle GET /status - Return current status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer_count = state
        .snapshot()
        .map(|snapshot| snapshot.len())
        .map_err(|e| internal_error("Failed to get timers", e))?;

    let running = state
        .running_timer()
        .map_err(|e| internal_error("Failed to get running timer", e))?;

    let lifecycle = state
        .get_lifecycle_state()
        .map_err(|e| internal_error("Failed to get lifecycle state", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer_count,
        running_id: running.map(|(id, _)| id),
        running_remaining_ms: running.map(|(_, remaining)| remaining),
        running_display: running.map(|(_, remaining)| display_time(remaining)),
        lifecycle,
        background_active: state.background_active(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
