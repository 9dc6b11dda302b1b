//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_timers_handler).post(create_timer_handler))
        .route("/timers/:id", delete(delete_timer_handler))
        .route("/timers/:id/start", post(start_timer_handler))
        .route("/timers/:id/stop", post(stop_timer_handler))
        .route("/timers/:id/reset", post(reset_timer_handler))
        // Process lifecycle hooks
        .route("/lifecycle/background", post(background_handler))
        .route("/lifecycle/foreground", post(foreground_handler))
        .route("/background", post(background_command_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
