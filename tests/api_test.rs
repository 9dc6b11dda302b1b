//! HTTP-level tests for the timer API.
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.
//! Tests run with paused tokio time so countdowns and background
//! publication advance deterministically.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::time::sleep;
use tower::ServiceExt;

use pomodoro_timers::api::create_router;
use pomodoro_timers::services::LogNotifier;
use pomodoro_timers::state::{AppState, Timing};
use pomodoro_timers::utils::MonotonicClock;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        Timing::default(),
        Arc::new(MonotonicClock::new()),
        Arc::new(LogNotifier),
    ));
    (create_router(Arc::clone(&state)), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(value) => send_json_text(app, method, uri, &value.to_string()).await,
        None => dispatch(app, Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()).await,
    }
}

async fn send_json_text(app: &Router, method: Method, uri: &str, text: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(text.to_string()))
        .unwrap();
    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn create(app: &Router, minutes: Value) -> (StatusCode, Value) {
    send(app, Method::POST, "/timers", Some(json!({ "minutes": minutes }))).await
}

fn timer(timers: &Value, id: u64) -> &Value {
    timers
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == id)
        .unwrap()
}

// ============================================================================
// Creation boundary
// ============================================================================

#[tokio::test(start_paused = true)]
async fn create_accepts_minutes_in_range() {
    let (app, _) = test_app();

    let (status, body) = create(&app, json!("25")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "applied");

    let (status, _) = create(&app, json!(1440)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, timers) = send(&app, Method::GET, "/timers", None).await;
    assert_eq!(timers[0]["display"], "00:25:00");
    assert_eq!(timers[0]["phase"], "idle");
    assert_eq!(timers[1]["display"], "24:00:00");
}

#[tokio::test(start_paused = true)]
async fn create_rejects_invalid_input() {
    let (app, state) = test_app();

    for input in [json!("0"), json!("-3"), json!("1441"), json!("abc"), json!(""), Value::Null] {
        let (status, body) = create(&app, input).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Enter a timer value from 1 to 1440 minutes.");
    }
    assert!(state.snapshot().unwrap().is_empty());
}

// ============================================================================
// Row intents
// ============================================================================

#[tokio::test(start_paused = true)]
async fn starting_another_timer_pauses_the_first() {
    let (app, _) = test_app();
    for _ in 0..3 {
        create(&app, json!("1")).await;
    }

    let (_, body) = send(&app, Method::POST, "/timers/1/start", None).await;
    assert_eq!(body["status"], "applied");
    let running: Vec<_> = body["timers"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["phase"] == "running")
        .map(|t| t["id"].clone())
        .collect();
    assert_eq!(running, vec![json!(1)]);

    sleep(Duration::from_secs(10)).await;
    let (_, body) = send(&app, Method::POST, "/timers/0/start", None).await;
    assert_eq!(timer(&body["timers"], 0)["phase"], "running");
    assert_eq!(timer(&body["timers"], 1)["phase"], "idle");
    assert_eq!(timer(&body["timers"], 1)["remaining_ms"], 50_000);
    assert_eq!(timer(&body["timers"], 2)["phase"], "idle");
}

#[tokio::test(start_paused = true)]
async fn stop_with_observed_value_then_reset() {
    let (app, _) = test_app();
    create(&app, json!("1")).await;

    send(&app, Method::POST, "/timers/0/start", None).await;
    let (_, body) = send(&app, Method::POST, "/timers/0/stop", Some(json!({ "remaining_ms": 12_000 }))).await;
    assert_eq!(timer(&body["timers"], 0)["remaining_ms"], 12_000);
    assert_eq!(timer(&body["timers"], 0)["display"], "00:00:12");
    assert_eq!(timer(&body["timers"], 0)["phase"], "idle");

    let (_, body) = send(&app, Method::POST, "/timers/0/reset", None).await;
    assert_eq!(timer(&body["timers"], 0)["remaining_ms"], 60_000);
    let (_, again) = send(&app, Method::POST, "/timers/0/reset", None).await;
    assert_eq!(timer(&again["timers"], 0)["remaining_ms"], 60_000);
}

#[tokio::test(start_paused = true)]
async fn malformed_stop_body_is_rejected() {
    let (app, state) = test_app();
    create(&app, json!("1")).await;
    send(&app, Method::POST, "/timers/0/start", None).await;

    let (status, body) = send_json_text(&app, Method::POST, "/timers/0/stop", "{\"remaining_ms\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(timer(&body["timers"], 0)["phase"], "running");

    let (status, _) = send(&app, Method::POST, "/timers/0/stop", Some(json!({ "remaining_ms": "soon" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.running_timer().unwrap().map(|(id, _)| id), Some(0));

    let (status, body) = send(&app, Method::POST, "/timers/0/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");
}

#[tokio::test(start_paused = true)]
async fn unrelated_rows_are_not_refreshed() {
    let (app, _) = test_app();
    for _ in 0..3 {
        create(&app, json!("5")).await;
    }
    send(&app, Method::POST, "/timers/1/start", None).await;
    send(&app, Method::POST, "/timers/1/stop", None).await;

    let (_, timers) = send(&app, Method::GET, "/timers", None).await;
    assert_eq!(timer(&timers, 1)["refreshes"], 2);
    for id in [0, 2] {
        assert_eq!(timer(&timers, id)["refreshes"], 0);
        assert_eq!(timer(&timers, id)["binds"], 1);
    }
}

#[tokio::test(start_paused = true)]
async fn stale_ids_are_ignored() {
    let (app, _) = test_app();
    create(&app, json!("1")).await;

    let (status, body) = send(&app, Method::DELETE, "/timers/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");

    for (method, uri) in [
        (Method::POST, "/timers/0/start"),
        (Method::POST, "/timers/0/stop"),
        (Method::POST, "/timers/0/reset"),
        (Method::DELETE, "/timers/0"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");
    }
}

#[tokio::test(start_paused = true)]
async fn timer_completes_on_its_own() {
    let (app, _) = test_app();
    create(&app, json!("1")).await;
    send(&app, Method::POST, "/timers/0/start", None).await;

    sleep(Duration::from_secs(61)).await;
    let (_, timers) = send(&app, Method::GET, "/timers", None).await;
    assert_eq!(timer(&timers, 0)["phase"], "completed");
    assert_eq!(timer(&timers, 0)["display"], "00:00:00");
    assert_eq!(timer(&timers, 0)["progress"], 1.0);

    // a completed timer cannot be started again until reset
    let (_, body) = send(&app, Method::POST, "/timers/0/start", None).await;
    assert_eq!(body["status"], "ignored");
}

// ============================================================================
// Lifecycle and background continuation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn background_gap_longer_than_remaining_completes() {
    let (app, state) = test_app();
    create(&app, json!("1")).await;
    send(&app, Method::POST, "/timers/0/start", None).await;

    sleep(Duration::from_secs(30)).await;
    let (_, timers) = send(&app, Method::GET, "/timers", None).await;
    assert_eq!(timer(&timers, 0)["remaining_ms"], 30_000);

    let (_, body) = send(&app, Method::POST, "/lifecycle/background", None).await;
    assert_eq!(body["message"], "Background continuation started at 00:00:30");
    assert!(state.background_active());

    sleep(Duration::from_secs(35)).await;
    let (_, body) = send(&app, Method::POST, "/lifecycle/foreground", None).await;
    assert!(!state.background_active());
    assert_eq!(timer(&body["timers"], 0)["remaining_ms"], 0);
    assert_eq!(timer(&body["timers"], 0)["phase"], "completed");
}

#[tokio::test(start_paused = true)]
async fn raw_background_commands_are_idempotent() {
    let (app, state) = test_app();

    let (_, body) = send(&app, Method::POST, "/background", Some(json!({ "command": "STOP" }))).await;
    assert_eq!(body["status"], "ignored");

    let start = json!({ "command": "START", "remaining_ms": 90_000 });
    let (_, body) = send(&app, Method::POST, "/background", Some(start.clone())).await;
    assert_eq!(body["status"], "applied");
    let (_, body) = send(&app, Method::POST, "/background", Some(start)).await;
    assert_eq!(body["status"], "ignored");
    assert!(state.background_active());

    let (_, body) = send(&app, Method::POST, "/background", Some(json!({ "command": "STOP" }))).await;
    assert_eq!(body["status"], "applied");
    let (_, body) = send(&app, Method::POST, "/background", Some(json!({ "command": "STOP" }))).await;
    assert_eq!(body["status"], "ignored");
    assert!(!state.background_active());

    let (_, body) = send(&app, Method::POST, "/background", Some(json!({ "command": "PAUSE" }))).await;
    assert_eq!(body["status"], "ignored");
    let (status, body) = send(&app, Method::POST, "/background", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
}

#[tokio::test(start_paused = true)]
async fn status_reports_running_timer() {
    let (app, _) = test_app();
    create(&app, json!("2")).await;
    send(&app, Method::POST, "/timers/0/start", None).await;
    sleep(Duration::from_secs(5)).await;

    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer_count"], 1);
    assert_eq!(body["running_id"], 0);
    assert_eq!(body["running_remaining_ms"], 115_000);
    assert_eq!(body["running_display"], "00:01:55");
    assert_eq!(body["lifecycle"]["visible"], true);
    assert_eq!(body["last_action"], "start");

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
