//! Pomodoro Timers - A multi-timer countdown server
//! 
//! This is the main entry point for the pomodoro-timers application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use pomodoro_timers::{
    api::create_router,
    config::Config,
    services::{check_notify_send_available, NotifierKind},
    state::AppState,
    tasks::BackgroundCommand,
    utils::{shutdown_signal, MonotonicClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-timers server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, publish={}ms, notifier={:?}",
          config.host, config.port, config.tick_ms, config.publish_ms, config.notifier);

    let mut notifier_kind = config.notifier;
    if notifier_kind == NotifierKind::Desktop {
        if let Err(e) = check_notify_send_available().await {
            warn!("{}; falling back to log notifications", e);
            notifier_kind = NotifierKind::Log;
        }
    }

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.timing(),
        Arc::new(MonotonicClock::new()),
        notifier_kind.build(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers                - List timer rows");
    info!("  POST   /timers                - Create a timer from minutes");
    info!("  POST   /timers/:id/start      - Start a timer (pauses the running one)");
    info!("  POST   /timers/:id/stop       - Stop a timer");
    info!("  POST   /timers/:id/reset      - Reset a timer");
    info!("  DELETE /timers/:id            - Delete a timer");
    info!("  POST   /lifecycle/background  - Client hidden, continue in background");
    info!("  POST   /lifecycle/foreground  - Client visible again");
    info!("  POST   /background            - Raw START/STOP background command");
    info!("  GET    /status                - Check current status");
    info!("  GET    /health                - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Leave no background publisher behind
    if let Err(e) = state.send_background(BackgroundCommand::Stop).await {
        warn!("Failed to stop background continuation: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
