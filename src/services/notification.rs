//! Notification surfaces for background continuation

use std::sync::Arc;

use clap::ValueEnum;
use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, info};

/// Content of the persistent "timer running" notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Notification showing the remaining time of the running timer
    pub fn remaining(display: String) -> Self {
        Self {
            title: "Timer running".to_string(),
            body: display,
        }
    }
}

/// External notification surface.
///
/// Delivery is best-effort: callers log failures and carry on.
pub trait Notifier: Send + Sync {
    /// Show or replace the persistent notification
    fn publish(&self, notification: Notification) -> BoxFuture<'_, Result<(), String>>;

    /// Remove the persistent notification
    fn dismiss(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// Which notifier the server publishes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierKind {
    /// Write notifications to the log
    Log,
    /// Send desktop notifications with notify-send
    Desktop,
}

impl NotifierKind {
    pub fn build(self) -> Arc<dyn Notifier> {
        match self {
            NotifierKind::Log => Arc::new(LogNotifier),
            NotifierKind::Desktop => Arc::new(DesktopNotifier::new()),
        }
    }
}

/// Notifier that only logs
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn publish(&self, notification: Notification) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            info!("[notification] {}: {}", notification.title, notification.body);
            Ok(())
        })
    }

    fn dismiss(&self) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async {
            info!("[notification] dismissed");
            Ok(())
        })
    }
}

/// Desktop notifier using `notify-send`.
///
/// Each publish replaces the previous bubble through the synchronous hint.
#[derive(Debug)]
pub struct DesktopNotifier {
    tag: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self { tag: "pomodoro-timers".to_string() }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn publish(&self, notification: Notification) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            debug!("Publishing desktop notification: {}", notification.body);

            let hint = format!("string:x-canonical-private-synchronous:{}", self.tag);
            let output = Command::new("notify-send")
                .args(["--urgency=low", "--hint", hint.as_str()])
                .arg(&notification.title)
                .arg(&notification.body)
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|e| format!("Failed to execute notify-send: {}", e))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(format!("notify-send failed: {}", stderr));
            }
            Ok(())
        })
    }

    fn dismiss(&self) -> BoxFuture<'_, Result<(), String>> {
        // notify-send cannot close a bubble; it expires on its own
        Box::pin(async { Ok(()) })
    }
}

/// Check if notify-send is available on the system
pub async fn check_notify_send_available() -> Result<(), String> {
    Command::new("notify-send")
        .arg("--version")
        .output()
        .await
        .map_err(|_| "notify-send is not available. Use --notifier log instead.".to_string())?;

    info!("notify-send is available");
    Ok(())
}
