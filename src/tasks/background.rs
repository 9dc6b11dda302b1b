//! Background continuation task
//!
//! While the client is not visible, republishes the remaining time of the
//! running timer into a persistent notification. The task shares no state
//! with the foreground: it gets one remaining value at hand-off and computes
//! everything else from its own clock readings.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, timeout},
};
use tracing::{debug, info, warn};

use crate::{
    services::{Notification, Notifier},
    utils::{display_time, Clock},
};

/// Longest wait for the notification surface to dismiss
const DISMISS_TIMEOUT: Duration = Duration::from_secs(5);

/// Activation signal exchanged with the background continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundCommand {
    Start { remaining_ms: u64 },
    Stop,
}

impl BackgroundCommand {
    /// Parse a raw command; anything unrecognized or incomplete is `None`
    pub fn parse(command: Option<&str>, remaining_ms: Option<u64>) -> Option<Self> {
        match command? {
            "START" => remaining_ms.map(|remaining_ms| BackgroundCommand::Start { remaining_ms }),
            "STOP" => Some(BackgroundCommand::Stop),
            _ => None,
        }
    }
}

struct Publication {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owner of the single periodic publisher
pub struct BackgroundContinuation {
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    period: Duration,
    job: Mutex<Option<Publication>>,
}

impl BackgroundContinuation {
    pub fn new(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>, period: Duration) -> Self {
        Self {
            notifier,
            clock,
            period,
            job: Mutex::new(None),
        }
    }

    /// Check if a publisher is currently running
    pub fn is_active(&self) -> bool {
        self.job.lock().map(|job| job.is_some()).unwrap_or(false)
    }

    /// Apply a command. Returns whether anything changed: `Start` while
    /// running and `Stop` while idle are no-ops.
    pub async fn handle(&self, command: BackgroundCommand) -> Result<bool, String> {
        match command {
            BackgroundCommand::Start { remaining_ms } => self.start(remaining_ms),
            BackgroundCommand::Stop => self.stop().await,
        }
    }

    fn start(&self, remaining_ms: u64) -> Result<bool, String> {
        let mut job = self.job.lock()
            .map_err(|e| format!("Failed to lock background job: {}", e))?;

        if job.is_some() {
            debug!("Background continuation already running, ignoring start");
            return Ok(false);
        }

        info!("Starting background continuation at {}", display_time(remaining_ms));
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(publication_task(
            Arc::clone(&self.notifier),
            Arc::clone(&self.clock),
            remaining_ms,
            self.period,
            stop_rx,
        ));
        *job = Some(Publication { stop_tx, handle });
        Ok(true)
    }

    async fn stop(&self) -> Result<bool, String> {
        let publication = {
            let mut job = self.job.lock()
                .map_err(|e| format!("Failed to lock background job: {}", e))?;
            job.take()
        };

        let Some(publication) = publication else {
            debug!("Background continuation not running, ignoring stop");
            return Ok(false);
        };

        info!("Stopping background continuation");
        // The receiver may already be gone if the task ended on its own
        let _ = publication.stop_tx.send(true);
        publication.handle.await
            .map_err(|e| format!("Background continuation task failed: {}", e))?;

        match timeout(DISMISS_TIMEOUT, self.notifier.dismiss()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to dismiss notification: {}", e),
            Err(_) => warn!("Dismissing notification timed out after {:?}", DISMISS_TIMEOUT),
        }
        Ok(true)
    }
}

/// Publish `start_remaining_ms - elapsed` every `period` until stopped.
///
/// A publish that has not finished within one period is abandoned, and a
/// stop request interrupts a publish in flight.
async fn publication_task(
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    start_remaining_ms: u64,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mark = clock.now_ms();
    let mut ticker = interval(period);
    let mut reached_zero = false;

    loop {
        tokio::select! {
            biased;

            _ = stop_rx.changed() => break,

            _ = ticker.tick() => {
                let elapsed = clock.now_ms().saturating_sub(mark);
                let remaining = start_remaining_ms.saturating_sub(elapsed);

                let publish = timeout(period, notifier.publish(Notification::remaining(display_time(remaining))));
                tokio::select! {
                    biased;

                    _ = stop_rx.changed() => break,

                    published = publish => match published {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!("Failed to publish notification: {}", e),
                        Err(_) => warn!("Publishing notification timed out after {:?}", period),
                    },
                }
                if remaining == 0 && !reached_zero {
                    info!("Background countdown reached zero");
                    reached_zero = true;
                }
            }
        }
    }
    debug!("Background publication stopped");
}
