//! Countdown tick task for the running timer

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::oneshot,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error};

use crate::state::{AppState, TimerId};

/// Drive the countdown of `id` until it completes, is cancelled or becomes
/// stale.
///
/// Cancellation happens when the owning `ActiveCountdown` is dropped, which
/// closes `cancel_rx`. Each tick goes through `AppState::on_tick`, which
/// rejects ticks from an older `generation`.
pub async fn countdown_task(
    state: Arc<AppState>,
    id: TimerId,
    generation: u64,
    tick: Duration,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    debug!("Starting countdown task for timer {} (generation {})", id, generation);

    let mut interval = interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = &mut cancel_rx => {
                debug!("Countdown for timer {} cancelled", id);
                break;
            }

            _ = interval.tick() => {
                match state.on_tick(id, generation) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("Countdown for timer {} finished", id);
                        break;
                    }
                    Err(e) => {
                        error!("Countdown tick for timer {} failed: {}", id, e);
                        break;
                    }
                }
            }
        }
    }
}
