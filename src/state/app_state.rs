//! Main application state management
//!
//! `AppState` is the single logical owner of the timer store, the list view
//! and the active countdown. All of them live behind one mutex that is never
//! held across an `.await`, so every operation runs to completion before the
//! next one is observed and countdown ticks cannot race user actions.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use super::{LifecycleState, ListView, RowView, TimerId, TimerRecord};
use crate::{
    engine::{
        correct, minutes_to_ms, parse_minutes, Correction, CountdownDriver, RowChange, Tick, TimerStore,
    },
    error::TimerError,
    services::Notifier,
    tasks::{countdown_task, BackgroundCommand, BackgroundContinuation},
    utils::Clock,
};

/// Tick and publication periods
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Countdown driver tick; finer than the whole-second display
    pub tick: Duration,
    /// Background notification period
    pub publish: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            publish: Duration::from_secs(1),
        }
    }
}

/// The one live countdown; dropping it cancels its task
#[derive(Debug)]
struct ActiveCountdown {
    driver: CountdownDriver,
    generation: u64,
    _cancel: oneshot::Sender<()>,
}

#[derive(Debug, Default)]
struct Board {
    store: TimerStore,
    view: ListView,
    lifecycle: LifecycleState,
    countdown: Option<ActiveCountdown>,
    generation: u64,
}

impl Board {
    fn countdown_for(&self, id: TimerId) -> Option<&ActiveCountdown> {
        self.countdown.as_ref().filter(|active| active.driver.id() == id)
    }

    fn cancel_countdown_for(&mut self, id: TimerId) {
        if self.countdown_for(id).is_some() {
            debug!("Cancelling countdown for timer {}", id);
            self.countdown = None;
        }
    }

    /// Live remaining time of `id` at `now_ms`.
    ///
    /// Without a driver the running record is read by plain subtraction from
    /// its anchor, never above the value handed to the background.
    fn live_remaining(&self, id: TimerId, now_ms: u64) -> Option<u64> {
        if let Some(active) = self.countdown_for(id) {
            return Some(active.driver.observe(now_ms));
        }
        self.store.get(id).map(|record| {
            let remaining = record.remaining_at(now_ms);
            match self.lifecycle.handed_off_ms {
                Some(handed_off) if record.is_running => remaining.min(handed_off),
                _ => remaining,
            }
        })
    }

    fn is_running(&self, id: TimerId) -> bool {
        self.store.running().is_some_and(|record| record.id == id)
    }

    /// While hidden, a change to the running timer ends its publication
    fn release_background(&mut self, id: TimerId) -> Option<BackgroundCommand> {
        if self.lifecycle.in_background() && self.is_running(id) {
            self.lifecycle.handed_off_ms = None;
            Some(BackgroundCommand::Stop)
        } else {
            None
        }
    }
}

/// Main application state that owns all timers and background hand-off
pub struct AppState {
    board: Mutex<Board>,
    clock: Arc<dyn Clock>,
    timing: Timing,
    background: BackgroundContinuation,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel publishing a full snapshot after every change
    pub snapshot_tx: watch::Sender<Vec<TimerRecord>>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<Vec<TimerRecord>>,
}

impl AppState {
    /// Create a new AppState with an empty timer list
    pub fn new(
        port: u16,
        host: String,
        timing: Timing,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());
        let background = BackgroundContinuation::new(notifier, Arc::clone(&clock), timing.publish);

        Self {
            board: Mutex::new(Board::default()),
            clock,
            timing,
            background,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    fn board(&self) -> Result<MutexGuard<'_, Board>, TimerError> {
        self.board.lock()
            .map_err(|e| TimerError::Lock(format!("timer board: {}", e)))
    }

    /// Reconcile the list view and notify snapshot watchers
    fn publish(&self, board: &mut Board, action: &str) {
        let snapshot = board.store.snapshot();
        let changes = board.view.submit(&snapshot);
        let changed = changes
            .iter()
            .filter(|change| !matches!(change, RowChange::Unchanged { .. }))
            .count();
        debug!("{}: {} row changes", action, changed);

        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send snapshot: {}", e);
        }
        self.record_action(action);
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Start a countdown task for `record`, continuing from `remaining_ms`
    fn spawn_countdown(self: &Arc<Self>, board: &mut Board, record: &TimerRecord, remaining_ms: u64, now_ms: u64) {
        let mut driver = CountdownDriver::for_record(record);
        if !driver.resume(remaining_ms, now_ms) {
            return;
        }

        board.generation += 1;
        let generation = board.generation;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        board.countdown = Some(ActiveCountdown { driver, generation, _cancel: cancel_tx });

        tokio::spawn(countdown_task(
            Arc::clone(self),
            record.id,
            generation,
            self.timing.tick,
            cancel_rx,
        ));
    }

    /// Create a timer from the user's minutes text
    pub fn add_timer(&self, minutes_text: &str) -> Result<TimerId, TimerError> {
        let minutes = parse_minutes(minutes_text)?;
        let mut board = self.board()?;
        let id = board.store.add(minutes_to_ms(minutes))?;
        info!("Created timer {} for {} minutes", id, minutes);
        self.publish(&mut board, "add");
        Ok(id)
    }

    /// Make `id` the running timer; any other running timer is paused at
    /// the time it was showing
    pub async fn start(self: &Arc<Self>, id: TimerId) -> Result<bool, TimerError> {
        let follow_up = {
            let now = self.clock.now_ms();
            let mut board = self.board()?;

            let startable = board
                .store
                .get(id)
                .is_some_and(|record| !record.is_running && record.remaining_ms > 0);
            if !startable {
                debug!("Start of timer {} ignored", id);
                return Ok(false);
            }

            if let Some(previous) = board.store.running().map(|record| record.id) {
                if let Some(shown) = board.live_remaining(previous, now) {
                    debug!("Timer {} paused by start of {} at {} ms", previous, id, shown);
                    board.store.stop(previous, shown);
                }
            }
            board.countdown = None;
            board.store.start(id, now);

            let mut follow_up = None;
            if let Some(record) = board.store.get(id).cloned() {
                let remaining = record.remaining_ms;
                if board.lifecycle.visible {
                    self.spawn_countdown(&mut board, &record, remaining, now);
                } else {
                    board.lifecycle.handed_off_ms = Some(remaining);
                    follow_up = Some(BackgroundCommand::Start { remaining_ms: remaining });
                }
            }

            info!("Started timer {}", id);
            self.publish(&mut board, "start");
            follow_up
        };

        self.follow_in_background(follow_up).await?;
        Ok(true)
    }

    /// Stop `id` at `observed_ms`, or at its live remaining time if none is given
    pub async fn stop(&self, id: TimerId, observed_ms: Option<u64>) -> Result<bool, TimerError> {
        let follow_up = {
            let now = self.clock.now_ms();
            let mut board = self.board()?;

            let Some(remaining) = observed_ms.or_else(|| board.live_remaining(id, now)) else {
                debug!("Stop of missing timer {} ignored", id);
                return Ok(false);
            };
            let follow_up = board.release_background(id);
            board.cancel_countdown_for(id);

            if !board.store.stop(id, remaining) {
                return Ok(false);
            }
            info!("Stopped timer {} with {} ms remaining", id, remaining);
            self.publish(&mut board, "stop");
            follow_up
        };

        self.follow_in_background(follow_up).await?;
        Ok(true)
    }

    /// Restore `id` to its full duration
    pub async fn reset(&self, id: TimerId) -> Result<bool, TimerError> {
        let follow_up = {
            let mut board = self.board()?;
            let follow_up = board.release_background(id);
            board.cancel_countdown_for(id);

            if !board.store.reset(id) {
                debug!("Reset of missing timer {} ignored", id);
                return Ok(false);
            }
            info!("Reset timer {}", id);
            self.publish(&mut board, "reset");
            follow_up
        };

        self.follow_in_background(follow_up).await?;
        Ok(true)
    }

    /// Remove `id`; deleting a missing timer is a no-op
    pub async fn delete(&self, id: TimerId) -> Result<bool, TimerError> {
        let follow_up = {
            let mut board = self.board()?;
            let follow_up = board.release_background(id);
            board.cancel_countdown_for(id);

            if !board.store.delete(id) {
                debug!("Delete of missing timer {} ignored", id);
                return Ok(false);
            }
            info!("Deleted timer {}", id);
            self.publish(&mut board, "delete");
            follow_up
        };

        self.follow_in_background(follow_up).await?;
        Ok(true)
    }

    /// Bring the background publisher in line after a row intent made while
    /// the client is hidden. A new runner replaces the current publication.
    async fn follow_in_background(&self, follow_up: Option<BackgroundCommand>) -> Result<(), TimerError> {
        match follow_up {
            Some(start @ BackgroundCommand::Start { .. }) => {
                self.send_background(BackgroundCommand::Stop).await?;
                self.send_background(start).await?;
            }
            Some(BackgroundCommand::Stop) => {
                self.send_background(BackgroundCommand::Stop).await?;
            }
            None => {}
        }
        Ok(())
    }

    /// Bind a row: correct its remaining time and resume its countdown if it
    /// is running with no live driver
    pub fn bind(self: &Arc<Self>, id: TimerId) -> Result<Option<Correction>, TimerError> {
        self.bind_below(id, None)
    }

    /// Bind `id`, never resuming above `ceiling_ms` or the value a live
    /// driver already shows
    fn bind_below(self: &Arc<Self>, id: TimerId, ceiling_ms: Option<u64>) -> Result<Option<Correction>, TimerError> {
        let now = self.clock.now_ms();
        let mut board = self.board()?;

        let Some(record) = board.store.get(id).cloned() else {
            return Ok(None);
        };
        board.view.rebind(id);

        let correction = match correct(&record, now) {
            Correction::Resume { remaining_ms } => {
                let shown = board.countdown_for(id).map(|active| active.driver.observe(now));
                let remaining_ms = [shown, ceiling_ms].into_iter().flatten().fold(remaining_ms, u64::min);
                Correction::Resume { remaining_ms }
            }
            other => other,
        };

        match correction {
            Correction::AtRest { .. } => {}
            Correction::Completed | Correction::Resume { remaining_ms: 0 } => {
                board.cancel_countdown_for(id);
                board.store.stop(id, 0);
                info!("Timer {} completed while not visible", id);
                self.publish(&mut board, "complete");
                return Ok(Some(Correction::Completed));
            }
            Correction::Resume { remaining_ms } => {
                if board.lifecycle.visible && board.countdown_for(id).is_none() {
                    debug!("Resuming timer {} from {} ms", id, remaining_ms);
                    self.spawn_countdown(&mut board, &record, remaining_ms, now);
                }
            }
        }
        Ok(Some(correction))
    }

    /// Countdown tick callback. Returns whether the task should keep ticking.
    pub fn on_tick(&self, id: TimerId, generation: u64) -> Result<bool, TimerError> {
        let now = self.clock.now_ms();
        let mut board = self.board()?;

        let tick = match board.countdown.as_mut() {
            Some(active) if active.generation == generation && active.driver.id() == id => {
                active.driver.tick(now)
            }
            _ => return Ok(false),
        };

        match tick {
            Tick::Running { .. } => Ok(true),
            Tick::Completed => {
                board.countdown = None;
                board.store.stop(id, 0);
                info!("Timer {} finished", id);
                self.publish(&mut board, "complete");
                Ok(false)
            }
            Tick::Ignored => Ok(false),
        }
    }

    /// The client lost visibility: suspend the driver and hand the running
    /// timer's remaining time to the background continuation
    pub async fn enter_background(&self) -> Result<Option<u64>, TimerError> {
        let hand_off = {
            let now = self.clock.now_ms();
            let mut board = self.board()?;
            if !board.lifecycle.visible {
                return Ok(None);
            }
            board.lifecycle.visible = false;

            let hand_off = board
                .store
                .running()
                .map(|record| record.id)
                .and_then(|id| board.live_remaining(id, now));
            board.countdown = None;
            board.lifecycle.handed_off_ms = hand_off;
            hand_off
        };

        info!("Client moved to background");
        if let Some(remaining_ms) = hand_off {
            self.send_background(BackgroundCommand::Start { remaining_ms }).await?;
        }
        Ok(hand_off)
    }

    /// The client is visible again: stop the background continuation and
    /// rebind the running row so it resumes from its anchor
    pub async fn enter_foreground(self: &Arc<Self>) -> Result<Option<Correction>, TimerError> {
        self.send_background(BackgroundCommand::Stop).await?;

        let (running, handed_off) = {
            let mut board = self.board()?;
            let handed_off = if board.lifecycle.in_background() {
                board.lifecycle.handed_off_ms
            } else {
                None
            };
            board.lifecycle.visible = true;
            board.lifecycle.handed_off_ms = None;
            (board.store.running().map(|record| record.id), handed_off)
        };

        info!("Client moved to foreground");
        match running {
            Some(id) => self.bind_below(id, handed_off),
            None => Ok(None),
        }
    }

    /// Forward a raw activation signal to the background continuation
    pub async fn send_background(&self, command: BackgroundCommand) -> Result<bool, TimerError> {
        match self.background.handle(command).await {
            Ok(changed) => {
                if changed {
                    if let Ok(mut board) = self.board() {
                        board.lifecycle.clear_errors_for("background");
                    }
                }
                Ok(changed)
            }
            Err(e) => {
                warn!("Background command {:?} failed: {}", command, e);
                if let Ok(mut board) = self.board() {
                    board.lifecycle.add_error(format!("Background continuation failed: {}", e));
                }
                Err(TimerError::Background(e))
            }
        }
    }

    pub fn background_active(&self) -> bool {
        self.background.is_active()
    }

    /// Current snapshot of all timers
    pub fn snapshot(&self) -> Result<Vec<TimerRecord>, TimerError> {
        Ok(self.board()?.store.snapshot())
    }

    /// Subscribe to snapshot publication
    pub fn subscribe(&self) -> watch::Receiver<Vec<TimerRecord>> {
        self.snapshot_tx.subscribe()
    }

    /// Rendered rows paired with their live remaining time
    pub fn rows(&self) -> Result<Vec<(RowView, u64)>, TimerError> {
        let now = self.clock.now_ms();
        let board = self.board()?;
        Ok(board
            .view
            .rows()
            .iter()
            .map(|row| {
                let live = board
                    .live_remaining(row.record.id, now)
                    .unwrap_or(row.record.remaining_ms);
                (row.clone(), live)
            })
            .collect())
    }

    /// Running timer id and its live remaining time
    pub fn running_timer(&self) -> Result<Option<(TimerId, u64)>, TimerError> {
        let now = self.clock.now_ms();
        let board = self.board()?;
        Ok(board
            .store
            .running()
            .map(|record| record.id)
            .and_then(|id| board.live_remaining(id, now).map(|remaining| (id, remaining))))
    }

    /// Get current lifecycle state
    pub fn get_lifecycle_state(&self) -> Result<LifecycleState, TimerError> {
        Ok(self.board()?.lifecycle.clone())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
