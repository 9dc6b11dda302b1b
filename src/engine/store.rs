//! Timer entity store
//!
//! Owns the ordered collection of timer records. Records are mutated only
//! through [`TimerStore::add`], [`TimerStore::start`], [`TimerStore::stop`],
//! [`TimerStore::reset`] and [`TimerStore::delete`]; consumers receive cloned
//! snapshots. Operations on ids that are not present are no-ops and report
//! `false`.

use tracing::debug;

use crate::{
    error::InputError,
    state::{TimerId, TimerRecord},
};

/// Longest allowed timer: 24 hours
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Default)]
pub struct TimerStore {
    records: Vec<TimerRecord>,
    next_id: TimerId,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer of `duration_ms`, returning its fresh id
    pub fn add(&mut self, duration_ms: u64) -> Result<TimerId, InputError> {
        if duration_ms == 0 || duration_ms > MAX_DURATION_MS {
            return Err(InputError::DurationOutOfRange(duration_ms));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(TimerRecord::new(id, duration_ms));
        debug!("Added timer {} ({} ms)", id, duration_ms);
        Ok(id)
    }

    /// Make `id` the only running record, anchored at `now_ms`.
    ///
    /// A record that was running before is frozen at its remaining time as of
    /// `now_ms`, with no noise threshold, so it keeps exactly the time it had
    /// counted down to. Completed records cannot be started; starting the record that is
    /// already running keeps its anchor.
    pub fn start(&mut self, id: TimerId, now_ms: u64) -> bool {
        match self.get(id) {
            Some(record) if record.is_running => return false,
            Some(record) if record.remaining_ms == 0 => return false,
            Some(_) => {}
            None => return false,
        }

        for record in self.records.iter_mut() {
            if record.id == id {
                record.run_from(now_ms);
            } else if record.is_running {
                let frozen = record.remaining_at(now_ms);
                debug!("Timer {} paused by start of {} at {} ms", record.id, id, frozen);
                record.freeze_at(frozen);
            }
        }
        true
    }

    /// Stop `id` at the caller's observed remaining time
    pub fn stop(&mut self, id: TimerId, observed_remaining_ms: u64) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.freeze_at(observed_remaining_ms);
                true
            }
            None => false,
        }
    }

    /// Restore `id` to its full duration, not running
    pub fn reset(&mut self, id: TimerId) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                let duration = record.duration_ms;
                record.freeze_at(duration);
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: TimerId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    pub fn get(&self, id: TimerId) -> Option<&TimerRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    fn get_mut(&mut self, id: TimerId) -> Option<&mut TimerRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// The running record, if any
    pub fn running(&self) -> Option<&TimerRecord> {
        self.records.iter().find(|record| record.is_running)
    }

    pub fn records(&self) -> &[TimerRecord] {
        &self.records
    }

    /// Immutable copy of the full ordered collection
    pub fn snapshot(&self) -> Vec<TimerRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
