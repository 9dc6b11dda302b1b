//! Timer record structure

use serde::{Deserialize, Serialize};

/// Identity of a timer; assigned once and never reused by a store
pub type TimerId = u32;

/// One user-created countdown.
///
/// While running, `remaining_ms` is the remaining time as of `anchor_ms`;
/// the live value is obtained through the correction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: TimerId,
    pub remaining_ms: u64,
    pub duration_ms: u64,
    pub is_running: bool,
    /// Clock reading captured when the record started running
    pub anchor_ms: Option<u64>,
}

/// Derived lifecycle phase of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Completed,
}

impl TimerRecord {
    /// Create a new record at full duration, not running
    pub fn new(id: TimerId, duration_ms: u64) -> Self {
        Self {
            id,
            remaining_ms: duration_ms,
            duration_ms,
            is_running: false,
            anchor_ms: None,
        }
    }

    /// Mark the record as running from `now_ms`
    pub fn run_from(&mut self, now_ms: u64) {
        self.is_running = true;
        self.anchor_ms = Some(now_ms);
    }

    /// Remaining time at `now_ms` by plain subtraction from the anchor.
    ///
    /// Unlike the correction engine this applies no noise threshold, so it
    /// matches what a live countdown shows. A reading before the anchor
    /// counts as no time elapsed.
    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match (self.is_running, self.anchor_ms) {
            (true, Some(anchor)) => self.remaining_ms.saturating_sub(now_ms.saturating_sub(anchor)),
            _ => self.remaining_ms,
        }
    }

    /// Freeze the record at `remaining_ms`, clamped to the duration
    pub fn freeze_at(&mut self, remaining_ms: u64) {
        self.remaining_ms = remaining_ms.min(self.duration_ms);
        self.is_running = false;
        self.anchor_ms = None;
    }

    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.remaining_ms == 0 {
            TimerPhase::Completed
        } else {
            TimerPhase::Idle
        }
    }

    /// Content equality as tracked by the list reconciler
    pub fn same_content(&self, other: &TimerRecord) -> bool {
        self.remaining_ms == other.remaining_ms && self.is_running == other.is_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_idle_at_full_duration() {
        let record = TimerRecord::new(3, 60_000);
        assert_eq!(record.remaining_ms, 60_000);
        assert_eq!(record.anchor_ms, None);
        assert_eq!(record.phase(), TimerPhase::Idle);
    }

    #[test]
    fn freeze_clamps_and_clears_anchor() {
        let mut record = TimerRecord::new(0, 60_000);
        record.run_from(1_000);
        assert_eq!(record.phase(), TimerPhase::Running);

        record.freeze_at(90_000);
        assert_eq!(record.remaining_ms, 60_000);
        assert!(!record.is_running);
        assert_eq!(record.anchor_ms, None);

        record.freeze_at(0);
        assert_eq!(record.phase(), TimerPhase::Completed);
    }

    #[test]
    fn remaining_at_subtracts_every_millisecond() {
        let mut record = TimerRecord::new(0, 60_000);
        assert_eq!(record.remaining_at(5_000), 60_000);

        record.run_from(1_000);
        assert_eq!(record.remaining_at(1_800), 59_200);
        assert_eq!(record.remaining_at(500), 60_000);
        assert_eq!(record.remaining_at(100_000), 0);
    }

    #[test]
    fn content_ignores_anchor() {
        let mut a = TimerRecord::new(1, 10_000);
        let mut b = a.clone();
        a.run_from(5);
        b.run_from(9);
        assert!(a.same_content(&b));

        b.remaining_ms = 9_000;
        assert!(!a.same_content(&b));
    }
}
