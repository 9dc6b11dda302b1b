//! Countdown driver state machine
//!
//! Holds the live remaining time of the single running timer between ticks.
//! The async side (`tasks::countdown`) only feeds it clock readings; all
//! transitions happen here.

use crate::state::{TimerId, TimerRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Completed,
}

/// Result of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining_ms: u64 },
    /// Reached zero on this tick; report `stop(id, 0)`
    Completed,
    /// The driver was not running
    Ignored,
}

#[derive(Debug, Clone)]
pub struct CountdownDriver {
    id: TimerId,
    duration_ms: u64,
    remaining_ms: u64,
    last_tick_ms: u64,
    state: DriverState,
}

impl CountdownDriver {
    /// Driver at rest for `record`
    pub fn for_record(record: &TimerRecord) -> Self {
        let state = if record.remaining_ms == 0 { DriverState::Completed } else { DriverState::Idle };
        Self {
            id: record.id,
            duration_ms: record.duration_ms,
            remaining_ms: record.remaining_ms.min(record.duration_ms),
            last_tick_ms: 0,
            state,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Idle -> Running from the current remaining value
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state != DriverState::Idle {
            return false;
        }
        self.last_tick_ms = now_ms;
        self.state = DriverState::Running;
        true
    }

    /// Idle -> Running from a corrected remaining value.
    ///
    /// The value is only accepted if it does not add time.
    pub fn resume(&mut self, remaining_ms: u64, now_ms: u64) -> bool {
        if self.state != DriverState::Idle || remaining_ms == 0 {
            return false;
        }
        self.remaining_ms = self.remaining_ms.min(remaining_ms);
        self.start(now_ms)
    }

    /// Running -> Running, or Running -> Completed once zero is reached
    pub fn tick(&mut self, now_ms: u64) -> Tick {
        if self.state != DriverState::Running {
            return Tick::Ignored;
        }
        let elapsed = now_ms.saturating_sub(self.last_tick_ms);
        self.last_tick_ms = self.last_tick_ms.max(now_ms);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);

        if self.remaining_ms == 0 {
            self.state = DriverState::Completed;
            Tick::Completed
        } else {
            Tick::Running { remaining_ms: self.remaining_ms }
        }
    }

    /// Remaining time as of `now_ms` without advancing the driver
    pub fn observe(&self, now_ms: u64) -> u64 {
        match self.state {
            DriverState::Running => self
                .remaining_ms
                .saturating_sub(now_ms.saturating_sub(self.last_tick_ms)),
            _ => self.remaining_ms,
        }
    }

    /// Running -> Idle (or Completed if the time ran out), returning the
    /// remaining value to report through `stop(id, remaining)`
    pub fn stop(&mut self, now_ms: u64) -> u64 {
        if self.state == DriverState::Running {
            if let Tick::Completed = self.tick(now_ms) {
                return 0;
            }
            self.state = DriverState::Idle;
        }
        self.remaining_ms
    }

    /// Idle/Completed -> Idle at full duration
    pub fn reset(&mut self) -> bool {
        if self.state == DriverState::Running {
            return false;
        }
        self.remaining_ms = self.duration_ms;
        self.state = DriverState::Idle;
        true
    }
}
