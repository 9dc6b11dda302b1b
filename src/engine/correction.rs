//! Correction engine
//!
//! Resolves the authoritative remaining time of a record from its anchor and
//! a clock reading, so a single subtraction stands in for any number of ticks
//! missed while nothing was driving the countdown.

use crate::state::TimerRecord;

/// Gaps shorter than this are not corrected, to avoid visible jitter
pub const NOISE_THRESHOLD_MS: u64 = 900;

/// Outcome of correcting a record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Not running; the stored value is displayed unchanged
    AtRest { remaining_ms: u64 },
    /// Running; the countdown continues from `remaining_ms`
    Resume { remaining_ms: u64 },
    /// Running, but the remaining time ran out during the gap
    Completed,
}

impl Correction {
    /// Remaining time to display for this outcome
    pub fn remaining_ms(&self) -> u64 {
        match *self {
            Correction::AtRest { remaining_ms } | Correction::Resume { remaining_ms } => remaining_ms,
            Correction::Completed => 0,
        }
    }
}

/// Correct `record` against the clock reading `now_ms`.
///
/// A reading earlier than the anchor counts as zero elapsed time, so a
/// correction never increases the remaining time.
pub fn correct(record: &TimerRecord, now_ms: u64) -> Correction {
    let anchor = match (record.is_running, record.anchor_ms) {
        (true, Some(anchor)) => anchor,
        _ => return Correction::AtRest { remaining_ms: record.remaining_ms },
    };

    let elapsed = now_ms.saturating_sub(anchor);
    if elapsed >= record.remaining_ms {
        return Correction::Completed;
    }
    if elapsed < NOISE_THRESHOLD_MS {
        return Correction::Resume { remaining_ms: record.remaining_ms };
    }
    Correction::Resume { remaining_ms: record.remaining_ms - elapsed }
}
