//! Timer engine
//!
//! Pure, synchronous building blocks: creation input validation, the timer
//! entity store, the correction engine, the list reconciler and the
//! countdown driver state machine. Nothing here touches the async runtime.

pub mod correction;
pub mod countdown;
pub mod input;
pub mod reconcile;
pub mod store;

pub use correction::{correct, Correction, NOISE_THRESHOLD_MS};
pub use countdown::{CountdownDriver, DriverState, Tick};
pub use input::{minutes_to_ms, parse_minutes, MAX_MINUTES, MIN_MINUTES};
pub use reconcile::{diff, ChangePayload, RowChange};
pub use store::{TimerStore, MAX_DURATION_MS};
