//! Utility functions module
//! 
//! Clock sources, display formatting and signal handling shared by the
//! engine, the background tasks and the binary.

pub mod clock;
pub mod format;
pub mod signals;

// Re-export main items
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use format::{display_time, progress_fraction};
pub use signals::shutdown_signal;
