//! Error types for timer operations

use thiserror::Error;

/// Message shown to the user when timer creation input is rejected
pub const INVALID_DURATION_MESSAGE: &str = "Enter a timer value from 1 to 1440 minutes.";

/// Rejected timer creation input; never mutates state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The input was empty or not an integer
    #[error("{}", INVALID_DURATION_MESSAGE)]
    NotANumber(String),

    /// The number of minutes was outside `1..=1440`
    #[error("{}", INVALID_DURATION_MESSAGE)]
    MinutesOutOfRange(i64),

    /// A raw millisecond duration outside `(0, 24h]`
    #[error("duration of {0} ms is outside (0, 24h]")]
    DurationOutOfRange(u64),
}

/// Errors surfaced by the application state
#[derive(Error, Debug)]
pub enum TimerError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("Failed to lock {0}")]
    Lock(String),

    #[error("Background continuation error: {0}")]
    Background(String),
}
