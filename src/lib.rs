//! Pomodoro Timers - A multi-timer countdown server
//! 
//! This library keeps any number of countdown timers, at most one of them
//! running, corrects their remaining time across visibility gaps from a
//! monotonic anchor, reconciles timer snapshots into minimal row updates and
//! continues publishing the running timer to a notification while the
//! client is in the background.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{InputError, TimerError};
pub use state::{AppState, Timing};
pub use utils::signals::shutdown_signal;
