//! Background tasks module
//! 
//! This module contains the tasks that run alongside the HTTP server: the
//! per-second countdown of the running timer and the background
//! continuation that keeps a notification updated while the client is away.

pub mod background;
pub mod countdown;

// Re-export main items
pub use background::{BackgroundCommand, BackgroundContinuation};
pub use countdown::countdown_task;
