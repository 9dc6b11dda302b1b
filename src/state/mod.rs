//! State management module
//! 
//! This module contains the timer records, the lifecycle/visibility state,
//! the rendering-layer list view and the application state that owns them.

pub mod app_state;
pub mod lifecycle_state;
pub mod list_view;
pub mod timer_record;

// Re-export main types
pub use app_state::{AppState, Timing};
pub use lifecycle_state::LifecycleState;
pub use list_view::{ListView, RowView};
pub use timer_record::{TimerId, TimerPhase, TimerRecord};
