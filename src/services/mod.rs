//! External service module
//! 
//! This module contains the notification surfaces the background
//! continuation publishes remaining time to.

pub mod notification;

// Re-export main items
pub use notification::{
    check_notify_send_available, DesktopNotifier, LogNotifier, Notification, Notifier, NotifierKind,
};
