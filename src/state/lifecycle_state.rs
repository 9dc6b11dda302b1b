//! Client lifecycle state

use serde::{Deserialize, Serialize};

/// Visibility of the client and background hand-off bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleState {
    /// Whether the client is in the foreground; drivers only tick while true
    pub visible: bool,
    /// Remaining time handed to the background continuation, if any
    pub handed_off_ms: Option<u64>,
    /// List of current errors for client visibility
    pub errors: Vec<String>,
}

impl LifecycleState {
    /// Create a new, visible lifecycle state
    pub fn new() -> Self {
        Self {
            visible: true,
            handed_off_ms: None,
            errors: Vec::new(),
        }
    }

    /// Check if a background hand-off is in effect
    pub fn in_background(&self) -> bool {
        !self.visible && self.handed_off_ms.is_some()
    }

    /// Add an error to the state
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Clear errors mentioning a specific component
    pub fn clear_errors_for(&mut self, component: &str) {
        let initial_count = self.errors.len();
        self.errors.retain(|error| !error.to_lowercase().contains(&component.to_lowercase()));

        if self.errors.len() != initial_count {
            tracing::info!("Cleared {} errors for component: {}", initial_count - self.errors.len(), component);
        }
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_only_matching_errors() {
        let mut state = LifecycleState::new();
        state.add_error("Timer 3 not found".to_string());
        state.add_error("Notification publish failed".to_string());

        state.clear_errors_for("notification");
        assert_eq!(state.errors, vec!["Timer 3 not found".to_string()]);
    }

    #[test]
    fn background_requires_hand_off() {
        let mut state = LifecycleState::new();
        state.visible = false;
        assert!(!state.in_background());

        state.handed_off_ms = Some(1_000);
        assert!(state.in_background());
    }
}
