//! Input events
//!
//! Press/release events arrive between frames; `InputQueue` folds them into
//! the `TickInput` the next fixed step consumes.

use crate::sim::TickInput;

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    JumpPressed,
    DuckPressed,
    DuckReleased,
}

impl InputEvent {
    /// Map a key name to a command
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "space" | "up" | "w" => Some(InputEvent::JumpPressed),
            "down" | "s" => Some(InputEvent::DuckPressed),
            "release" | "r" => Some(InputEvent::DuckReleased),
            _ => None,
        }
    }
}

/// Pending input for the next fixed step
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: TickInput,
}

impl InputQueue {
    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::JumpPressed => self.pending.jump = true,
            InputEvent::DuckPressed => self.pending.duck = true,
            InputEvent::DuckReleased => self.pending.duck_released = true,
        }
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.pending.autopilot = on;
    }

    /// Input for the next tick
    pub fn current(&self) -> &TickInput {
        &self.pending
    }

    /// Clear one-shot presses after they have been applied once
    pub fn clear_edges(&mut self) {
        self.pending.jump = false;
        self.pending.duck = false;
        self.pending.duck_released = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_cleared_autopilot_kept() {
        let mut queue = InputQueue::default();
        queue.set_autopilot(true);
        queue.push(InputEvent::JumpPressed);
        queue.push(InputEvent::DuckReleased);
        assert!(queue.current().jump && queue.current().duck_released);

        queue.clear_edges();
        assert!(!queue.current().jump && !queue.current().duck_released);
        assert!(queue.current().autopilot);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(InputEvent::from_key("Space"), Some(InputEvent::JumpPressed));
        assert_eq!(InputEvent::from_key("down"), Some(InputEvent::DuckPressed));
        assert_eq!(InputEvent::from_key("R"), Some(InputEvent::DuckReleased));
        assert_eq!(InputEvent::from_key("q"), None);
    }
}
