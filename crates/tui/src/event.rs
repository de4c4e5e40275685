//! Event handling types for the TUI.

/// Status of a key event after a widget has seen it.
///
/// Widgets return this from `handle_key_event` so the app can walk a chain
/// of handlers and stop at the first one that consumed the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// The widget handled the key.
    Consumed,
    /// Pass the key to the next handler.
    NotConsumed,
}

impl EventStatus {
    pub fn is_consumed(self) -> bool {
        self == EventStatus::Consumed
    }
}
