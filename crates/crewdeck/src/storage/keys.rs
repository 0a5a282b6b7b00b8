//! Storage keys for persisted state.

/// Serialized array of checklist items for the active profile.
pub const TASKS: &str = "tasks";

/// Name of the active checklist profile.
pub const ACTIVE_CHECKLIST: &str = "active-checklist";

/// `"dark"` or `"light"`.
pub const THEME: &str = "theme";

/// `"HH:MM"` departure time, absent when unset.
pub const DEPARTURE_TIME: &str = "departure-time";

/// `"utc"` or `"local"`.
pub const TIMELINE_DISPLAY_MODE: &str = "timeline-display-mode";

/// Prefix for notepad keys; the notepad kind follows it.
pub const NOTEPAD_PREFIX: &str = "notepad-";

/// Storage key for a notepad kind.
#[must_use]
pub fn notepad(kind: &str) -> String {
    format!("{NOTEPAD_PREFIX}{kind}")
}
