//! Wall-clock sources.
//!
//! Everything time-dependent reads the current instant through [`Clock`] so
//! the timeline and reminder logic can be driven deterministically.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, Utc};

/// A source of the current UTC instant.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The host system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock stopped at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = instant;
        }
    }

    /// Move forward (or backward, for a negative duration) by `by`.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map_or_else(|poisoned| *poisoned.into_inner(), |now| *now)
    }
}

/// Clock display text for one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    /// `HH:MM:SS` in UTC.
    pub utc: String,
    /// `HH:MM:SS` in the host's local zone.
    pub local: String,
}

impl ClockReading {
    /// Format `instant` for the clock display.
    #[must_use]
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            utc: instant.format("%H:%M:%S").to_string(),
            local: instant.with_timezone(&Local).format("%H:%M:%S").to_string(),
        }
    }
}
