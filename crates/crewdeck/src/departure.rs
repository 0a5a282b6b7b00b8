//! Departure time of day.
//!
//! A departure is an hour and minute with no date and no zone; it is always
//! read as UTC. [`DepartureTime::today_at`] anchors it to the UTC calendar
//! date of a given instant. The anchor never rolls over to the next day: a
//! departure earlier than `now` means the flight already left today, and every
//! derived countdown goes negative.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use regex::Regex;

use crate::error::{Error, Result};

/// Strict 24h `HH:MM`.
const DEPARTURE_PATTERN: &str = r"^([01]\d|2[0-3]):([0-5]\d)$";

fn departure_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(DEPARTURE_PATTERN).expect("Invalid departure pattern"))
}

/// A departure time of day, interpreted as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepartureTime {
    time: NaiveTime,
}

impl DepartureTime {
    /// Build a departure from hour and minute. Returns `None` when out of range.
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|time| Self { time })
    }

    /// Parse `HH:MM`, surrounding whitespace allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDepartureTime`] for anything else.
    ///
    /// # Panics
    ///
    /// Panics if the built-in pattern fails to compile.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidDepartureTime {
            input: input.to_string(),
        };

        let captures = departure_regex()
            .captures(input.trim())
            .ok_or_else(invalid)?;
        let hour = captures[1].parse().map_err(|_| invalid())?;
        let minute = captures[2].parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }

    /// Hour of day, 0-23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// Minute of hour, 0-59.
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// The departure instant on `date` (UTC).
    #[must_use]
    pub fn on_date(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.time).and_utc()
    }

    /// The departure instant on the UTC calendar date of `now`.
    #[must_use]
    pub fn today_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.on_date(now.date_naive())
    }
}

impl fmt::Display for DepartureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for DepartureTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
