//! Departure countdown timeline.
//!
//! The timeline spans a fixed window ending at departure. Each milestone sits
//! at a minute offset from departure and is either pending or completed,
//! depending only on the departure and the current instant; nothing here is
//! persisted or remembered between computations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TimelineConfig;
use crate::departure::DepartureTime;

/// A named point at a fixed minute offset from departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Display name.
    pub name: String,
    /// Minutes relative to departure; negative is before.
    pub offset_minutes: i32,
}

impl Milestone {
    /// Create a milestone.
    #[must_use]
    pub fn new(name: impl Into<String>, offset_minutes: i32) -> Self {
        Self {
            name: name.into(),
            offset_minutes,
        }
    }
}

/// The standard turnaround, from report time at STD minus 1:25.
#[must_use]
pub fn default_milestones() -> Vec<Milestone> {
    [
        ("Report", -85),
        ("Briefing", -70),
        ("At Aircraft", -55),
        ("Boarding", -40),
        ("APU Start", -20),
        ("Doors Closed", -10),
        ("Departure", 0),
    ]
    .into_iter()
    .map(|(name, offset)| Milestone::new(name, offset))
    .collect()
}

/// Which zone milestone labels are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Coordinated universal time.
    #[default]
    Utc,
    /// The host's local zone.
    Local,
}

impl DisplayMode {
    /// Stable lowercase name, as persisted.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Utc => "utc",
            Self::Local => "local",
        }
    }

    /// Format `instant` as `HH:MM` in this mode's zone.
    #[must_use]
    pub fn label(self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Utc => instant.format("%H:%M").to_string(),
            Self::Local => instant.with_timezone(&Local).format("%H:%M").to_string(),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown display mode: {other}")),
        }
    }
}

/// Whether a milestone has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    /// Still ahead.
    Pending,
    /// Reached or passed.
    Completed,
}

/// One milestone, resolved against a departure and an instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus {
    /// Display name.
    pub name: String,
    /// Minutes relative to departure.
    pub offset_minutes: i32,
    /// Absolute instant of the milestone.
    pub instant: DateTime<Utc>,
    /// `HH:MM` of `instant` in the requested display mode.
    pub label: String,
    /// Place on the axis, 0.0 at window start to 1.0 at departure.
    pub position: f64,
    /// Pending or completed.
    pub state: MilestoneState,
}

impl MilestoneStatus {
    /// Shorthand for `state == Completed`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == MilestoneState::Completed
    }
}

/// A full timeline computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    /// Departure the timeline was computed for.
    #[serde(serialize_with = "serialize_departure")]
    pub departure: DepartureTime,
    /// Departure anchored to today's UTC date.
    pub departure_instant: DateTime<Utc>,
    /// Whole minutes to departure, floored; negative once departed.
    pub minutes_until_departure: i64,
    /// Every configured milestone, in configuration order.
    pub milestones: Vec<MilestoneStatus>,
    /// Fraction of the window elapsed, clamped to `[0, 1]`.
    pub progress: f64,
}

fn serialize_departure<S: serde::Serializer>(
    departure: &DepartureTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(departure)
}

/// Computes milestone states and progress for a departure.
#[derive(Debug, Clone)]
pub struct TimelineEngine {
    window_minutes: u32,
    milestones: Vec<Milestone>,
}

impl TimelineEngine {
    /// Build an engine from validated configuration.
    #[must_use]
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            window_minutes: config.window_minutes,
            milestones: config.milestones.clone(),
        }
    }

    /// Length of the window before departure, in minutes.
    #[must_use]
    pub fn window_minutes(&self) -> u32 {
        self.window_minutes
    }

    /// Configured milestones.
    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Whole minutes from `now` to today's departure, rounded down.
    #[must_use]
    pub fn minutes_until_departure(departure: DepartureTime, now: DateTime<Utc>) -> i64 {
        (departure.today_at(now) - now)
            .num_milliseconds()
            .div_euclid(60_000)
    }

    /// Fraction of the window elapsed at `now`, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, departure: DepartureTime, now: DateTime<Utc>) -> f64 {
        let window = Duration::minutes(i64::from(self.window_minutes));
        let start = departure.today_at(now) - window;
        let elapsed = (now - start).num_milliseconds() as f64;
        let span = window.num_milliseconds() as f64;
        (elapsed / span).clamp(0.0, 1.0)
    }

    /// Resolve every milestone against `departure` at `now`.
    #[must_use]
    pub fn compute(
        &self,
        departure: DepartureTime,
        now: DateTime<Utc>,
        mode: DisplayMode,
    ) -> TimelineSnapshot {
        let departure_instant = departure.today_at(now);
        let minutes_until_departure = Self::minutes_until_departure(departure, now);

        let milestones = self
            .milestones
            .iter()
            .map(|milestone| {
                let offset = i64::from(milestone.offset_minutes);
                let instant = departure_instant + Duration::minutes(offset);
                let state = if minutes_until_departure <= -offset {
                    MilestoneState::Completed
                } else {
                    MilestoneState::Pending
                };
                MilestoneStatus {
                    name: milestone.name.clone(),
                    offset_minutes: milestone.offset_minutes,
                    instant,
                    label: mode.label(instant),
                    position: self.position(milestone.offset_minutes),
                    state,
                }
            })
            .collect();

        TimelineSnapshot {
            departure,
            departure_instant,
            minutes_until_departure,
            milestones,
            progress: self.progress(departure, now),
        }
    }

    fn position(&self, offset_minutes: i32) -> f64 {
        let window = f64::from(self.window_minutes);
        (f64::from(offset_minutes) + window) / window
    }
}
