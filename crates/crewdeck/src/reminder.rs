//! One-shot APU start reminder.
//!
//! The reminder targets a single instant, `lead` minutes before today's
//! departure, and fires at most once per departure value. Polls that land
//! within `tolerance` of the target fire; a changed departure rearms.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ReminderConfig;
use crate::departure::DepartureTime;

/// Heading of the reminder alert.
pub const ALERT_TITLE: &str = "APU START REMINDER";

/// Arm-cycle marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderState {
    /// Departure the current cycle targets.
    #[serde(serialize_with = "serialize_departure")]
    pub scheduled_for: Option<DepartureTime>,
    /// Whether this cycle already fired.
    pub fired: bool,
}

fn serialize_departure<S: serde::Serializer>(
    departure: &Option<DepartureTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match departure {
        Some(departure) => serializer.collect_str(departure),
        None => serializer.serialize_none(),
    }
}

/// A fired reminder, ready to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderAlert {
    /// Departure the reminder was for.
    pub departure: DepartureTime,
    /// Target instant of the reminder.
    pub due_at: DateTime<Utc>,
    /// Minutes between reminder and departure.
    pub lead_minutes: u32,
}

impl ReminderAlert {
    /// Alert heading.
    #[must_use]
    pub fn title(&self) -> &'static str {
        ALERT_TITLE
    }

    /// Alert body lines.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} minutes to departure\nTime to start the APU",
            self.lead_minutes
        )
    }
}

/// Polls the clock against the reminder target.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    lead_minutes: u32,
    tolerance: Duration,
    state: ReminderState,
}

impl ReminderScheduler {
    /// Build a disarmed scheduler from validated configuration.
    #[must_use]
    pub fn new(config: &ReminderConfig) -> Self {
        let tolerance = std::time::Duration::from_secs(config.tolerance_secs);
        Self {
            lead_minutes: config.lead_minutes,
            tolerance: Duration::from_std(tolerance).unwrap_or_else(|_| Duration::hours(1)),
            state: ReminderState::default(),
        }
    }

    /// Current arm-cycle state.
    #[must_use]
    pub fn state(&self) -> ReminderState {
        self.state
    }

    /// Start a new cycle for `departure` if it differs from the armed one.
    pub fn rearm(&mut self, departure: Option<DepartureTime>) {
        if self.state.scheduled_for != departure {
            debug!(
                "Reminder rearmed for {}",
                departure.map_or_else(|| "nothing".to_string(), |d| d.to_string())
            );
            self.state = ReminderState {
                scheduled_for: departure,
                fired: false,
            };
        }
    }

    /// The reminder target for `departure` on the UTC date of `now`.
    #[must_use]
    pub fn due_at(&self, departure: DepartureTime, now: DateTime<Utc>) -> DateTime<Utc> {
        departure.today_at(now) - Duration::minutes(i64::from(self.lead_minutes))
    }

    /// Check `now` against the target. Returns an alert at most once per
    /// departure value.
    pub fn poll(
        &mut self,
        departure: Option<DepartureTime>,
        now: DateTime<Utc>,
    ) -> Option<ReminderAlert> {
        self.rearm(departure);

        let departure = departure?;
        if self.state.fired {
            return None;
        }

        let due_at = self.due_at(departure, now);
        if (now - due_at).abs() >= self.tolerance {
            return None;
        }

        self.state.fired = true;
        info!("APU start reminder fired for departure {departure}");
        Some(ReminderAlert {
            departure,
            due_at,
            lead_minutes: self.lead_minutes,
        })
    }
}
