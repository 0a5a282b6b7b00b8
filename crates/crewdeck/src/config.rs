//! Configuration management for crewdeck.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::checklist::InsertPosition;
use crate::error::{Error, Result};
use crate::timeline::{default_milestones, Milestone};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "crewdeck";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "crewdeck.db";

/// Longest reminder lead we accept, one full day.
const MAX_LEAD_MINUTES: u32 = 24 * 60;

/// Widest reminder firing window we accept, one hour.
const MAX_TOLERANCE_SECS: u64 = 60 * 60;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CREWDECK_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/crewdeck/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Checklist configuration.
    pub checklist: ChecklistConfig,
    /// Timer cadence configuration.
    pub timers: TimerConfig,
    /// Departure timeline configuration.
    pub timeline: TimelineConfig,
    /// Departure reminder configuration.
    pub reminder: ReminderConfig,
    /// Feature switches.
    pub capabilities: Capabilities,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/crewdeck/crewdeck.db`
    pub database_path: Option<PathBuf>,
}

/// Checklist-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// Where newly added items go in the list.
    pub insert_position: InsertPosition,
}

/// Polling intervals for the background timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Interval between clock display updates in milliseconds.
    pub clock_interval_ms: u64,
    /// Interval between reminder checks in milliseconds.
    pub reminder_interval_ms: u64,
    /// Interval between timeline progress recomputes in milliseconds.
    pub progress_interval_ms: u64,
}

/// Departure timeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Length of the progress window ending at departure, in minutes.
    pub window_minutes: u32,
    /// Milestones shown on the timeline.
    pub milestones: Vec<Milestone>,
}

/// Departure reminder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// How long before departure the reminder fires, in minutes.
    pub lead_minutes: u32,
    /// How close a poll must land to the reminder instant, in seconds.
    /// Must be at least one reminder poll period.
    pub tolerance_secs: u64,
}

/// Optional capabilities.
///
/// The offline build of the tool is the checklist alone; it is expressed as
/// [`Capabilities::offline`] rather than a separate code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Departure timeline and progress bar.
    pub timeline: bool,
    /// Pre-departure reminder.
    pub reminder: bool,
    /// Free-text notepads.
    pub notepad: bool,
    /// Performance and unit calculators.
    pub calculators: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            clock_interval_ms: 1_000,
            reminder_interval_ms: 10_000,
            progress_interval_ms: 10_000,
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            window_minutes: 85,
            milestones: default_milestones(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_minutes: 20,
            tolerance_secs: 30,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            timeline: true,
            reminder: true,
            notepad: true,
            calculators: true,
        }
    }
}

impl Capabilities {
    /// The checklist-only feature set.
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            timeline: false,
            reminder: false,
            notepad: false,
            calculators: false,
        }
    }

    /// Whether anything consumes a departure time.
    #[must_use]
    pub const fn uses_departure_time(&self) -> bool {
        self.timeline || self.reminder
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `CREWDECK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CREWDECK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("clock_interval_ms", self.timers.clock_interval_ms),
            ("reminder_interval_ms", self.timers.reminder_interval_ms),
            ("progress_interval_ms", self.timers.progress_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be greater than 0"),
                });
            }
        }

        if self.timeline.window_minutes == 0 {
            return Err(Error::ConfigValidation {
                message: "window_minutes must be greater than 0".to_string(),
            });
        }

        let window_start = -i64::from(self.timeline.window_minutes);
        let mut names = HashSet::new();
        for milestone in &self.timeline.milestones {
            let name = milestone.name.trim();
            if name.is_empty() {
                return Err(Error::ConfigValidation {
                    message: "milestone names cannot be empty".to_string(),
                });
            }
            if !names.insert(name.to_lowercase()) {
                return Err(Error::ConfigValidation {
                    message: format!("duplicate milestone name '{name}'"),
                });
            }
            let offset = i64::from(milestone.offset_minutes);
            if !(window_start..=0).contains(&offset) {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "milestone '{}' offset {} lies outside the timeline window [{}, 0]",
                        milestone.name, offset, window_start
                    ),
                });
            }
        }

        if self.reminder.lead_minutes > MAX_LEAD_MINUTES {
            return Err(Error::ConfigValidation {
                message: format!(
                    "lead_minutes ({}) cannot exceed {MAX_LEAD_MINUTES}",
                    self.reminder.lead_minutes
                ),
            });
        }

        if self.reminder.tolerance_secs > MAX_TOLERANCE_SECS {
            return Err(Error::ConfigValidation {
                message: format!(
                    "tolerance_secs ({}) cannot exceed {MAX_TOLERANCE_SECS}",
                    self.reminder.tolerance_secs
                ),
            });
        }

        // A poll must always land inside the firing window.
        if self.reminder_tolerance() < self.reminder_interval() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "tolerance_secs ({}s) must be at least reminder_interval_ms ({}ms)",
                    self.reminder.tolerance_secs, self.timers.reminder_interval_ms
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the clock display interval as a Duration.
    #[must_use]
    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.timers.clock_interval_ms)
    }

    /// Get the reminder poll interval as a Duration.
    #[must_use]
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_millis(self.timers.reminder_interval_ms)
    }

    /// Get the timeline progress interval as a Duration.
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.timers.progress_interval_ms)
    }

    /// Get the reminder firing tolerance as a Duration.
    #[must_use]
    pub fn reminder_tolerance(&self) -> Duration {
        Duration::from_secs(self.reminder.tolerance_secs)
    }
}
