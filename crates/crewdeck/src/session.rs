//! The crew session: one owned state object driving every component.
//!
//! A [`Session`] owns the checklist, preferences, departure time and the
//! optional timeline and reminder engines. Every user action and timer tick
//! goes through it, and every visible change is announced as an [`Event`] on
//! an unbounded channel for the render layer. Share it between tasks as a
//! [`SharedSession`]; hold the lock for one action or tick at a time.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::checklist::{ChecklistSnapshot, ChecklistStore, Filter, ItemId, Profile};
use crate::clock::{Clock, ClockReading};
use crate::config::{Capabilities, Config};
use crate::departure::DepartureTime;
use crate::error::{Error, Result};
use crate::preferences::{Preferences, Theme};
use crate::reminder::{ReminderAlert, ReminderScheduler, ReminderState};
use crate::storage::{keys, SharedStore};
use crate::timeline::{DisplayMode, TimelineEngine, TimelineSnapshot};
use crate::timers::{TimerKind, TimerManager};

/// Prompt shown before clearing every completed item.
pub const RESET_PROMPT: &str = "Reset all checklist items?";

/// A session shared between the input handler and the timers.
pub type SharedSession = Arc<Mutex<Session>>;

/// Something the render layer should reflect.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The checklist, its filter or its profile changed.
    ChecklistChanged(ChecklistSnapshot),
    /// The departure time or display mode changed.
    TimelineUpdated(TimelineSnapshot),
    /// The departure time was cleared.
    TimelineCleared,
    /// Periodic timeline refresh.
    ProgressUpdated(TimelineSnapshot),
    /// The APU start reminder is due.
    ReminderFired(ReminderAlert),
    /// Clock display refresh.
    ClockTick(ClockReading),
    /// The theme changed.
    ThemeChanged(Theme),
    /// The timeline display mode changed.
    DisplayModeChanged(DisplayMode),
}

/// Asks the user to confirm a destructive action.
pub trait ConfirmationGate {
    /// Return `true` to go ahead.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Owned state of one crew session.
#[derive(Debug)]
pub struct Session {
    storage: SharedStore,
    clock: Arc<dyn Clock>,
    capabilities: Capabilities,
    checklist: ChecklistStore,
    preferences: Preferences,
    filter: Filter,
    departure: Option<DepartureTime>,
    timeline: Option<TimelineEngine>,
    reminder: Option<ReminderScheduler>,
    events: UnboundedSender<Event>,
}

impl Session {
    /// Load a session from `storage`, returning it with its event stream.
    ///
    /// `config` is expected to be validated already.
    #[must_use]
    pub fn new(
        config: &Config,
        storage: SharedStore,
        clock: Arc<dyn Clock>,
    ) -> (Self, UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let capabilities = config.capabilities;

        let checklist = ChecklistStore::load(
            Arc::clone(&storage),
            Arc::clone(&clock),
            config.checklist.insert_position,
        );
        let preferences = Preferences::load(Arc::clone(&storage));
        let departure = if capabilities.uses_departure_time() {
            load_departure(&storage)
        } else {
            None
        };

        let timeline = capabilities
            .timeline
            .then(|| TimelineEngine::new(&config.timeline));
        let mut reminder = capabilities
            .reminder
            .then(|| ReminderScheduler::new(&config.reminder));
        if let Some(reminder) = reminder.as_mut() {
            reminder.rearm(departure);
        }

        info!(
            profile = %checklist.profile(),
            items = checklist.items().len(),
            departure = ?departure,
            "Session loaded"
        );

        let session = Self {
            storage,
            clock,
            capabilities,
            checklist,
            preferences,
            filter: Filter::default(),
            departure,
            timeline,
            reminder,
            events,
        };
        (session, receiver)
    }

    /// Wrap in a [`SharedSession`].
    #[must_use]
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Enabled features.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The checklist, read-only.
    #[must_use]
    pub fn checklist(&self) -> &ChecklistStore {
        &self.checklist
    }

    /// Current checklist filter.
    #[must_use]
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Filtered checklist under the current filter.
    #[must_use]
    pub fn checklist_snapshot(&self) -> ChecklistSnapshot {
        self.checklist.snapshot(self.filter)
    }

    // === Checklist ===

    /// Add an item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyItemText`] if `text` is blank.
    pub fn add_item(&mut self, text: &str) -> Result<ItemId> {
        let id = self.checklist.add_item(text)?;
        self.emit_checklist();
        Ok(id)
    }

    /// Flip completion of an item. Unknown ids are ignored.
    pub fn toggle_item(&mut self, id: ItemId) -> bool {
        let changed = self.checklist.toggle_item(id);
        if changed {
            self.emit_checklist();
        }
        changed
    }

    /// Delete an item. Unknown ids are ignored.
    pub fn delete_item(&mut self, id: ItemId) -> bool {
        let changed = self.checklist.delete_item(id);
        if changed {
            self.emit_checklist();
        }
        changed
    }

    /// Clear every completed mark once `gate` consents.
    ///
    /// Returns whether the reset happened.
    pub fn reset_all(&mut self, gate: &dyn ConfirmationGate) -> bool {
        if !gate.confirm(RESET_PROMPT) {
            debug!("Checklist reset declined");
            return false;
        }
        self.checklist.reset_all();
        self.emit_checklist();
        true
    }

    /// Replace the checklist with the defaults of `profile`.
    pub fn switch_profile(&mut self, profile: Profile) {
        self.checklist.switch_profile(profile);
        self.emit_checklist();
    }

    /// Switch to the next profile and return it.
    pub fn next_profile(&mut self) -> Profile {
        let next = self.checklist.profile().next();
        self.switch_profile(next);
        next
    }

    /// Change the checklist filter.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.emit_checklist();
    }

    // === Departure ===

    /// Current departure time, if set.
    #[must_use]
    pub fn departure_time(&self) -> Option<DepartureTime> {
        self.departure
    }

    /// Parse and set the departure time.
    ///
    /// The value is persisted before the reminder is rearmed and the
    /// timeline recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDisabled`] when neither timeline nor
    /// reminder is enabled, or [`Error::InvalidDepartureTime`] for input
    /// that is not `HH:MM`.
    pub fn set_departure_time(&mut self, input: &str) -> Result<DepartureTime> {
        self.require_departure()?;
        let departure = DepartureTime::parse(input)?;

        if let Err(e) = self.storage.set(keys::DEPARTURE_TIME, &departure.to_string()) {
            error!("Failed to persist departure time: {e}");
        }
        self.departure = Some(departure);
        info!("Departure time set to {departure}");

        if let Some(reminder) = self.reminder.as_mut() {
            reminder.rearm(self.departure);
        }
        if let Some(snapshot) = self.timeline_snapshot() {
            self.emit(Event::TimelineUpdated(snapshot));
        }
        Ok(departure)
    }

    /// Clear the departure time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDisabled`] when neither timeline nor
    /// reminder is enabled.
    pub fn clear_departure_time(&mut self) -> Result<()> {
        self.require_departure()?;

        if let Err(e) = self.storage.remove(keys::DEPARTURE_TIME) {
            error!("Failed to remove departure time: {e}");
        }
        self.departure = None;
        info!("Departure time cleared");

        if let Some(reminder) = self.reminder.as_mut() {
            reminder.rearm(None);
        }
        if self.timeline.is_some() {
            self.emit(Event::TimelineCleared);
        }
        Ok(())
    }

    /// The timeline at the current instant, when enabled and a departure is set.
    #[must_use]
    pub fn timeline_snapshot(&self) -> Option<TimelineSnapshot> {
        let engine = self.timeline.as_ref()?;
        let departure = self.departure?;
        Some(engine.compute(
            departure,
            self.clock.now(),
            self.preferences.display_mode(),
        ))
    }

    /// Reminder arm-cycle state, when the reminder is enabled.
    #[must_use]
    pub fn reminder_state(&self) -> Option<ReminderState> {
        self.reminder.as_ref().map(ReminderScheduler::state)
    }

    // === Preferences ===

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.preferences.theme()
    }

    /// Switch theme and return the new one.
    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.preferences.toggle_theme();
        self.emit(Event::ThemeChanged(theme));
        theme
    }

    /// Current timeline display mode.
    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.preferences.display_mode()
    }

    /// Change the timeline display mode and relabel the timeline.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.preferences.set_display_mode(mode);
        self.emit(Event::DisplayModeChanged(mode));
        if let Some(snapshot) = self.timeline_snapshot() {
            self.emit(Event::TimelineUpdated(snapshot));
        }
    }

    /// Read a notepad.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDisabled`] when notepads are off, or
    /// [`Error::InvalidNotepadKind`] for a malformed kind.
    pub fn notepad(&self, kind: &str) -> Result<String> {
        self.require_notepad()?;
        self.preferences.notepad(kind)
    }

    /// Save a notepad.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDisabled`] when notepads are off, or
    /// [`Error::InvalidNotepadKind`] for a malformed kind.
    pub fn set_notepad(&mut self, kind: &str, text: &str) -> Result<()> {
        self.require_notepad()?;
        self.preferences.set_notepad(kind, text)
    }

    /// Kinds of every saved notepad.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDisabled`] when notepads are off.
    pub fn notepad_kinds(&self) -> Result<Vec<String>> {
        self.require_notepad()?;
        Ok(self.preferences.notepad_kinds())
    }

    /// Check that the calculators may be offered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityDisabled`] when calculators are off.
    pub fn ensure_calculators(&self) -> Result<()> {
        if self.capabilities.calculators {
            Ok(())
        } else {
            Err(Error::capability_disabled("calculators"))
        }
    }

    // === Ticks ===

    /// Refresh the clock display.
    pub fn tick_clock(&mut self) -> ClockReading {
        let reading = ClockReading::at(self.clock.now());
        self.emit(Event::ClockTick(reading.clone()));
        reading
    }

    /// Recompute the timeline for the current instant.
    pub fn tick_progress(&mut self) -> Option<TimelineSnapshot> {
        let snapshot = self.timeline_snapshot()?;
        self.emit(Event::ProgressUpdated(snapshot.clone()));
        Some(snapshot)
    }

    /// Poll the reminder.
    pub fn tick_reminder(&mut self) -> Option<ReminderAlert> {
        let now = self.clock.now();
        let alert = self.reminder.as_mut()?.poll(self.departure, now)?;
        self.emit(Event::ReminderFired(alert.clone()));
        Some(alert)
    }

    fn require_departure(&self) -> Result<()> {
        if self.capabilities.uses_departure_time() {
            Ok(())
        } else {
            Err(Error::capability_disabled("departure time"))
        }
    }

    fn require_notepad(&self) -> Result<()> {
        if self.capabilities.notepad {
            Ok(())
        } else {
            Err(Error::capability_disabled("notepad"))
        }
    }

    fn emit_checklist(&self) {
        self.emit(Event::ChecklistChanged(self.checklist_snapshot()));
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("Event receiver closed, dropping event");
        }
    }
}

fn load_departure(storage: &SharedStore) -> Option<DepartureTime> {
    match storage.get(keys::DEPARTURE_TIME) {
        Ok(Some(raw)) => match DepartureTime::parse(&raw) {
            Ok(departure) => Some(departure),
            Err(e) => {
                warn!("Ignoring stored departure time: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to read departure time: {e}");
            None
        }
    }
}

/// Spawn the clock, reminder and progress timers for `session`.
///
/// Timers for disabled capabilities are not started. Must be called from
/// within a tokio runtime; dropping the returned manager stops everything.
pub fn start_timers(session: &SharedSession, config: &Config) -> TimerManager {
    let mut manager = TimerManager::new();
    let capabilities = config.capabilities;

    let clock = Arc::clone(session);
    manager.spawn(TimerKind::Clock, config.clock_interval(), move || {
        with_session(&clock, TimerKind::Clock, |s| {
            s.tick_clock();
        });
    });

    if capabilities.reminder {
        let reminder = Arc::clone(session);
        manager.spawn(TimerKind::Reminder, config.reminder_interval(), move || {
            with_session(&reminder, TimerKind::Reminder, |s| {
                s.tick_reminder();
            });
        });
    }

    if capabilities.timeline {
        let progress = Arc::clone(session);
        manager.spawn(TimerKind::Progress, config.progress_interval(), move || {
            with_session(&progress, TimerKind::Progress, |s| {
                s.tick_progress();
            });
        });
    }

    info!(timers = manager.count(), "Timers started");
    manager
}

fn with_session(session: &SharedSession, kind: TimerKind, tick: impl FnOnce(&mut Session)) {
    match session.lock() {
        Ok(mut guard) => tick(&mut guard),
        Err(_) => error!(timer = %kind, "Session lock poisoned, skipping tick"),
    }
}
