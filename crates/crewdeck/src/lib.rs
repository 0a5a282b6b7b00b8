//! `crewdeck` - Flight crew checklist, departure timeline and reminder engine
//!
//! This library holds the state behind a flight deck checklist tool: checklist
//! profiles with write-through persistence, a countdown timeline to a
//! departure time, a one-shot APU start reminder, and a set of calculators.
//! Rendering is left to the embedder, which drives a [`Session`] and listens
//! to its [`Event`] stream.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod calc;
pub mod checklist;
pub mod clock;
pub mod config;
pub mod departure;
pub mod error;
pub mod logging;
pub mod preferences;
pub mod reminder;
pub mod session;
pub mod storage;
pub mod timeline;
pub mod timers;

pub use checklist::{ChecklistItem, ChecklistStore, Column, Filter, ItemId, Profile};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Capabilities, Config};
pub use departure::DepartureTime;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use session::{start_timers, ConfirmationGate, Event, Session, SharedSession};
pub use storage::{KeyValueStore, MemoryStore, SharedStore, SqliteStore, StorageStats};
pub use timeline::{DisplayMode, TimelineEngine, TimelineSnapshot};
