//! User preferences: theme, timeline display mode and notepads.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::storage::{keys, SharedStore};
use crate::timeline::DisplayMode;

const NOTEPAD_KIND_PATTERN: &str = r"^[a-z0-9-]+$";

fn notepad_kind_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(NOTEPAD_KIND_PATTERN).expect("Invalid notepad kind pattern"))
}

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark background, for the flight deck at night.
    #[default]
    Dark,
    /// Light background.
    Light,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Stable lowercase name, as persisted.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Check a notepad kind against `[a-z0-9-]+`.
///
/// # Errors
///
/// Returns [`Error::InvalidNotepadKind`] when the kind does not match.
///
/// # Panics
///
/// Panics if the built-in pattern fails to compile.
pub fn validate_notepad_kind(kind: &str) -> Result<()> {
    if notepad_kind_regex().is_match(kind) {
        Ok(())
    } else {
        Err(Error::InvalidNotepadKind {
            kind: kind.to_string(),
        })
    }
}

/// Persisted preferences, loaded once and written through on change.
#[derive(Debug)]
pub struct Preferences {
    storage: SharedStore,
    theme: Theme,
    display_mode: DisplayMode,
}

impl Preferences {
    /// Load preferences, falling back to defaults for missing or invalid values.
    #[must_use]
    pub fn load(storage: SharedStore) -> Self {
        let theme = load_scalar(&storage, keys::THEME);
        let display_mode = load_scalar(&storage, keys::TIMELINE_DISPLAY_MODE);
        Self {
            storage,
            theme,
            display_mode,
        }
    }

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Set and persist the theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        debug!("Theme set to {theme}");
        self.write(keys::THEME, theme.name());
    }

    /// Switch to the other theme and return it.
    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggle());
        self.theme
    }

    /// Current timeline display mode.
    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Set and persist the timeline display mode.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
        debug!("Timeline display mode set to {mode}");
        self.write(keys::TIMELINE_DISPLAY_MODE, mode.name());
    }

    /// Text of a notepad; empty when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNotepadKind`] for a malformed kind.
    pub fn notepad(&self, kind: &str) -> Result<String> {
        validate_notepad_kind(kind)?;
        match self.storage.get(&keys::notepad(kind)) {
            Ok(text) => Ok(text.unwrap_or_default()),
            Err(e) => {
                warn!("Failed to read notepad {kind}: {e}");
                Ok(String::new())
            }
        }
    }

    /// Save a notepad.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNotepadKind`] for a malformed kind.
    pub fn set_notepad(&mut self, kind: &str, text: &str) -> Result<()> {
        validate_notepad_kind(kind)?;
        debug!("Saving notepad {kind} ({} bytes)", text.len());
        self.write(&keys::notepad(kind), text);
        Ok(())
    }

    /// Kinds of every saved notepad, sorted.
    #[must_use]
    pub fn notepad_kinds(&self) -> Vec<String> {
        match self.storage.keys_with_prefix(keys::NOTEPAD_PREFIX) {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|key| key.strip_prefix(keys::NOTEPAD_PREFIX).map(str::to_string))
                .collect(),
            Err(e) => {
                warn!("Failed to list notepads: {e}");
                Vec::new()
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            error!("Failed to persist {key}: {e}");
        }
    }
}

fn load_scalar<T>(storage: &SharedStore, key: &str) -> T
where
    T: FromStr<Err = String> + Default + fmt::Display,
{
    match storage.get(key) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
            warn!("Ignoring stored {key}: {e}");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Failed to read {key}: {e}");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn fresh() -> (Arc<MemoryStore>, Preferences) {
        let memory = Arc::new(MemoryStore::new());
        let prefs = Preferences::load(memory.clone());
        (memory, prefs)
    }

    #[test]
    fn test_defaults() {
        let (_, prefs) = fresh();
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.display_mode(), DisplayMode::Utc);
    }

    #[test]
    fn test_toggle_theme_persists() {
        let (memory, mut prefs) = fresh();

        assert_eq!(prefs.toggle_theme(), Theme::Light);
        assert_eq!(memory.get(keys::THEME).unwrap().as_deref(), Some("light"));

        assert_eq!(prefs.toggle_theme(), Theme::Dark);
        assert_eq!(memory.get(keys::THEME).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_display_mode_persists_and_reloads() {
        let (memory, mut prefs) = fresh();
        prefs.set_display_mode(DisplayMode::Local);

        let reloaded = Preferences::load(memory);
        assert_eq!(reloaded.display_mode(), DisplayMode::Local);
    }

    #[test]
    fn test_invalid_stored_values_fall_back() {
        let memory = Arc::new(MemoryStore::new());
        memory.set(keys::THEME, "sepia").unwrap();
        memory.set(keys::TIMELINE_DISPLAY_MODE, "zulu").unwrap();

        let prefs = Preferences::load(memory);

        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.display_mode(), DisplayMode::Utc);
    }

    #[test]
    fn test_notepad_round_trip() {
        let (memory, mut prefs) = fresh();

        assert_eq!(prefs.notepad("route").unwrap(), "");
        prefs.set_notepad("route", "DCT ABC UL610 XYZ").unwrap();

        assert_eq!(prefs.notepad("route").unwrap(), "DCT ABC UL610 XYZ");
        assert_eq!(
            memory.get("notepad-route").unwrap().as_deref(),
            Some("DCT ABC UL610 XYZ")
        );
    }

    #[test]
    fn test_notepad_kind_validation() {
        let (_, mut prefs) = fresh();

        for kind in ["", "Route", "atis info", "a_b", "../x"] {
            assert!(matches!(
                prefs.set_notepad(kind, "x"),
                Err(Error::InvalidNotepadKind { .. })
            ));
            assert!(prefs.notepad(kind).is_err());
        }
        assert!(validate_notepad_kind("atis-2").is_ok());
    }

    #[test]
    fn test_notepad_kinds_sorted() {
        let (_, mut prefs) = fresh();
        prefs.set_notepad("wx", "CAVOK").unwrap();
        prefs.set_notepad("atis", "INFO K").unwrap();
        prefs.set_theme(Theme::Light);

        assert_eq!(prefs.notepad_kinds(), vec!["atis".to_string(), "wx".to_string()]);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
    }
}
