//! Built-in checklist profiles and item reference material.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::item::Column;

/// A named checklist template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Before engine start.
    #[default]
    Preflight,
    /// In cruise.
    Cruise,
}

const PREFLIGHT_COLUMN_ONE: &[&str] = &[
    "Brake Temp",
    "Batt Check/ADIRS",
    "Power Up",
    "OIS",
    "TechLog/MEL",
    "A/C Conf Diff/OEB",
    "Fire Test",
    "APU Start",
    "TOPA",
];

const PREFLIGHT_COLUMN_TWO: &[&str] = &[
    "Security Check Form",
    "Fuel Figures",
    "NOTOC",
    "ATC CLR",
    "Briefing",
    "Cockpit Prep",
    "Loadsheet Confirmation",
    "Xcheck Avionics",
    "Tech + Cabin Logs Sign",
    "PA (USA spec)",
    "Before Start Checklist",
];

const CRUISE_ITEMS: &[&str] = &[
    "Systems check",
    "Fuel check",
    "Alternate Weather",
    "OEI Strategy",
    "Decompression Strategy",
    "DARD (if applicable)",
    "Track and Distance (if applicable)",
    "Dest Alternate route",
];

impl Profile {
    /// Every profile, in switching order.
    pub const ALL: [Profile; 2] = [Profile::Preflight, Profile::Cruise];

    /// The profile after this one; wraps around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Preflight => Self::Cruise,
            Self::Cruise => Self::Preflight,
        }
    }

    /// Stable lowercase name, as persisted.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Cruise => "cruise",
        }
    }

    /// Heading shown above the list.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Preflight => "Preflight Checklist",
            Self::Cruise => "Cruise Checklist",
        }
    }

    /// The canonical items of this profile with their columns, in order.
    pub fn default_entries(self) -> impl Iterator<Item = (&'static str, Column)> {
        let (first, second): (&'static [&'static str], &'static [&'static str]) = match self {
            Self::Preflight => (PREFLIGHT_COLUMN_ONE, PREFLIGHT_COLUMN_TWO),
            Self::Cruise => (CRUISE_ITEMS, &[]),
        };
        first
            .iter()
            .map(|text| (*text, Column::One))
            .chain(second.iter().map(|text| (*text, Column::Two)))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.name() == s)
            .ok_or_else(|| format!("unknown checklist profile: {s}"))
    }
}

/// Reference material attached to a checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemReference {
    /// Heading for the reference panel.
    pub title: &'static str,
    /// Image assets to show, in order.
    pub assets: &'static [&'static str],
    /// Extra caption shown between assets, if any.
    pub note: Option<&'static str>,
}

const REFERENCES: &[(&str, ItemReference)] = &[
    (
        "Brake Temp",
        ItemReference {
            title: "Brake Temperature Cooling Chart",
            assets: &["brake-cooling-table.JPG"],
            note: None,
        },
    ),
    (
        "NOTOC",
        ItemReference {
            title: "Emergency Response Guide for Dangerous Goods",
            assets: &["ERG.JPG"],
            note: None,
        },
    ),
    (
        "Briefing",
        ItemReference {
            title: "Departure Briefing",
            assets: &["Departure-briefing.JPG"],
            note: None,
        },
    ),
    (
        "Fuel Figures",
        ItemReference {
            title: "Fuel Discrepancy Table",
            assets: &["Fuel-difference-table.JPG"],
            note: None,
        },
    ),
    (
        "PA (USA spec)",
        ItemReference {
            title: "Passenger Announcements",
            assets: &["Pre-departure-PA.JPG", "USA-PA.JPG"],
            note: Some("USA specific"),
        },
    ),
];

/// Look up reference material for an item text.
///
/// Matches the whole text first, then the part before the first `/`
/// (so `"Batt Check/ADIRS"` can share an entry with `"Batt Check"`).
#[must_use]
pub fn reference_for(text: &str) -> Option<&'static ItemReference> {
    let find = |key: &str| {
        REFERENCES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, reference)| reference)
    };

    find(text).or_else(|| text.split('/').next().map(str::trim).and_then(find))
}
