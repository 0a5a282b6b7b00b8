//! Checklist item types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque item identifier, unique for the lifetime of a store.
///
/// Identifiers grow monotonically in creation order and are never reused,
/// not even after a profile switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Layout group for an item. Purely visual; says nothing about priority.
///
/// Serialized as the number `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Column {
    /// Left column; where new items go.
    #[default]
    One,
    /// Right column.
    Two,
}

impl TryFrom<u8> for Column {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("column must be 1 or 2, got {other}")),
        }
    }
}

impl From<Column> for u8 {
    fn from(column: Column) -> Self {
        match column {
            Column::One => 1,
            Column::Two => 2,
        }
    }
}

/// A single checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Unique identifier.
    pub id: ItemId,
    /// Display text, never blank.
    pub text: String,
    /// Whether the item has been ticked off.
    pub completed: bool,
    /// Layout group.
    pub column: Column,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
}

/// Where newly added items are placed in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// Newest first.
    #[default]
    Head,
    /// Newest last.
    Tail,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_item() -> ChecklistItem {
        ChecklistItem {
            id: ItemId::new(1_700_000_000_000),
            text: "Brake Temp".to_string(),
            completed: false,
            column: Column::Two,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_item_serializes_camel_case_with_numeric_column() {
        let json = serde_json::to_value(sample_item()).unwrap();

        assert_eq!(json["id"], 1_700_000_000_000_u64);
        assert_eq!(json["column"], 2);
        assert_eq!(json["completed"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_item_reads_browser_shape() {
        let raw = r#"{"id":1712345678901,"text":"APU Start","completed":true,"column":1,"createdAt":"2024-04-05T19:34:38.901Z"}"#;
        let item: ChecklistItem = serde_json::from_str(raw).unwrap();

        assert_eq!(item.id, ItemId::new(1_712_345_678_901));
        assert_eq!(item.text, "APU Start");
        assert!(item.completed);
        assert_eq!(item.column, Column::One);
    }

    #[test]
    fn test_column_rejects_out_of_range() {
        let raw = r#"{"id":1,"text":"x","completed":false,"column":3,"createdAt":"2024-04-05T19:34:38Z"}"#;
        assert!(serde_json::from_str::<ChecklistItem>(raw).is_err());
    }

    #[test]
    fn test_column_conversions() {
        assert_eq!(u8::from(Column::One), 1);
        assert_eq!(Column::try_from(2), Ok(Column::Two));
        assert!(Column::try_from(0).is_err());
        assert_eq!(Column::default(), Column::One);
    }

    #[test]
    fn test_insert_position_serde() {
        assert_eq!(serde_json::to_string(&InsertPosition::Tail).unwrap(), "\"tail\"");
        let parsed: InsertPosition = serde_json::from_str("\"head\"").unwrap();
        assert_eq!(parsed, InsertPosition::Head);
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId::new(42).to_string(), "42");
        assert_eq!(ItemId::new(42).get(), 42);
    }
}
