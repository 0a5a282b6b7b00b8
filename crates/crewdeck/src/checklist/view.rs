//! Filtered, column-grouped reads over a checklist.

use serde::{Deserialize, Serialize};

use super::item::{ChecklistItem, Column};
use super::profile::Profile;

/// Which items a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Everything.
    #[default]
    All,
    /// Items not yet completed.
    Active,
    /// Completed items only.
    Completed,
}

impl Filter {
    /// Whether `item` passes this filter.
    #[must_use]
    pub fn matches(self, item: &ChecklistItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.completed,
            Self::Completed => item.completed,
        }
    }
}

/// Borrowed view of a checklist under a filter.
///
/// Items keep their list order within each column.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistView<'a> {
    items: &'a [ChecklistItem],
    filter: Filter,
}

impl<'a> ChecklistView<'a> {
    pub(crate) fn new(items: &'a [ChecklistItem], filter: Filter) -> Self {
        Self { items, filter }
    }

    /// The filter this view applies.
    #[must_use]
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Every visible item, in list order.
    pub fn iter(&self) -> impl Iterator<Item = &'a ChecklistItem> + 'a {
        let filter = self.filter;
        self.items.iter().filter(move |item| filter.matches(item))
    }

    /// Visible items of one column, in list order.
    pub fn column(&self, column: Column) -> impl Iterator<Item = &'a ChecklistItem> + 'a {
        self.iter().filter(move |item| item.column == column)
    }

    /// Number of visible items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Item counts, independent of any filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    /// All items.
    pub total: usize,
    /// Completed items.
    pub completed: usize,
}

impl Totals {
    pub(crate) fn of(items: &[ChecklistItem]) -> Self {
        Self {
            total: items.len(),
            completed: items.iter().filter(|item| item.completed).count(),
        }
    }

    /// Items still open.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }
}

/// Owned copy of a filtered checklist, for handing to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSnapshot {
    /// Active profile.
    pub profile: Profile,
    /// Filter applied to the columns.
    pub filter: Filter,
    /// Visible items of column one.
    pub column_one: Vec<ChecklistItem>,
    /// Visible items of column two.
    pub column_two: Vec<ChecklistItem>,
    /// Unfiltered counts.
    pub totals: Totals,
}

impl ChecklistSnapshot {
    pub(crate) fn capture(profile: Profile, view: ChecklistView<'_>, totals: Totals) -> Self {
        Self {
            profile,
            filter: view.filter(),
            column_one: view.column(Column::One).cloned().collect(),
            column_two: view.column(Column::Two).cloned().collect(),
            totals,
        }
    }
}
