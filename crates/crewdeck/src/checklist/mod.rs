//! The checklist: an ordered list of items under one active profile.
//!
//! [`ChecklistStore`] owns the in-memory list and writes it through to the
//! key/value store after every mutation. A failed write is logged and the
//! in-memory state stays authoritative for the rest of the session.

mod item;
mod profile;
mod view;

pub use item::{ChecklistItem, Column, InsertPosition, ItemId};
pub use profile::{reference_for, ItemReference, Profile};
pub use view::{ChecklistSnapshot, ChecklistView, Filter, Totals};

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::storage::{keys, load_json, save_json, SharedStore};

/// Mutable checklist state with write-through persistence.
#[derive(Debug)]
pub struct ChecklistStore {
    storage: SharedStore,
    clock: Arc<dyn Clock>,
    items: Vec<ChecklistItem>,
    profile: Profile,
    insert_position: InsertPosition,
    next_id: u64,
}

impl ChecklistStore {
    /// Load the checklist from `storage`.
    ///
    /// Falls back to the preflight defaults, written back, when nothing is
    /// stored or the stored list cannot be read. Items with blank text are
    /// dropped.
    #[must_use]
    pub fn load(
        storage: SharedStore,
        clock: Arc<dyn Clock>,
        insert_position: InsertPosition,
    ) -> Self {
        let mut store = Self {
            storage,
            clock,
            items: Vec::new(),
            profile: Profile::default(),
            insert_position,
            next_id: 1,
        };

        match load_json::<Vec<ChecklistItem>>(store.storage.as_ref(), keys::TASKS) {
            Ok(Some(items)) => {
                store.profile = store.stored_profile();
                store.items = sanitize(items);
                let max_id = store.items.iter().map(|item| item.id.get()).max();
                match max_id.map_or(Some(1), |max| max.checked_add(1)) {
                    Some(next) => store.next_id = next,
                    None => {
                        warn!("Stored checklist ids exhausted, renumbering items");
                        store.renumber();
                        store.persist_items();
                    }
                }
                debug!(
                    "Loaded {} checklist items for profile {}",
                    store.items.len(),
                    store.profile
                );
            }
            Ok(None) => {
                info!("No stored checklist, starting from preflight defaults");
                store.items = store.generate(Profile::Preflight);
                store.persist_items();
                store.persist_profile();
            }
            Err(e) => {
                warn!("Stored checklist unreadable, restoring preflight defaults: {e}");
                store.items = store.generate(Profile::Preflight);
                store.persist_items();
                store.persist_profile();
            }
        }

        store
    }

    fn stored_profile(&self) -> Profile {
        match self.storage.get(keys::ACTIVE_CHECKLIST) {
            Ok(Some(name)) => name.parse().unwrap_or_else(|e| {
                warn!("{e}; using {}", Profile::default());
                Profile::default()
            }),
            Ok(None) => Profile::default(),
            Err(e) => {
                warn!("Failed to read active checklist: {e}");
                Profile::default()
            }
        }
    }

    /// All items, in list order.
    #[must_use]
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Look up one item.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The active profile.
    #[must_use]
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Add a user item to column one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyItemText`] if `text` is blank after trimming.
    pub fn add_item(&mut self, text: &str) -> Result<ItemId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyItemText);
        }

        let item = self.make_item(text, Column::One);
        let id = item.id;
        match self.insert_position {
            InsertPosition::Head => self.items.insert(0, item),
            InsertPosition::Tail => self.items.push(item),
        }
        debug!("Added checklist item {id}");

        self.persist_items();
        Ok(id)
    }

    /// Flip completion of one item. Returns `false` if `id` is unknown.
    pub fn toggle_item(&mut self, id: ItemId) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.completed = !item.completed;
        debug!("Item {id} completed: {}", item.completed);

        self.persist_items();
        true
    }

    /// Remove one item. Returns `false` if `id` is unknown.
    pub fn delete_item(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }
        debug!("Deleted checklist item {id}");

        self.persist_items();
        true
    }

    /// Mark every item incomplete. No other field changes.
    ///
    /// Callers should confirm with the user first.
    pub fn reset_all(&mut self) {
        for item in &mut self.items {
            item.completed = false;
        }
        info!("Checklist reset, {} items cleared", self.items.len());
        self.persist_items();
    }

    /// Make `profile` active and replace the list with its defaults.
    ///
    /// Switching to the profile that is already active still regenerates.
    pub fn switch_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.items = self.generate(profile);
        info!("Switched checklist to {profile}");
        self.persist_profile();
        self.persist_items();
    }

    /// A filtered view over the current list.
    #[must_use]
    pub fn view(&self, filter: Filter) -> ChecklistView<'_> {
        ChecklistView::new(&self.items, filter)
    }

    /// Total and completed counts, independent of any filter.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::of(&self.items)
    }

    /// Owned copy of the filtered list.
    #[must_use]
    pub fn snapshot(&self, filter: Filter) -> ChecklistSnapshot {
        ChecklistSnapshot::capture(self.profile, self.view(filter), self.totals())
    }

    fn make_item(&mut self, text: &str, column: Column) -> ChecklistItem {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;
        ChecklistItem {
            id,
            text: text.to_string(),
            completed: false,
            column,
            created_at: self.clock.now(),
        }
    }

    /// Reassign ids from 1 in list order.
    fn renumber(&mut self) {
        self.next_id = 1;
        for item in &mut self.items {
            item.id = ItemId::new(self.next_id);
            self.next_id += 1;
        }
    }

    fn generate(&mut self, profile: Profile) -> Vec<ChecklistItem> {
        profile
            .default_entries()
            .map(|(text, column)| self.make_item(text, column))
            .collect()
    }

    fn persist_items(&self) {
        if let Err(e) = save_json(self.storage.as_ref(), keys::TASKS, &self.items) {
            error!("Failed to persist checklist: {e}");
        }
    }

    fn persist_profile(&self) {
        if let Err(e) = self.storage.set(keys::ACTIVE_CHECKLIST, self.profile.name()) {
            error!("Failed to persist active checklist: {e}");
        }
    }
}

/// Drop blank items and repeated ids, keeping first occurrences.
fn sanitize(items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            if item.text.trim().is_empty() {
                warn!("Dropping stored item {} with blank text", item.id);
                return false;
            }
            if !seen.insert(item.id) {
                warn!("Dropping stored item with duplicate id {}", item.id);
                return false;
            }
            true
        })
        .collect()
}
