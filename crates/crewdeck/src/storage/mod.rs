//! Persistence adapter for crewdeck.
//!
//! All persisted state is a flat set of string keys holding either whole JSON
//! documents or plain scalar strings. Writes are synchronous and complete
//! before the call returns.
//!
//! Two backends implement [`KeyValueStore`]:
//! - [`SqliteStore`]: an `SQLite` database file, the normal on-device store
//! - [`MemoryStore`]: a map in memory, for tests and ephemeral sessions

pub mod keys;
pub mod migrations;
pub mod schema;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Synchronous key/value persistence.
///
/// Last writer wins; there is no versioning or conflict detection.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;

    /// List stored keys starting with `prefix`, in sorted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// A store handle shared between the components of a session.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and deserialize a JSON document.
///
/// Returns `Ok(None)` when the key is absent and `Err(Error::Json)` when the
/// stored text does not parse, so callers can tell "missing" from "corrupt".
///
/// # Errors
///
/// Returns an error on backend failure or unparseable content.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error on serialization or backend failure.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Key/value store backed by an `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory `SQLite` store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let conn = self.lock()?;
        let entries: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
        let last_write: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM kv ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        drop(conn);

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            entries,
            last_write,
            db_size_bytes,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .lock()?
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.execute(
            r"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let affected = self.lock()?.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv WHERE substr(key, 1, ?2) = ?1 ORDER BY key")?;
        let prefix_len = i64::try_from(prefix.chars().count()).unwrap_or(i64::MAX);
        let keys = stmt
            .query_map(params![prefix, prefix_len], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// Key/value store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Statistics about an `SQLite` store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of stored keys.
    pub entries: i64,
    /// `SQLite` timestamp of the most recent write.
    pub last_write: Option<String>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    fn backends() -> Vec<Box<dyn KeyValueStore>> {
        vec![
            Box::new(SqliteStore::open_in_memory().expect("failed to create sqlite store")),
            Box::new(MemoryStore::new()),
        ]
    }

    #[test]
    fn test_set_and_get() {
        for store in backends() {
            store.set("theme", "light").unwrap();
            assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        }
    }

    #[test]
    fn test_get_missing() {
        for store in backends() {
            assert!(store.get("nothing-here").unwrap().is_none());
        }
    }

    #[test]
    fn test_set_overwrites() {
        for store in backends() {
            store.set("departure-time", "08:00").unwrap();
            store.set("departure-time", "09:15").unwrap();
            assert_eq!(store.get("departure-time").unwrap().as_deref(), Some("09:15"));
        }
    }

    #[test]
    fn test_remove() {
        for store in backends() {
            store.set("departure-time", "08:00").unwrap();
            assert!(store.remove("departure-time").unwrap());
            assert!(!store.remove("departure-time").unwrap());
            assert!(store.get("departure-time").unwrap().is_none());
        }
    }

    #[test]
    fn test_keys_with_prefix() {
        for store in backends() {
            store.set("notepad-route", "DCT").unwrap();
            store.set("notepad-atis", "INFO B").unwrap();
            store.set("theme", "dark").unwrap();

            let keys = store.keys_with_prefix("notepad-").unwrap();
            assert_eq!(keys, vec!["notepad-atis", "notepad-route"]);
        }
    }

    #[test]
    fn test_keys_with_prefix_treats_wildcards_literally() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("notepad_x", "a").unwrap();
        store.set("notepad-y", "b").unwrap();

        let keys = store.keys_with_prefix("notepad_").unwrap();
        assert_eq!(keys, vec!["notepad_x"]);
    }

    #[test]
    fn test_json_round_trip() {
        for store in backends() {
            let doc = Doc {
                name: "preflight".to_string(),
                count: 20,
            };
            save_json(store.as_ref(), "doc", &doc).unwrap();

            let loaded: Option<Doc> = load_json(store.as_ref(), "doc").unwrap();
            assert_eq!(loaded, Some(doc));
        }
    }

    #[test]
    fn test_load_json_missing() {
        let store = MemoryStore::new();
        let loaded: Option<Doc> = load_json(&store, "doc").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_json_corrupt() {
        let store = MemoryStore::new();
        store.set("doc", "{not json").unwrap();

        let result: Result<Option<Doc>> = load_json(&store, "doc");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_unicode_value() {
        for store in backends() {
            store.set("notepad-pa", "Bonjour ✈ مرحبا").unwrap();
            assert_eq!(
                store.get("notepad-pa").unwrap().as_deref(),
                Some("Bonjour ✈ مرحبا")
            );
        }
    }

    #[test]
    fn test_memory_store_len() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sqlite_path_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_stats_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stats = store.stats().unwrap();

        assert_eq!(stats.entries, 0);
        assert!(stats.last_write.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("tasks", "[]").unwrap();
        store.set("theme", "dark").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 2);
        assert!(stats.last_write.is_some());
    }

    #[test]
    fn test_open_file_based_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("crewdeck.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.set("departure-time", "07:45").unwrap();
            assert_eq!(store.path(), db_path);
            assert!(store.stats().unwrap().db_size_bytes > 0);
        }

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            reopened.get("departure-time").unwrap().as_deref(),
            Some("07:45")
        );
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/crewdeck.db");

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());
        drop(store);
    }
}
