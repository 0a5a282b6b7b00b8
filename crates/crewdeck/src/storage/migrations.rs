//! Versioned upgrades of the crewdeck database.
//!
//! The `metadata` table records the last applied step. Each step runs in its
//! own transaction and bumps the version when it commits.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// Version a fully upgraded database reports.
pub const CURRENT_VERSION: i32 = 2;

const VERSION_KEY: &str = "schema_version";

/// Keys written by the earliest releases, mapped to their current names.
const LEGACY_KEYS: &[(&str, &str)] = &[("taskflow-tasks", "tasks"), ("taskflow-theme", "theme")];

type Step = fn(&Connection) -> Result<()>;

/// Upgrade steps, indexed by the version they produce.
const STEPS: &[(i32, Step)] = &[(1, baseline), (2, rename_legacy_keys)];

/// Create missing tables and apply every pending step.
///
/// # Errors
///
/// Returns an error if a statement fails or the stored version is unreadable.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let from = get_schema_version(conn)?;
    for version in from + 1..=CURRENT_VERSION {
        run_migration(conn, version)?;
    }

    Ok(())
}

/// Stored version, or 0 for a fresh database.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    stored.map_or(Ok(0), |value| {
        value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        })
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Apply the step producing `version` and record it, atomically.
fn run_migration(conn: &Connection, version: i32) -> Result<()> {
    let (_, step) = STEPS
        .iter()
        .find(|(target, _)| *target == version)
        .ok_or_else(|| Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        })?;

    let tx = conn.unchecked_transaction()?;
    step(&tx)?;
    set_schema_version(&tx, version)?;
    tx.commit()?;
    tracing::info!(version, "Applied database migration");
    Ok(())
}

/// Tables come from `SCHEMA_STATEMENTS`; nothing else to do.
fn baseline(_conn: &Connection) -> Result<()> {
    Ok(())
}

/// Move `taskflow-*` rows to their current keys.
///
/// A current key wins over its legacy counterpart; the legacy row is dropped
/// either way.
fn rename_legacy_keys(conn: &Connection) -> Result<()> {
    for (legacy, current) in LEGACY_KEYS {
        conn.execute(
            "INSERT OR IGNORE INTO kv (key, value, updated_at)
             SELECT ?2, value, updated_at FROM kv WHERE key = ?1",
            (legacy, current),
        )?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [legacy])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().expect("failed to create in-memory database")
    }

    fn create_metadata_only(conn: &Connection) {
        conn.execute(
            "CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .unwrap();
    }

    fn kv_value(conn: &Connection, key: &str) -> Option<String> {
        conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .ok()
    }

    #[test]
    fn test_initialize_schema_creates_tables() {
        let conn = create_test_db();
        initialize_schema(&conn).expect("failed to initialize schema");

        for table in ["kv", "metadata"] {
            let count: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn test_initialize_schema_sets_version() {
        let conn = create_test_db();
        initialize_schema(&conn).expect("failed to initialize schema");

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_schema_idempotent() {
        let conn = create_test_db();

        initialize_schema(&conn).expect("first init failed");
        initialize_schema(&conn).expect("second init failed");

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_get_schema_version_fresh_db() {
        let conn = create_test_db();
        create_metadata_only(&conn);

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, 0);
    }

    #[test]
    fn test_set_and_get_schema_version() {
        let conn = create_test_db();
        create_metadata_only(&conn);

        set_schema_version(&conn, 42).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 42);
    }

    #[test]
    fn test_invalid_schema_version() {
        let conn = create_test_db();
        create_metadata_only(&conn);
        conn.execute(
            "INSERT INTO metadata (key, value) VALUES (?1, 'two')",
            [VERSION_KEY],
        )
        .unwrap();

        let err = get_schema_version(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));
    }

    #[test]
    fn test_run_migration_unknown_version() {
        let conn = create_test_db();
        initialize_schema(&conn).unwrap();

        let err = run_migration(&conn, 999).unwrap_err();
        assert!(err.to_string().contains("unknown migration version"));
    }

    #[test]
    fn test_v2_renames_legacy_keys() {
        let conn = create_test_db();
        for statement in SCHEMA_STATEMENTS {
            conn.execute(statement, []).unwrap();
        }
        set_schema_version(&conn, 1).unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES ('taskflow-tasks', '[]'), ('taskflow-theme', 'light')",
            [],
        )
        .unwrap();

        initialize_schema(&conn).unwrap();

        assert_eq!(kv_value(&conn, "tasks").as_deref(), Some("[]"));
        assert_eq!(kv_value(&conn, "theme").as_deref(), Some("light"));
        assert!(kv_value(&conn, "taskflow-tasks").is_none());
        assert!(kv_value(&conn, "taskflow-theme").is_none());
    }

    #[test]
    fn test_v2_keeps_current_key_over_legacy() {
        let conn = create_test_db();
        for statement in SCHEMA_STATEMENTS {
            conn.execute(statement, []).unwrap();
        }
        set_schema_version(&conn, 1).unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES ('taskflow-theme', 'light'), ('theme', 'dark')",
            [],
        )
        .unwrap();

        initialize_schema(&conn).unwrap();

        assert_eq!(kv_value(&conn, "theme").as_deref(), Some("dark"));
        assert!(kv_value(&conn, "taskflow-theme").is_none());
    }
}
