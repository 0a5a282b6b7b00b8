//! Error types for crewdeck.
//!
//! Every fallible operation in the crate returns [`Result`]. Most runtime
//! failures are recovered locally (corrupt storage falls back to defaults,
//! unknown ids are no-ops), so the variants that reach callers are mostly
//! validation and setup errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for crewdeck operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// A checklist item was submitted with blank text.
    #[error("checklist item text cannot be empty")]
    EmptyItemText,

    /// A departure time did not match `HH:MM`.
    #[error("invalid departure time '{input}': expected HH:MM (24h)")]
    InvalidDepartureTime {
        /// The rejected input.
        input: String,
    },

    /// A notepad kind contained characters outside `[a-z0-9-]`.
    #[error("invalid notepad kind '{kind}'")]
    InvalidNotepadKind {
        /// The rejected kind.
        kind: String,
    },

    /// A calculator received an out-of-range input.
    #[error("invalid input for {calculator}: {message}")]
    InvalidInput {
        /// Name of the calculator.
        calculator: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// The requested feature is switched off for this session.
    #[error("{capability} is disabled in this configuration")]
    CapabilityDisabled {
        /// Name of the disabled capability.
        capability: &'static str,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for crewdeck operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a calculator input error.
    #[must_use]
    pub fn invalid_input(calculator: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            calculator,
            message: message.into(),
        }
    }

    /// Create a capability disabled error.
    #[must_use]
    pub fn capability_disabled(capability: &'static str) -> Self {
        Self::CapabilityDisabled { capability }
    }

    /// Check if this error is a rejected user input rather than a system fault.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyItemText
                | Self::InvalidDepartureTime { .. }
                | Self::InvalidNotepadKind { .. }
                | Self::InvalidInput { .. }
        )
    }

    /// Check if this error comes from a disabled capability.
    #[must_use]
    pub fn is_capability_disabled(&self) -> bool {
        matches!(self, Self::CapabilityDisabled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::EmptyItemText.to_string(),
            "checklist item text cannot be empty"
        );

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_invalid_departure_time_display() {
        let err = Error::InvalidDepartureTime {
            input: "25:00".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("25:00"));
        assert!(msg.contains("HH:MM"));
    }

    #[test]
    fn test_is_validation_error() {
        assert!(Error::EmptyItemText.is_validation_error());
        assert!(Error::InvalidNotepadKind {
            kind: "A B".to_string()
        }
        .is_validation_error());
        assert!(Error::invalid_input("rate one turn", "tas must be positive").is_validation_error());
        assert!(!Error::internal("boom").is_validation_error());
        assert!(!Error::capability_disabled("timeline").is_validation_error());
    }

    #[test]
    fn test_capability_disabled() {
        let err = Error::capability_disabled("notepad");
        assert!(err.is_capability_disabled());
        assert_eq!(err.to_string(), "notepad is disabled in this configuration");
        assert!(!Error::EmptyItemText.is_capability_disabled());
    }

    #[test]
    fn test_invalid_input_display() {
        let err = Error::invalid_input("density altitude", "missing altimeter setting");
        let msg = err.to_string();
        assert!(msg.contains("density altitude"));
        assert!(msg.contains("missing altimeter setting"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "invalid interval".to_string(),
        };
        assert!(err.to_string().contains("invalid interval"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
