//! Error types for rollbook.
//!
//! Validation errors carry the notice shown to the user when a command is
//! rejected. Storage and configuration errors only surface when the store or
//! the configuration cannot be opened at all; reads and writes of individual
//! collections are best-effort and never produce an `Error`.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rollbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// A student name was empty or whitespace only.
    #[error("student name is required")]
    EmptyStudentName,

    /// No student was chosen for a violation.
    #[error("select a student")]
    NoStudentSelected,

    /// No violation type was chosen for a violation.
    #[error("select a violation type")]
    NoViolationTypeSelected,

    /// The violation type is already in the catalog.
    #[error("violation type '{label}' already exists")]
    DuplicateViolationType {
        /// The rejected label.
        label: String,
    },

    /// The referenced student does not exist.
    #[error("no student with id '{id}'")]
    UnknownStudent {
        /// The id that was not found.
        id: String,
    },

    /// The violation type is not in the catalog.
    #[error("unknown violation type '{label}'")]
    UnknownViolationType {
        /// The label that was not found.
        label: String,
    },

    /// A date could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

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

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for rollbook operations.
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

    /// Create a duplicate violation type error.
    #[must_use]
    pub fn duplicate_violation_type(label: impl Into<String>) -> Self {
        Self::DuplicateViolationType {
            label: label.into(),
        }
    }

    /// Create an unknown student error.
    #[must_use]
    pub fn unknown_student(id: impl Into<String>) -> Self {
        Self::UnknownStudent { id: id.into() }
    }

    /// Check if this error is a rejected user input rather than a failure.
    ///
    /// Validation errors leave all state untouched.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyStudentName
                | Self::NoStudentSelected
                | Self::NoViolationTypeSelected
                | Self::DuplicateViolationType { .. }
                | Self::UnknownStudent { .. }
                | Self::UnknownViolationType { .. }
                | Self::InvalidDate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::EmptyStudentName.to_string(),
            "student name is required"
        );
        assert_eq!(Error::NoStudentSelected.to_string(), "select a student");
        assert_eq!(
            Error::NoViolationTypeSelected.to_string(),
            "select a violation type"
        );
    }

    #[test]
    fn test_duplicate_violation_type_display() {
        let err = Error::duplicate_violation_type("Berkelahi");
        assert_eq!(
            err.to_string(),
            "violation type 'Berkelahi' already exists"
        );
    }

    #[test]
    fn test_unknown_student_display() {
        let err = Error::unknown_student("abc-1");
        assert!(err.to_string().contains("abc-1"));
    }

    #[test]
    fn test_invalid_date_display() {
        let err = Error::InvalidDate {
            input: "2024-13-01".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2024-13-01"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::EmptyStudentName.is_validation());
        assert!(Error::NoStudentSelected.is_validation());
        assert!(Error::duplicate_violation_type("x").is_validation());
        assert!(Error::UnknownViolationType {
            label: "x".to_string()
        }
        .is_validation());
        assert!(!Error::internal("bug").is_validation());
        assert!(!Error::ConfigValidation {
            message: "bad".to_string()
        }
        .is_validation());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
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
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
