//! Storage layer for rollbook.
//!
//! A small key-value store on top of `SQLite`. Each key holds one JSON
//! document. Reads and writes are best-effort: a missing or unreadable value
//! yields the caller's fallback, and a failed write is logged and reported as
//! [`WriteOutcome::Dropped`] instead of an error. Only opening the store can
//! fail.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Result of a best-effort write.
///
/// Callers are free to ignore it; the in-memory state stays the working copy
/// either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value is durable.
    Stored,
    /// The value could not be serialized or stored.
    Dropped,
}

impl WriteOutcome {
    /// Whether the write reached the database.
    #[must_use]
    pub fn is_stored(self) -> bool {
        self == Self::Stored
    }
}

/// Key-value store for the rollbook collections.
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Store {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
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

        debug!("Opening store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        info!("Store opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
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
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the value stored under `key`.
    ///
    /// Returns `fallback` when the key is absent, the query fails, or the
    /// stored text does not deserialize into `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.read_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No value stored for '{key}', using fallback");
                return fallback;
            }
            Err(e) => {
                warn!("Failed to read '{key}': {e}");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored value for '{key}' is unreadable, using fallback: {e}");
                fallback
            }
        }
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// Failures are logged and swallowed.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> WriteOutcome {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Dropping write of '{key}': {e}");
                return WriteOutcome::Dropped;
            }
        };

        match self.write_raw(key, &json) {
            Ok(()) => {
                debug!("Stored '{key}' ({} bytes)", json.len());
                WriteOutcome::Stored
            }
            Err(e) => {
                warn!("Dropping write of '{key}': {e}");
                WriteOutcome::Dropped
            }
        }
    }

    /// Reject all further writes on this connection.
    #[cfg(test)]
    pub(crate) fn set_read_only(&self) {
        self.conn
            .execute_batch("PRAGMA query_only = ON;")
            .expect("failed to set query_only");
    }

    /// List the stored keys in alphabetical order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM records ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let entries: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM records ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_updated = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map_or(0, |m| m.len())
        };

        Ok(StoreStats {
            entries,
            last_updated,
            db_size_bytes,
        })
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM records WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write_raw(&self, key: &str, json: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of stored keys.
    pub entries: i64,
    /// When any key was last written.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
