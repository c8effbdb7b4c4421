//! `SQLite` schema definitions for rollbook.
//!
//! Every collection lives as one JSON document in the `records` table, keyed
//! by its storage key. The `metadata` table only tracks the schema version.

/// SQL statement to create the key-value records table.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `updated_at` for the status report.
pub const CREATE_UPDATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_records_updated ON records(updated_at DESC)
";

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RECORDS_TABLE,
    CREATE_UPDATED_INDEX,
    CREATE_METADATA_TABLE,
];
