//! CSV export of uniform flat records.
//!
//! Headers come from the first record's keys in field order. A field is
//! quoted only when it contains a double quote, a comma, or a newline.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};

/// What an export did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// There were no records, so nothing was written.
    Empty,
    /// The CSV document was written.
    Written {
        /// Destination file.
        path: PathBuf,
        /// Number of data lines (excluding the header).
        rows: usize,
    },
}

/// Render `rows` as a CSV document.
///
/// Returns `Ok(None)` for an empty slice. Lines are joined with `\n` and the
/// document has no trailing newline.
///
/// # Errors
///
/// Returns an error if a record does not serialize to a JSON object.
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<Option<String>> {
    let records = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let Some(first) = records.first() else {
        return Ok(None);
    };
    let Value::Object(first) = first else {
        return Err(Error::internal("export records must serialize to objects"));
    };
    let keys: Vec<&String> = first.keys().collect();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        keys.iter()
            .map(|k| escape_text(k))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in &records {
        let line = keys
            .iter()
            .map(|k| escape_field(record.get(k.as_str()).unwrap_or(&Value::Null)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(Some(lines.join("\n")))
}

/// Render `rows` as CSV and write the document to `path`.
///
/// An empty slice writes nothing and returns [`ExportOutcome::Empty`].
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub fn export_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<ExportOutcome> {
    let Some(document) = to_csv(rows)? else {
        info!("Nothing to export to {}", path.display());
        return Ok(ExportOutcome::Empty);
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(path, document)?;

    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

fn escape_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape_text(s),
        other => escape_text(&other.to_string()),
    }
}

fn escape_text(text: &str) -> String {
    if text.contains(|c: char| matches!(c, '"' | ',' | '\n')) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
