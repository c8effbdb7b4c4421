//! Core record types for rollbook.
//!
//! These are the four persisted collections: students, attendance records,
//! violations, and the violation type catalog. Field names serialize in
//! camelCase and dates as `YYYY-MM-DD`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Class label used when none is given.
pub const UNASSIGNED_CLASS: &str = "-";

/// Storage key of the student collection.
pub const STUDENTS_KEY: &str = "students";
/// Storage key of the attendance collection.
pub const ATTENDANCE_KEY: &str = "attendance";
/// Storage key of the violation collection.
pub const VIOLATIONS_KEY: &str = "violations";
/// Storage key of the violation type catalog.
pub const VIOLATION_TYPES_KEY: &str = "violation-types";

/// A student on the roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text class label such as `7A`.
    #[serde(default = "unassigned_class", deserialize_with = "deserialize_class")]
    pub class: String,
}

impl Student {
    /// Create a student with a fresh id.
    ///
    /// The name is trimmed; a blank class becomes [`UNASSIGNED_CLASS`].
    #[must_use]
    pub fn new(name: &str, class: &str) -> Self {
        let class = class.trim();
        Self {
            id: generate_id(),
            name: name.trim().to_string(),
            class: if class.is_empty() {
                UNASSIGNED_CLASS.to_string()
            } else {
                class.to_string()
            },
        }
    }
}

fn unassigned_class() -> String {
    UNASSIGNED_CLASS.to_string()
}

/// Stored classes may be `null` or blank; both read as [`UNASSIGNED_CLASS`].
fn deserialize_class<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let class = Option::<String>::deserialize(deserializer)?;
    Ok(class
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(unassigned_class))
}

/// One student's attendance status on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Unique identifier.
    pub id: String,
    /// The student this record belongs to.
    pub student_id: String,
    /// Calendar date of the record.
    pub date: NaiveDate,
    /// Attendance state such as `present` or `absent`; any text is accepted.
    pub status: String,
    /// Optional remark.
    #[serde(default)]
    pub note: String,
}

/// A dated disciplinary note attached to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Unique identifier.
    pub id: String,
    /// The student this violation belongs to.
    pub student_id: String,
    /// Calendar date of the violation.
    pub date: NaiveDate,
    /// Catalog label of the violation.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional remark.
    #[serde(default)]
    pub note: String,
}

/// Ordered set of violation labels.
///
/// Labels keep insertion order and can only be added, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ViolationTypeCatalog {
    labels: Vec<String>,
}

impl From<Vec<String>> for ViolationTypeCatalog {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<ViolationTypeCatalog> for Vec<String> {
    fn from(catalog: ViolationTypeCatalog) -> Self {
        catalog.labels
    }
}

impl ViolationTypeCatalog {
    /// Build a catalog from labels, dropping repeats and keeping first occurrences.
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self { labels: Vec::new() };
        for label in labels {
            let label = label.into();
            if !catalog.contains(&label) {
                catalog.labels.push(label);
            }
        }
        catalog
    }

    /// Add a label to the end of the catalog.
    ///
    /// The input is trimmed. Returns `Ok(false)` without change when it is
    /// blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateViolationType`] if the label is already
    /// present (exact, case-sensitive match).
    pub fn add(&mut self, input: &str) -> Result<bool> {
        let label = input.trim();
        if label.is_empty() {
            return Ok(false);
        }
        if self.contains(label) {
            return Err(Error::duplicate_violation_type(label));
        }
        self.labels.push(label.to_string());
        Ok(true)
    }

    /// Check whether `label` is in the catalog.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// The labels in insertion order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterate over the labels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the catalog has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Last millisecond value handed out by [`generate_id`].
static LAST_ID_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Generate a practically unique record id.
///
/// The id is a base-36 millisecond timestamp, strictly increasing within the
/// process, followed by a short random suffix. Uniqueness is not checked.
#[must_use]
pub fn generate_id() -> String {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    let previous = LAST_ID_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    let millis = now.max(previous + 1);

    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", to_base36(millis), &suffix[..6])
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Today's calendar date in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the input is not a valid calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        input: input.to_string(),
    })
}
