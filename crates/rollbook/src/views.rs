//! Derived views over the ledger collections.
//!
//! Everything here is a pure function of its inputs and is recomputed on
//! demand. Nothing in this module is persisted.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::{AttendanceRecord, Student, Violation, ViolationTypeCatalog};

/// Students whose name or class contains `query`, ignoring case.
///
/// An empty query matches every student. Order is preserved.
#[must_use]
pub fn filter_students<'a>(students: &'a [Student], query: &str) -> Vec<&'a Student> {
    let needle = query.to_lowercase();
    students
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle) || s.class.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Attendance records dated `date`, in stored order.
#[must_use]
pub fn attendance_for_date(records: &[AttendanceRecord], date: NaiveDate) -> Vec<&AttendanceRecord> {
    records.iter().filter(|r| r.date == date).collect()
}

/// Violations dated `date`, in stored order.
#[must_use]
pub fn violations_for_date(violations: &[Violation], date: NaiveDate) -> Vec<&Violation> {
    violations.iter().filter(|v| v.date == date).collect()
}

/// Violation counts per type.
///
/// Every catalog label is present, in catalog order, even with a zero count.
/// Types missing from the catalog follow in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationStats {
    counts: Vec<(String, usize)>,
}

impl ViolationStats {
    /// Count for `label`, or `None` if the label never appeared.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Iterate over `(label, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, c)| (l.as_str(), *c))
    }

    /// Number of labels in the stats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if there are no labels at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// One row per label, for tabular output and export.
    #[must_use]
    pub fn rows(&self) -> Vec<StatRow> {
        self.counts
            .iter()
            .map(|(label, count)| StatRow {
                kind: label.clone(),
                count: *count,
            })
            .collect()
    }

    fn bump(&mut self, label: &str) {
        if let Some((_, count)) = self.counts.iter_mut().find(|(l, _)| l == label) {
            *count += 1;
        } else {
            self.counts.push((label.to_string(), 1));
        }
    }
}

// Serialized as a JSON object keyed by label, keeping catalog order.
impl Serialize for ViolationStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, count) in &self.counts {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// A single `(type, count)` line of [`ViolationStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatRow {
    /// Violation label.
    #[serde(rename = "type")]
    pub kind: String,
    /// Number of violations.
    pub count: usize,
}

/// Count violations per catalog label.
///
/// With `date` set only violations on that date are counted; otherwise all
/// of them are.
#[must_use]
pub fn violation_stats(
    catalog: &ViolationTypeCatalog,
    violations: &[Violation],
    date: Option<NaiveDate>,
) -> ViolationStats {
    let mut stats = ViolationStats {
        counts: catalog.iter().map(|label| (label.to_string(), 0)).collect(),
    };
    for violation in violations
        .iter()
        .filter(|v| date.map_or(true, |d| v.date == d))
    {
        stats.bump(&violation.kind);
    }
    stats
}

/// Attendance record joined with its student, for listing and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    /// Calendar date.
    pub date: NaiveDate,
    /// Student id.
    pub student_id: String,
    /// Student name, empty if the student no longer exists.
    pub name: String,
    /// Student class, empty if the student no longer exists.
    pub class: String,
    /// Attendance status.
    pub status: String,
    /// Remark.
    pub note: String,
}

/// Violation joined with its student, for listing and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRow {
    /// Violation id.
    pub id: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Student id.
    pub student_id: String,
    /// Student name, empty if the student no longer exists.
    pub name: String,
    /// Student class, empty if the student no longer exists.
    pub class: String,
    /// Violation label.
    #[serde(rename = "type")]
    pub kind: String,
    /// Remark.
    pub note: String,
}

fn lookup<'a>(students: &'a [Student], id: &str) -> (&'a str, &'a str) {
    students
        .iter()
        .find(|s| s.id == id)
        .map_or(("", ""), |s| (s.name.as_str(), s.class.as_str()))
}

/// Join attendance records with student names.
#[must_use]
pub fn attendance_rows<'a, I>(students: &[Student], records: I) -> Vec<AttendanceRow>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records
        .into_iter()
        .map(|r| {
            let (name, class) = lookup(students, &r.student_id);
            AttendanceRow {
                date: r.date,
                student_id: r.student_id.clone(),
                name: name.to_string(),
                class: class.to_string(),
                status: r.status.clone(),
                note: r.note.clone(),
            }
        })
        .collect()
}

/// Join violations with student names.
#[must_use]
pub fn violation_rows<'a, I>(students: &[Student], violations: I) -> Vec<ViolationRow>
where
    I: IntoIterator<Item = &'a Violation>,
{
    violations
        .into_iter()
        .map(|v| {
            let (name, class) = lookup(students, &v.student_id);
            ViolationRow {
                id: v.id.clone(),
                date: v.date,
                student_id: v.student_id.clone(),
                name: name.to_string(),
                class: class.to_string(),
                kind: v.kind.clone(),
                note: v.note.clone(),
            }
        })
        .collect()
}

/// Count records per attendance status, in first-seen order.
#[must_use]
pub fn attendance_summary<'a, I>(records: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut summary: Vec<(String, usize)> = Vec::new();
    for record in records {
        if let Some((_, count)) = summary.iter_mut().find(|(s, _)| *s == record.status) {
            *count += 1;
        } else {
            summary.push((record.status.clone(), 1));
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn student(id: &str, name: &str, class: &str) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            class: class.to_string(),
        }
    }

    fn violation(student_id: &str, kind: &str, day: u32) -> Violation {
        Violation {
            id: format!("{student_id}-{kind}-{day}"),
            student_id: student_id.to_string(),
            date: date(day),
            kind: kind.to_string(),
            note: String::new(),
        }
    }

    fn attendance(student_id: &str, status: &str, day: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("{student_id}-{day}"),
            student_id: student_id.to_string(),
            date: date(day),
            status: status.to_string(),
            note: String::new(),
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student("s1", "Andi Saputra", "7A"),
            student("s2", "Siti Aminah", "7B"),
            student("s3", "Budi Santoso", "8A"),
        ]
    }

    #[test]
    fn test_filter_students_by_name_ignores_case() {
        let students = roster();
        let found = filter_students(&students, "SITI");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "s2");
    }

    #[test]
    fn test_filter_students_by_class() {
        let students = roster();
        let found: Vec<_> = filter_students(&students, "7")
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(found, vec!["s1", "s2"]);
    }

    #[test]
    fn test_filter_students_empty_query_matches_all() {
        let students = roster();
        assert_eq!(filter_students(&students, "").len(), 3);
        assert!(filter_students(&students, "zzz").is_empty());
    }

    #[test]
    fn test_records_for_date() {
        let records = vec![
            attendance("s1", "present", 1),
            attendance("s2", "absent", 2),
            attendance("s3", "present", 1),
        ];
        let on_first = attendance_for_date(&records, date(1));
        assert_eq!(on_first.len(), 2);
        assert_eq!(on_first[1].student_id, "s3");

        let violations = vec![violation("s1", "Berkelahi", 1), violation("s2", "Berkelahi", 3)];
        assert_eq!(violations_for_date(&violations, date(3)).len(), 1);
        assert!(violations_for_date(&violations, date(9)).is_empty());
    }

    #[test]
    fn test_stats_cover_whole_catalog() {
        let catalog = ViolationTypeCatalog::new(["Rambut panjang", "Berkelahi", "Terlambat"]);
        let violations = vec![
            violation("s1", "Berkelahi", 1),
            violation("s2", "Berkelahi", 1),
            violation("s2", "Terlambat", 2),
        ];

        let today = violation_stats(&catalog, &violations, Some(date(1)));
        assert_eq!(today.len(), 3);
        assert_eq!(today.get("Rambut panjang"), Some(0));
        assert_eq!(today.get("Berkelahi"), Some(2));
        assert_eq!(today.get("Terlambat"), Some(0));
        assert_eq!(today.total(), violations_for_date(&violations, date(1)).len());

        let all = violation_stats(&catalog, &violations, None);
        assert_eq!(all.get("Terlambat"), Some(1));
        assert_eq!(all.total(), 3);
    }

    #[test]
    fn test_stats_keep_catalog_order() {
        let catalog = ViolationTypeCatalog::new(["b", "a"]);
        let stats = violation_stats(&catalog, &[], None);
        let labels: Vec<_> = stats.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["b", "a"]);
        assert!(!stats.is_empty());
    }

    #[test]
    fn test_stats_count_types_outside_catalog() {
        let catalog = ViolationTypeCatalog::new(["Berkelahi"]);
        let violations = vec![violation("s1", "Mencontek", 1)];

        let stats = violation_stats(&catalog, &violations, None);
        assert_eq!(stats.get("Berkelahi"), Some(0));
        assert_eq!(stats.get("Mencontek"), Some(1));
        assert_eq!(stats.total(), 1);
    }

    #[test]
    fn test_stats_serialize_as_ordered_object() {
        let catalog = ViolationTypeCatalog::new(["Tidak memakai dasi", "Berkelahi"]);
        let violations = vec![violation("s2", "Berkelahi", 1)];
        let stats = violation_stats(&catalog, &violations, None);

        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"Tidak memakai dasi":0,"Berkelahi":1}"#
        );
    }

    #[test]
    fn test_stat_rows() {
        let catalog = ViolationTypeCatalog::new(["a"]);
        let rows = violation_stats(&catalog, &[], None).rows();
        assert_eq!(
            rows,
            vec![StatRow {
                kind: "a".to_string(),
                count: 0
            }]
        );
    }

    #[test]
    fn test_attendance_rows_join_students() {
        let students = roster();
        let records = vec![attendance("s2", "absent", 1), attendance("gone", "present", 1)];

        let rows = attendance_rows(&students, &records);
        assert_eq!(rows[0].name, "Siti Aminah");
        assert_eq!(rows[0].class, "7B");
        assert_eq!(rows[1].name, "");
        assert_eq!(rows[1].class, "");
    }

    #[test]
    fn test_violation_rows_join_students() {
        let students = roster();
        let violations = vec![violation("s3", "Berkelahi", 4)];

        let rows = violation_rows(&students, &violations);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Budi Santoso");
        assert_eq!(rows[0].kind, "Berkelahi");
    }

    #[test]
    fn test_attendance_summary() {
        let records = vec![
            attendance("s1", "present", 1),
            attendance("s2", "absent", 1),
            attendance("s3", "present", 1),
        ];
        assert_eq!(
            attendance_summary(&records),
            vec![("present".to_string(), 2), ("absent".to_string(), 1)]
        );
    }
}
