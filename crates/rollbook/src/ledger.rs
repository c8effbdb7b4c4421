//! The rollbook ledger: in-memory collections plus the commands that change them.
//!
//! The in-memory collections are the working copy for a session. Every
//! command that changes a collection writes that collection back to the
//! store before returning. Store writes are best-effort, so a failed write
//! only costs durability, never the session.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    generate_id, today, AttendanceRecord, Student, Violation, ViolationTypeCatalog,
    ATTENDANCE_KEY, STUDENTS_KEY, VIOLATIONS_KEY, VIOLATION_TYPES_KEY,
};
use crate::storage::Store;
use crate::views::{self, ViolationStats};

/// Prompt shown before removing a student.
pub const REMOVE_STUDENT_PROMPT: &str = "Remove this student and all related records?";
/// Prompt shown before removing a violation.
pub const REMOVE_VIOLATION_PROMPT: &str = "Remove this violation record?";
/// Prompt shown before a full reset.
pub const RESET_PROMPT: &str = "Reset all data? This cannot be undone.";

/// Asks the user to approve a destructive command.
pub trait Confirm {
    /// Return `true` to go ahead.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A fixed answer to every confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed and was persisted.
    Applied,
    /// The user declined the confirmation.
    Declined,
    /// Nothing to do, such as an unknown id or a blank label.
    Unchanged,
}

/// Students, attendance, violations and the violation type catalog.
#[derive(Debug)]
pub struct Ledger {
    store: Store,
    students: Vec<Student>,
    attendance: Vec<AttendanceRecord>,
    violations: Vec<Violation>,
    catalog: ViolationTypeCatalog,
    selected_date: NaiveDate,
}

impl Ledger {
    /// Load every collection from `store`, falling back to seeds.
    ///
    /// Collections whose key has never been stored are written back, so seed
    /// ids stay stable across sessions.
    #[must_use]
    pub fn load(store: Store, config: &Config) -> Self {
        let seed_students = if config.seed.demo_students {
            demo_students()
        } else {
            Vec::new()
        };
        let seed_catalog = ViolationTypeCatalog::new(config.catalog.default_types.clone());

        let ledger = Self {
            students: store.read(STUDENTS_KEY, seed_students),
            attendance: store.read(ATTENDANCE_KEY, Vec::new()),
            violations: store.read(VIOLATIONS_KEY, Vec::new()),
            catalog: store.read(VIOLATION_TYPES_KEY, seed_catalog),
            selected_date: today(),
            store,
        };

        let stored: HashSet<String> = ledger.store.keys().unwrap_or_default().into_iter().collect();
        if !stored.contains(STUDENTS_KEY) {
            ledger.persist_students();
        }
        if !stored.contains(ATTENDANCE_KEY) {
            ledger.persist_attendance();
        }
        if !stored.contains(VIOLATIONS_KEY) {
            ledger.persist_violations();
        }
        if !stored.contains(VIOLATION_TYPES_KEY) {
            ledger.persist_catalog();
        }

        debug!(
            "Loaded {} students, {} attendance records, {} violations, {} violation types",
            ledger.students.len(),
            ledger.attendance.len(),
            ledger.violations.len(),
            ledger.catalog.len()
        );
        ledger
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// All students in insertion order.
    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Look up a student by id.
    #[must_use]
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// All attendance records.
    #[must_use]
    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    /// All violations.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The violation type catalog.
    #[must_use]
    pub fn catalog(&self) -> &ViolationTypeCatalog {
        &self.catalog
    }

    /// The date attendance and violations are recorded against.
    #[must_use]
    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Change the selected date.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    /// Add a student.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStudentName`] if `name` is blank after trimming.
    pub fn add_student(&mut self, name: &str, class: &str) -> Result<&Student> {
        if name.trim().is_empty() {
            return Err(Error::EmptyStudentName);
        }
        let student = Student::new(name, class);
        info!("Adding student {} ({})", student.name, student.id);
        self.students.push(student);
        self.persist_students();
        self.students
            .last()
            .ok_or_else(|| Error::internal("student list empty after push"))
    }

    /// Remove a student together with all of their attendance and violations.
    ///
    /// Unknown ids return [`CommandOutcome::Unchanged`] without prompting.
    pub fn remove_student(&mut self, id: &str, confirm: &mut impl Confirm) -> CommandOutcome {
        if self.student(id).is_none() {
            debug!("No student with id {id}");
            return CommandOutcome::Unchanged;
        }
        if !confirm.confirm(REMOVE_STUDENT_PROMPT) {
            return CommandOutcome::Declined;
        }

        self.students.retain(|s| s.id != id);
        let attendance_before = self.attendance.len();
        self.attendance.retain(|a| a.student_id != id);
        let violations_before = self.violations.len();
        self.violations.retain(|v| v.student_id != id);

        info!(
            "Removed student {id} with {} attendance records and {} violations",
            attendance_before - self.attendance.len(),
            violations_before - self.violations.len()
        );
        self.persist_students();
        self.persist_attendance();
        self.persist_violations();
        CommandOutcome::Applied
    }

    /// Record `status` for a student on the selected date.
    ///
    /// Updates the existing record for that student and date, or creates one.
    /// A `note` of `None` keeps the existing note.
    pub fn set_attendance(
        &mut self,
        student_id: &str,
        status: &str,
        note: Option<&str>,
    ) -> &AttendanceRecord {
        let date = self.selected_date;
        let index = match self
            .attendance
            .iter()
            .position(|a| a.student_id == student_id && a.date == date)
        {
            Some(index) => {
                let record = &mut self.attendance[index];
                record.status = status.to_string();
                if let Some(note) = note {
                    record.note = note.to_string();
                }
                debug!("Updated attendance {} to {status}", record.id);
                index
            }
            None => {
                let record = AttendanceRecord {
                    id: generate_id(),
                    student_id: student_id.to_string(),
                    date,
                    status: status.to_string(),
                    note: note.unwrap_or_default().to_string(),
                };
                debug!("Created attendance {} as {status}", record.id);
                self.attendance.push(record);
                self.attendance.len() - 1
            }
        };
        self.persist_attendance();
        &self.attendance[index]
    }

    /// Record a violation for a student on the selected date.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the student or type is blank, the
    /// student does not exist, or the type is not in the catalog.
    pub fn add_violation(
        &mut self,
        student_id: &str,
        kind: &str,
        note: Option<&str>,
    ) -> Result<&Violation> {
        let student_id = student_id.trim();
        let kind = kind.trim();
        if student_id.is_empty() {
            return Err(Error::NoStudentSelected);
        }
        if kind.is_empty() {
            return Err(Error::NoViolationTypeSelected);
        }
        if self.student(student_id).is_none() {
            return Err(Error::unknown_student(student_id));
        }
        if !self.catalog.contains(kind) {
            return Err(Error::UnknownViolationType {
                label: kind.to_string(),
            });
        }

        let violation = Violation {
            id: generate_id(),
            student_id: student_id.to_string(),
            date: self.selected_date,
            kind: kind.to_string(),
            note: note.unwrap_or_default().to_string(),
        };
        info!(
            "Recording violation '{}' for {student_id} on {}",
            violation.kind, violation.date
        );
        self.violations.push(violation);
        self.persist_violations();
        self.violations
            .last()
            .ok_or_else(|| Error::internal("violation list empty after push"))
    }

    /// Add a label to the violation type catalog.
    ///
    /// A blank label is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateViolationType`] if the label already exists.
    pub fn add_violation_type(&mut self, input: &str) -> Result<CommandOutcome> {
        if !self.catalog.add(input)? {
            return Ok(CommandOutcome::Unchanged);
        }
        info!("Added violation type '{}'", input.trim());
        self.persist_catalog();
        Ok(CommandOutcome::Applied)
    }

    /// Remove a single violation by id.
    ///
    /// Unknown ids return [`CommandOutcome::Unchanged`] without prompting.
    pub fn remove_violation(&mut self, id: &str, confirm: &mut impl Confirm) -> CommandOutcome {
        if !self.violations.iter().any(|v| v.id == id) {
            debug!("No violation with id {id}");
            return CommandOutcome::Unchanged;
        }
        if !confirm.confirm(REMOVE_VIOLATION_PROMPT) {
            return CommandOutcome::Declined;
        }
        self.violations.retain(|v| v.id != id);
        info!("Removed violation {id}");
        self.persist_violations();
        CommandOutcome::Applied
    }

    /// Clear students, attendance and violations.
    ///
    /// The violation type catalog is kept.
    pub fn reset_all(&mut self, confirm: &mut impl Confirm) -> CommandOutcome {
        if !confirm.confirm(RESET_PROMPT) {
            return CommandOutcome::Declined;
        }
        info!(
            "Resetting {} students, {} attendance records, {} violations",
            self.students.len(),
            self.attendance.len(),
            self.violations.len()
        );
        self.students.clear();
        self.attendance.clear();
        self.violations.clear();
        self.persist_students();
        self.persist_attendance();
        self.persist_violations();
        CommandOutcome::Applied
    }

    /// Students matching `query` by name or class.
    #[must_use]
    pub fn filtered_students(&self, query: &str) -> Vec<&Student> {
        views::filter_students(&self.students, query)
    }

    /// Attendance records on the selected date.
    #[must_use]
    pub fn attendance_for_date(&self) -> Vec<&AttendanceRecord> {
        views::attendance_for_date(&self.attendance, self.selected_date)
    }

    /// Violations on the selected date.
    #[must_use]
    pub fn violations_for_date(&self) -> Vec<&Violation> {
        views::violations_for_date(&self.violations, self.selected_date)
    }

    /// Violation counts over all dates.
    #[must_use]
    pub fn stats_all_time(&self) -> ViolationStats {
        views::violation_stats(&self.catalog, &self.violations, None)
    }

    /// Violation counts on the selected date.
    #[must_use]
    pub fn stats_for_date(&self) -> ViolationStats {
        views::violation_stats(&self.catalog, &self.violations, Some(self.selected_date))
    }

    fn persist_students(&self) {
        let _ = self.store.write(STUDENTS_KEY, &self.students);
    }

    fn persist_attendance(&self) {
        let _ = self.store.write(ATTENDANCE_KEY, &self.attendance);
    }

    fn persist_violations(&self) {
        let _ = self.store.write(VIOLATIONS_KEY, &self.violations);
    }

    fn persist_catalog(&self) {
        let _ = self.store.write(VIOLATION_TYPES_KEY, &self.catalog);
    }
}

fn demo_students() -> Vec<Student> {
    vec![
        Student::new("Andi Saputra", "7A"),
        Student::new("Siti Aminah", "7B"),
        Student::new("Budi Santoso", "8A"),
    ]
}
