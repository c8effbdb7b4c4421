//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Student commands.
#[derive(Debug, Subcommand)]
pub enum StudentCommand {
    /// Add a student
    Add {
        /// Student name
        name: String,

        /// Class label (defaults to "-")
        #[arg(long, default_value = "")]
        class: String,
    },

    /// Remove a student and all of their records
    Remove {
        /// Student id
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List students, optionally filtered by name or class
    List {
        /// Case-insensitive filter on name or class
        #[arg(default_value = "")]
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

/// Attendance commands.
#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    /// Set a student's attendance status for the selected date
    Set {
        /// Student id
        student_id: String,

        /// Status, e.g. present, absent, excused
        status: String,

        /// Remark to store with the record
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List attendance for the selected date
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

/// Violation commands.
#[derive(Debug, Subcommand)]
pub enum ViolationCommand {
    /// Record a violation on the selected date
    Add {
        /// Student id
        student_id: String,

        /// Violation type from the catalog
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Remark to store with the violation
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Remove a violation record
    Remove {
        /// Violation id
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List violations for the selected date
    List {
        /// List every date instead of the selected one
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

/// Violation type catalog commands.
#[derive(Debug, Subcommand)]
pub enum TypesCommand {
    /// Add a violation type
    Add {
        /// New label
        label: String,
    },

    /// List violation types
    List,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Count over all dates instead of the selected one
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// What to export
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// Export every date instead of the selected one
    #[arg(short, long)]
    pub all: bool,

    /// Output file (defaults to the configured export file name)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Data set selectable for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    /// The student roster
    Students,
    /// Attendance records
    Attendance,
    /// Violation records
    Violations,
    /// Violation counts per type
    Stats,
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_student_command_debug() {
        let cmd = StudentCommand::Add {
            name: "Andi".to_string(),
            class: "7A".to_string(),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Andi"));
        assert!(debug_str.contains("7A"));
    }

    #[test]
    fn test_dataset_value_names() {
        let names: Vec<String> = Dataset::value_variants()
            .iter()
            .filter_map(|d| d.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["students", "attendance", "violations", "stats"]);
    }
}
