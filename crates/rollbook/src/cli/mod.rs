//! Command-line interface for rollbook.
//!
//! This module provides the CLI structure and the terminal confirmation
//! prompt used by the `rollbook` binary.

mod commands;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AttendanceCommand, ConfigCommand, Dataset, ExportCommand, OutputFormat, ResetCommand,
    StatsCommand, StatusCommand, StudentCommand, TypesCommand, ViolationCommand,
};

use crate::ledger::Confirm;

/// rollbook - Classroom attendance and violation records
///
/// Keeps a roll of students, their daily attendance, and disciplinary
/// violations in a local database, with per-type violation counts and CSV
/// export.
#[derive(Debug, Parser)]
#[command(name = "rollbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Date to record and report on (YYYY-MM-DD, defaults to today)
    #[arg(short, long, global = true, value_name = "DATE")]
    pub date: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage students
    #[command(subcommand)]
    Student(StudentCommand),

    /// Record and list attendance
    #[command(subcommand)]
    Attendance(AttendanceCommand),

    /// Record, remove and list violations
    #[command(subcommand)]
    Violation(ViolationCommand),

    /// Manage the violation type catalog
    #[command(subcommand)]
    Types(TypesCommand),

    /// Show violation counts per type
    Stats(StatsCommand),

    /// Export records to CSV
    Export(ExportCommand),

    /// Delete all students, attendance and violations
    Reset(ResetCommand),

    /// Show database status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Confirmation by a `y/N` question on a terminal.
///
/// With `assume_yes` set the question is skipped. Anything other than `y` or
/// `yes` (case-insensitive), including a read failure, counts as no.
#[derive(Debug)]
pub struct Prompt<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl Prompt<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stdin, asking on stderr.
    #[must_use]
    pub fn stdio(assume_yes: bool) -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr(), assume_yes)
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Prompt with custom input and output.
    pub fn new(input: R, output: W, assume_yes: bool) -> Self {
        Self {
            input,
            output,
            assume_yes,
        }
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if write!(self.output, "{prompt} [y/N] ").is_err() || self.output.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if self.input.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
