//! `rollbook` - Classroom attendance and violation records
//!
//! This library keeps a roll of students, their daily attendance, and
//! disciplinary violations in a local key-value store, with derived
//! per-type violation counts and CSV export.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod storage;
pub mod views;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{export_csv, to_csv, ExportOutcome};
pub use ledger::{Answer, CommandOutcome, Confirm, Ledger};
pub use logging::init_logging;
pub use model::{AttendanceRecord, Student, Violation, ViolationTypeCatalog};
pub use storage::{Store, StoreStats, WriteOutcome};
pub use views::ViolationStats;
