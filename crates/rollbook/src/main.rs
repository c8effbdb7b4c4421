//! `rollbook` - CLI for classroom attendance and violation records
//!
//! This binary is a thin layer over the `rollbook` library: it loads the
//! ledger, runs one command, and prints the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use rollbook::cli::{
    AttendanceCommand, Cli, Command, ConfigCommand, Dataset, ExportCommand, OutputFormat, Prompt,
    StatsCommand, StudentCommand, TypesCommand, ViolationCommand,
};
use rollbook::model::parse_date;
use rollbook::views::{self, ViolationStats};
use rollbook::{
    export_csv, init_logging, CommandOutcome, Config, Error, ExportOutcome, Ledger, Store,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(e) if e.is_validation() => eprintln!("{e}"),
                _ => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone())?;

    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        other => other,
    };

    let store = Store::open(config.database_path())?;
    if let Command::Status(status_cmd) = &command {
        return handle_status(&store, status_cmd.json);
    }

    let mut ledger = Ledger::load(store, &config);
    if let Some(date) = &cli.date {
        ledger.select_date(parse_date(date)?);
    }

    match command {
        Command::Student(cmd) => handle_student(&mut ledger, cmd),
        Command::Attendance(cmd) => handle_attendance(&mut ledger, cmd),
        Command::Violation(cmd) => handle_violation(&mut ledger, cmd),
        Command::Types(cmd) => handle_types(&mut ledger, cmd),
        Command::Stats(cmd) => handle_stats(&ledger, &cmd),
        Command::Export(cmd) => handle_export(&ledger, &config, &cmd),
        Command::Reset(cmd) => {
            let outcome = ledger.reset_all(&mut Prompt::stdio(cmd.yes));
            report(outcome, "All students, attendance and violations removed.");
            Ok(())
        }
        Command::Status(_) | Command::Config(_) => Ok(()),
    }
}

fn report(outcome: CommandOutcome, applied: &str) {
    match outcome {
        CommandOutcome::Applied => println!("{applied}"),
        CommandOutcome::Declined => println!("Cancelled."),
        CommandOutcome::Unchanged => println!("Nothing to change."),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_student(ledger: &mut Ledger, cmd: StudentCommand) -> anyhow::Result<()> {
    match cmd {
        StudentCommand::Add { name, class } => {
            let student = ledger.add_student(&name, &class)?;
            println!(
                "Added {} ({}) with id {}",
                student.name, student.class, student.id
            );
        }
        StudentCommand::Remove { id, yes } => {
            let outcome = ledger.remove_student(&id, &mut Prompt::stdio(yes));
            report(outcome, "Student and related records removed.");
        }
        StudentCommand::List { query, format } => {
            let students = ledger.filtered_students(&query);
            match format {
                OutputFormat::Json => print_json(&students)?,
                OutputFormat::Plain => {
                    if students.is_empty() {
                        println!("No students.");
                    }
                    for s in students {
                        println!("{:<20} {:<30} {}", s.id, s.name, s.class);
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_attendance(ledger: &mut Ledger, cmd: AttendanceCommand) -> anyhow::Result<()> {
    match cmd {
        AttendanceCommand::Set {
            student_id,
            status,
            note,
        } => {
            if ledger.student(&student_id).is_none() {
                return Err(Error::unknown_student(student_id).into());
            }
            let record = ledger.set_attendance(&student_id, &status, note.as_deref());
            println!(
                "Attendance for {} on {}: {}",
                record.student_id, record.date, record.status
            );
        }
        AttendanceCommand::List { format } => {
            let records = ledger.attendance_for_date();
            let summary = views::attendance_summary(records.iter().copied());
            let rows = views::attendance_rows(ledger.students(), records);
            match format {
                OutputFormat::Json => print_json(&rows)?,
                OutputFormat::Plain => {
                    println!("Attendance on {}", ledger.selected_date());
                    for row in &rows {
                        println!(
                            "  {:<30} {:<6} {:<10} {}",
                            row.name, row.class, row.status, row.note
                        );
                    }
                    if rows.is_empty() {
                        println!("  (none)");
                    } else {
                        let totals: Vec<String> = summary
                            .iter()
                            .map(|(status, count)| format!("{status}: {count}"))
                            .collect();
                        println!("Totals: {}", totals.join(", "));
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_violation(ledger: &mut Ledger, cmd: ViolationCommand) -> anyhow::Result<()> {
    match cmd {
        ViolationCommand::Add {
            student_id,
            kind,
            note,
        } => {
            let violation = ledger.add_violation(&student_id, &kind, note.as_deref())?;
            println!(
                "Recorded '{}' on {} with id {}",
                violation.kind, violation.date, violation.id
            );
        }
        ViolationCommand::Remove { id, yes } => {
            let outcome = ledger.remove_violation(&id, &mut Prompt::stdio(yes));
            report(outcome, "Violation removed.");
        }
        ViolationCommand::List { all, format } => {
            let rows = if all {
                views::violation_rows(ledger.students(), ledger.violations())
            } else {
                views::violation_rows(ledger.students(), ledger.violations_for_date())
            };
            match format {
                OutputFormat::Json => print_json(&rows)?,
                OutputFormat::Plain => {
                    if rows.is_empty() {
                        println!("No violations.");
                    }
                    for row in &rows {
                        println!(
                            "{:<20} {} {:<30} {:<30} {}",
                            row.id, row.date, row.name, row.kind, row.note
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_types(ledger: &mut Ledger, cmd: TypesCommand) -> anyhow::Result<()> {
    match cmd {
        TypesCommand::Add { label } => {
            let outcome = ledger.add_violation_type(&label)?;
            report(outcome, "Violation type added.");
        }
        TypesCommand::List => {
            for label in ledger.catalog().iter() {
                println!("{label}");
            }
        }
    }
    Ok(())
}

fn handle_stats(ledger: &Ledger, cmd: &StatsCommand) -> anyhow::Result<()> {
    let stats = if cmd.all {
        ledger.stats_all_time()
    } else {
        ledger.stats_for_date()
    };
    match cmd.format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Plain => {
            if cmd.all {
                println!("Violations, all dates");
            } else {
                println!("Violations on {}", ledger.selected_date());
            }
            print_stats(&stats);
        }
    }
    Ok(())
}

fn print_stats(stats: &ViolationStats) {
    for (label, count) in stats.iter() {
        println!("  {label:<30} {count:>4}");
    }
    println!("  {:<30} {:>4}", "Total", stats.total());
}

fn handle_export(ledger: &Ledger, config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let path = config.export_path(cmd.output.as_deref());
    let outcome = match cmd.dataset {
        Dataset::Students => export_csv(ledger.students(), &path)?,
        Dataset::Attendance => {
            let rows = if cmd.all {
                views::attendance_rows(ledger.students(), ledger.attendance())
            } else {
                views::attendance_rows(ledger.students(), ledger.attendance_for_date())
            };
            export_csv(&rows, &path)?
        }
        Dataset::Violations => {
            let rows = if cmd.all {
                views::violation_rows(ledger.students(), ledger.violations())
            } else {
                views::violation_rows(ledger.students(), ledger.violations_for_date())
            };
            export_csv(&rows, &path)?
        }
        Dataset::Stats => {
            let stats = if cmd.all {
                ledger.stats_all_time()
            } else {
                ledger.stats_for_date()
            };
            export_csv(&stats.rows(), &path)?
        }
    };

    match outcome {
        ExportOutcome::Empty => println!("Nothing to export."),
        ExportOutcome::Written { path, rows } => {
            println!("Exported {rows} rows to {}", path.display());
        }
    }
    Ok(())
}

fn handle_status(store: &Store, json: bool) -> anyhow::Result<()> {
    let stats = store.stats()?;
    let keys = store.keys()?;
    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "keys": keys,
            "stats": stats,
        });
        print_json(&status)?;
    } else {
        println!("rollbook status");
        println!("---------------");
        println!("Database:      {}", store.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Keys:          {}", keys.join(", "));
        match stats.last_updated {
            Some(at) => println!("Last updated:  {at}"),
            None => println!("Last updated:  never"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Catalog]");
                for label in &config.catalog.default_types {
                    println!("  - {label}");
                }
                println!();
                println!("[Seed]");
                println!("  Demo students:      {}", config.seed.demo_students);
                println!();
                println!("[Export]");
                println!(
                    "  Directory:          {}",
                    config
                        .export
                        .directory
                        .as_ref()
                        .map_or_else(|| ".".to_string(), |d| d.display().to_string())
                );
                println!("  Default file name:  {}", config.export.default_filename);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("validating {}", path.display()))?;
            println!("Configuration is valid: {}", path.display());
        }
    }
    Ok(())
}
