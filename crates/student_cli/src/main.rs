//! Command-line front end for the student store.
//!
//! # Responsibility
//! - Parse flags/env into store and logging configuration.
//! - Drive one repository operation per invocation, or the `demo` sequence.
//!
//! # Invariants
//! - Errors propagate to `main`; nothing is printed-and-ignored.
//! - The store is closed explicitly before a successful exit.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use student_core::{
    core_version, default_log_level, init_logging, RecordStore, SqliteStudentRepository, Student,
    StudentId, StudentRepository,
};

#[derive(Debug, Parser)]
#[command(name = "students", version, about = "Create, read, update and delete student records")]
struct Cli {
    /// SQLite database file. Required by every command except `demo`, which
    /// uses a throwaway in-memory database when this is omitted.
    #[arg(long, env = "STUDENTS_DB", global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "STUDENTS_LOG_LEVEL", global = true, default_value = default_log_level())]
    log_level: String,

    /// Absolute directory for rolling log files. Logs go to stderr when omitted.
    #[arg(long, env = "STUDENTS_LOG_DIR", global = true)]
    log_dir: Option<String>,

    /// Print students as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert a new student and print it with its assigned id.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i32,
    },
    /// Print one student.
    Get { id: StudentId },
    /// Print every student.
    List,
    /// Change the name and/or age of an existing student.
    Update {
        id: StudentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        age: Option<i32>,
    },
    /// Remove a student. Removing a missing id is not an error.
    Delete { id: StudentId },
    /// Run the create/read/update/list/delete walkthrough.
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    check_db_target(&cli)?;
    init_logging(&cli.log_level, cli.log_dir.as_deref()).map_err(|err| anyhow!(err))?;
    info!(
        "event=cli_start module=cli status=ok version={} persistent={}",
        core_version(),
        cli.db.is_some()
    );

    let store = match &cli.db {
        Some(path) => RecordStore::open(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => RecordStore::open_in_memory().context("failed to open in-memory database")?,
    };

    run(&cli, &SqliteStudentRepository::new(&store))?;
    store.close().context("failed to close database")?;
    Ok(())
}

fn check_db_target(cli: &Cli) -> Result<()> {
    if cli.db.is_none() && !matches!(cli.command, Command::Demo) {
        bail!("--db (or STUDENTS_DB) is required; only `demo` runs against an in-memory database");
    }
    Ok(())
}

fn run(cli: &Cli, repo: &impl StudentRepository) -> Result<()> {
    let printer = Printer { json: cli.json };

    match &cli.command {
        Command::Create { name, age } => {
            let mut student = Student::new(name.as_str(), *age);
            repo.create(&mut student)?;
            printer.student(&student)?;
        }
        Command::Get { id } => match repo.get_by_id(*id)? {
            Some(student) => printer.student(&student)?,
            None => bail!("student not found: {id}"),
        },
        Command::List => {
            for student in repo.get_all()? {
                printer.student(&student)?;
            }
        }
        Command::Update { id, name, age } => {
            if name.is_none() && age.is_none() {
                bail!("update needs --name and/or --age");
            }
            let mut student = repo
                .get_by_id(*id)?
                .ok_or_else(|| anyhow!("student not found: {id}"))?;
            if let Some(name) = name {
                student.name = name.clone();
            }
            if let Some(age) = age {
                student.age = *age;
            }
            repo.update(&student)?;
            printer.student(&student)?;
        }
        Command::Delete { id } => {
            let removed = repo.delete(*id)?;
            println!("deleted={removed} id={id}");
        }
        Command::Demo => demo(repo, &printer)?,
    }

    Ok(())
}

fn demo(repo: &impl StudentRepository, printer: &Printer) -> Result<()> {
    let mut alice = Student::new("Alice", 22);
    let mut bob = Student::new("Bob", 24);
    repo.create(&mut alice)?;
    repo.create(&mut bob)?;
    let alice_id = alice.id.context("create did not assign an id")?;
    let bob_id = bob.id.context("create did not assign an id")?;

    println!("Reading student with ID {alice_id}:");
    let mut student = repo
        .get_by_id(alice_id)?
        .ok_or_else(|| anyhow!("student not found: {alice_id}"))?;
    printer.student(&student)?;

    println!("Updating student with ID {alice_id}:");
    student.age = 25;
    repo.update(&student)?;

    println!("All students:");
    for student in repo.get_all()? {
        printer.student(&student)?;
    }

    println!("Deleting student with ID {bob_id}:");
    repo.delete(bob_id)?;
    Ok(())
}

struct Printer {
    json: bool,
}

impl Printer {
    fn student(&self, student: &Student) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(student)?);
        } else {
            println!("{student}");
        }
        Ok(())
    }
}
