//! `rollcall` command-line front end.
//!
//! # Responsibility
//! - Parse commands and wire them to the core services.
//! - Gate destructive commands behind a confirmation prompt.
//! - Render roster, totals and day views as text tables.

mod prompt;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use prompt::{AssumeYes, Confirm, StdinConfirm};
use rollcall_core::db::open_db;
use rollcall_core::{
    default_log_level, init_logging, parse_status, AttendanceLedger, KvAttendanceRepository,
    KvStudentRepository, LoginRequest, SessionGate, SqliteStore, StorageWatcher,
    StudentDirectory, StudentDraft, StudentFilter, StudentId, StudentResolver, TrackerConfig,
};
use rusqlite::Connection;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "rollcall.toml";

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "Local student attendance tracker")]
struct Cli {
    /// TOML config file; `rollcall.toml` in the working directory is used when present.
    #[arg(long, env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,
    /// Database file, overriding the config.
    #[arg(long, env = "ROLLCALL_DB")]
    db: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
    /// Absolute directory for log files; logging is off without one.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Skip confirmation prompts.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a session (cosmetic; any non-empty pair is accepted).
    Login {
        /// Defaults to the remembered username.
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Remember the username for the next login.
        #[arg(long)]
        remember: bool,
        /// Use the demo credentials.
        #[arg(long, conflicts_with_all = ["username", "password"])]
        demo: bool,
    },
    /// Forget the remembered username.
    Logout,
    /// Manage the student roster.
    #[command(subcommand)]
    Student(StudentCommand),
    /// Mark one student present or absent.
    Mark {
        /// Student id, name fragment or `Name - id` label.
        student: String,
        /// `YYYY-MM-DD`; defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// `present` or `absent`.
        #[arg(long, default_value = "present")]
        status: String,
    },
    /// Lifetime totals for every student.
    Totals,
    /// Marks recorded on one date; without a date, the totals view.
    Day { date: Option<String> },
    /// Delete every mark of one student.
    Reset { id: StudentId },
    /// `Name - id` labels accepted by `mark`.
    Suggest,
    /// Ledger ids with no matching student.
    Orphans,
    /// Re-render totals whenever another process changes the store.
    Watch {
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
    Add(StudentFields),
    /// Edit a student; omitted fields keep their current value.
    Update {
        id: StudentId,
        #[command(flatten)]
        fields: StudentFields,
    },
    Delete {
        id: StudentId,
    },
    List {
        #[arg(long)]
        section: Option<String>,
        /// Name or contact fragment.
        #[arg(long)]
        query: Option<String>,
    },
    /// Remove every student and restart ids at 1.
    Clear,
}

#[derive(Args, Debug, Default)]
struct StudentFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    section: Option<String>,
    #[arg(long)]
    salary: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    #[arg(long)]
    joining_date: Option<String>,
}

impl StudentFields {
    fn into_draft(self, base: StudentDraft) -> StudentDraft {
        StudentDraft {
            name: self.name.unwrap_or(base.name),
            contact: self.contact.unwrap_or(base.contact),
            section: self.section.unwrap_or(base.section),
            salary: self.salary.unwrap_or(base.salary),
            joining_date: self.joining_date.unwrap_or(base.joining_date),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    start_logging(&cli, &config);

    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open tracker database `{}`", db_path.display()))?;
    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };

    let app = App {
        conn: &conn,
        sections: config.sections,
        confirm: confirm.as_ref(),
    };
    let mut out = io::stdout().lock();
    app.dispatch(cli.command, &mut out)
}

fn load_config(explicit: Option<&Path>) -> Result<TrackerConfig> {
    if let Some(path) = explicit {
        return Ok(TrackerConfig::load(path)?);
    }
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.is_file() {
        return Ok(TrackerConfig::load(fallback)?);
    }
    Ok(TrackerConfig::default())
}

fn start_logging(cli: &Cli, config: &TrackerConfig) {
    let Some(dir) = cli.log_dir.as_ref().or(config.logging.dir.as_ref()) else {
        return;
    };
    let level = cli
        .log_level
        .as_deref()
        .or(config.logging.level.as_deref())
        .unwrap_or_else(|| default_log_level());
    if let Err(err) = init_logging(level, dir) {
        eprintln!("warning: logging disabled: {err}");
    }
}

struct App<'a> {
    conn: &'a Connection,
    sections: Vec<String>,
    confirm: &'a dyn Confirm,
}

type Directory<'a> = StudentDirectory<KvStudentRepository<SqliteStore<'a>>>;
type Ledger<'a> =
    AttendanceLedger<KvStudentRepository<SqliteStore<'a>>, KvAttendanceRepository<SqliteStore<'a>>>;

impl<'a> App<'a> {
    fn store(&self) -> SqliteStore<'a> {
        SqliteStore::new(self.conn)
    }

    fn directory(&self) -> Directory<'a> {
        StudentDirectory::new(KvStudentRepository::new(self.store()), self.sections.clone())
    }

    fn ledger(&self) -> Ledger<'a> {
        AttendanceLedger::new(
            KvStudentRepository::new(self.store()),
            KvAttendanceRepository::new(self.store()),
        )
    }

    fn dispatch(&self, command: Command, out: &mut impl Write) -> Result<()> {
        match command {
            Command::Login {
                username,
                password,
                remember,
                demo,
            } => self.login(username, password, remember, demo, out),
            Command::Logout => {
                SessionGate::new(self.store()).logout()?;
                writeln!(out, "Logged out.")?;
                Ok(())
            }
            Command::Student(command) => self.student(command, out),
            Command::Mark {
                student,
                date,
                status,
            } => {
                let date = date.unwrap_or_else(today);
                let status = parse_status(&status)?;
                let marked = self.ledger().mark_for_input(&student, &date, status)?;
                writeln!(
                    out,
                    "{} ({}) - {} saved for {}",
                    marked.name,
                    marked.id,
                    status.label(),
                    date.trim()
                )?;
                Ok(())
            }
            Command::Totals => Ok(render::totals(out, &self.ledger().totals_table())?),
            Command::Day { date: None } => Ok(render::totals(out, &self.ledger().totals_table())?),
            Command::Day { date: Some(date) } => {
                let entries = self.ledger().day_view(&date)?;
                Ok(render::day(out, date.trim(), &entries)?)
            }
            Command::Reset { id } => self.reset(id, out),
            Command::Suggest => {
                let resolver = StudentResolver::new(KvStudentRepository::new(self.store()));
                for label in resolver.suggestions() {
                    writeln!(out, "{label}")?;
                }
                Ok(())
            }
            Command::Orphans => {
                for key in self.ledger().orphan_keys() {
                    writeln!(out, "{key}")?;
                }
                Ok(())
            }
            Command::Watch { interval_ms } => self.watch(Duration::from_millis(interval_ms), out),
        }
    }

    fn login(
        &self,
        username: Option<String>,
        password: Option<String>,
        remember: bool,
        demo: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let gate = SessionGate::new(self.store());
        let request = if demo {
            LoginRequest {
                remember,
                ..LoginRequest::demo()
            }
        } else {
            LoginRequest {
                username: username
                    .or_else(|| gate.remembered_user())
                    .unwrap_or_default(),
                password: password.unwrap_or_default(),
                remember,
            }
        };
        let session = gate.login(&request)?;
        writeln!(out, "Welcome, {}.", session.username)?;
        render::totals(out, &self.ledger().totals_table())?;
        Ok(())
    }

    fn student(&self, command: StudentCommand, out: &mut impl Write) -> Result<()> {
        let directory = self.directory();
        match command {
            StudentCommand::Add(fields) => {
                let student = directory.create(&fields.into_draft(StudentDraft::default()))?;
                writeln!(out, "Added {}.", student.label())?;
            }
            StudentCommand::Update { id, fields } => {
                let Some(current) = directory.get(id) else {
                    bail!(rollcall_core::DirectoryError::NotFound(id));
                };
                let base = StudentDraft {
                    name: current.name,
                    contact: current.contact,
                    section: current.section,
                    salary: current.salary.to_string(),
                    joining_date: current.joining_date.to_string(),
                };
                let student = directory.update(id, &fields.into_draft(base))?;
                writeln!(out, "Updated {}.", student.label())?;
            }
            StudentCommand::Delete { id } => {
                if !self
                    .confirm
                    .confirm("Are you sure you want to delete this student?")
                {
                    writeln!(out, "Cancelled.")?;
                    return Ok(());
                }
                if directory.delete(id)? {
                    writeln!(out, "Deleted student {id}.")?;
                } else {
                    writeln!(out, "No student with id {id}.")?;
                }
            }
            StudentCommand::List { section, query } => {
                let filter = StudentFilter { section, query };
                let students = directory.list(&filter);
                render::roster(out, &students, &directory.summary(&filter))?;
            }
            StudentCommand::Clear => {
                if !self
                    .confirm
                    .confirm("This will remove all saved students from local device. Continue?")
                {
                    writeln!(out, "Cancelled.")?;
                    return Ok(());
                }
                directory.clear_all()?;
                writeln!(out, "All students removed.")?;
            }
        }
        Ok(())
    }

    fn reset(&self, id: StudentId, out: &mut impl Write) -> Result<()> {
        let who = match self.directory().get(id) {
            Some(student) => format!("{} ({})", student.name, student.id),
            None => format!("student {id}"),
        };
        let message = format!(
            "Reset counts for {who} across all dates? This will delete all day entries for this student."
        );
        if !self.confirm.confirm(&message) {
            writeln!(out, "Cancelled.")?;
            return Ok(());
        }
        let removed = self.ledger().reset_student(id)?;
        writeln!(out, "Removed {removed} entries for {who}.")?;
        render::totals(out, &self.ledger().totals_table())?;
        Ok(())
    }

    fn watch(&self, interval: Duration, out: &mut impl Write) -> Result<()> {
        let mut watcher = StorageWatcher::new(self.conn)?;
        render::totals(out, &self.ledger().totals_table())?;
        out.flush()?;
        loop {
            std::thread::sleep(interval);
            match watcher.poll() {
                Ok(true) => {
                    writeln!(out)?;
                    render::totals(out, &self.ledger().totals_table())?;
                    out.flush()?;
                }
                Ok(false) => {}
                Err(err) => warn!("event=watch_poll module=cli status=error error={err}"),
            }
        }
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}

#[cfg(test)]
mod tests {
    use super::{App, Command, StudentCommand};
    use crate::prompt::{AssumeYes, Confirm};
    use rollcall_core::db::open_db_in_memory;
    use rollcall_core::{
        AttendanceStatus, AttendanceTotals, KeyValueStore, SqliteStore, StoreKey, StudentDraft,
    };
    use rusqlite::Connection;
    use std::cell::RefCell;

    /// Declines every prompt and records what was asked.
    #[derive(Default)]
    struct Decline {
        asked: RefCell<Vec<String>>,
    }

    impl Confirm for Decline {
        fn confirm(&self, message: &str) -> bool {
            self.asked.borrow_mut().push(message.to_string());
            false
        }
    }

    fn app<'a>(conn: &'a Connection, confirm: &'a dyn Confirm) -> App<'a> {
        App {
            conn,
            sections: vec!["A".to_string()],
            confirm,
        }
    }

    fn seed(app: &App<'_>, name: &str) -> u64 {
        let student = app
            .directory()
            .create(&StudentDraft {
                name: name.to_string(),
                contact: "01234567890".to_string(),
                ..StudentDraft::default()
            })
            .unwrap();
        app.ledger()
            .mark_attendance(student.id, "2024-01-10", AttendanceStatus::Present)
            .unwrap();
        student.id
    }

    fn run(app: &App<'_>, command: Command) -> String {
        let mut out = Vec::new();
        app.dispatch(command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn snapshot(conn: &Connection) -> Vec<Option<String>> {
        let store = SqliteStore::new(conn);
        [
            StoreKey::Students,
            StoreKey::StudentsNextId,
            StoreKey::AttendanceRecords,
        ]
        .into_iter()
        .map(|key| store.get(key).unwrap())
        .collect()
    }

    #[test]
    fn declined_prompts_leave_every_collection_untouched() {
        let conn = open_db_in_memory().unwrap();
        let decline = Decline::default();
        let app = app(&conn, &decline);
        let id = seed(&app, "Asha");
        let before = snapshot(&conn);

        for command in [
            Command::Student(StudentCommand::Delete { id }),
            Command::Student(StudentCommand::Clear),
            Command::Reset { id },
        ] {
            assert_eq!(run(&app, command), "Cancelled.\n");
        }

        assert_eq!(snapshot(&conn), before);
        assert_eq!(
            decline.asked.into_inner(),
            vec![
                "Are you sure you want to delete this student?".to_string(),
                "This will remove all saved students from local device. Continue?".to_string(),
                "Reset counts for Asha (1) across all dates? This will delete all day entries for this student."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn accepted_prompts_run_the_destructive_commands() {
        let conn = open_db_in_memory().unwrap();
        let app = app(&conn, &AssumeYes);
        let asha = seed(&app, "Asha");
        seed(&app, "Bilal");

        let reset = run(&app, Command::Reset { id: asha });
        assert!(reset.starts_with("Removed 1 entries for Asha (1).\n"));
        assert_eq!(app.ledger().totals_for(asha), AttendanceTotals::default());

        let deleted = run(&app, Command::Student(StudentCommand::Delete { id: asha }));
        assert_eq!(deleted, "Deleted student 1.\n");
        assert!(app.directory().get(asha).is_none());

        let cleared = run(&app, Command::Student(StudentCommand::Clear));
        assert_eq!(cleared, "All students removed.\n");
        let store = SqliteStore::new(&conn);
        assert_eq!(store.get(StoreKey::Students).unwrap(), None);
        assert_eq!(store.get(StoreKey::StudentsNextId).unwrap(), None);
    }
}
