//! Command-line front end over the PocketCal core.
//!
//! # Responsibility
//! - Drive the event service against a database file for scripting and
//!   local sanity checks.
//! - Print reminders the service would hand to the OS; this binary does not
//!   deliver them.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use pocketcal_core::db::open_db;
use pocketcal_core::model::datetime::parse_event_date;
use pocketcal_core::{
    core_version, default_log_level, init_logging, list_backup_files, Category, EventQuery,
    EventRecord, EventService, EventStatus, InMemoryReminderScheduler, QueryMode, QueryParams,
    ReminderOffset, ReminderOutcome, SqliteEventRepository, StoredEvent,
};
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "pocketcal.sqlite3";
const BACKUP_DIR_NAME: &str = "pocketcal_backups";

#[derive(Parser)]
#[command(name = "pocketcal")]
#[command(about = "Manage PocketCal events, reminders and backups")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "POCKETCAL_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and resolved paths
    Info,
    /// Create an event and schedule its reminder
    Add {
        /// Event date (YYYY-MM-DD)
        date: String,

        /// Event time (HH:mm, 24-hour)
        time: String,

        /// Category label, e.g. "Project Delivery"
        #[arg(short, long)]
        category: String,

        /// Free-text description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Status label
        #[arg(short, long, default_value = "Pending")]
        status: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long, default_value = "")]
        contact: String,

        /// Reminder label, e.g. "30 minutes before"
        #[arg(short, long, default_value = "None")]
        reminder: String,
    },
    /// Filter events by category and date mode
    Query {
        /// range | year | day | month | none
        #[arg(short, long, default_value = "none")]
        mode: String,

        /// Category label or "All"
        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Exact day for `day` mode (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Four-digit year for `year` mode
        #[arg(long)]
        year: Option<String>,

        /// Two-digit month for `month` mode
        #[arg(long)]
        month: Option<String>,
    },
    /// Show today / this week / upcoming
    Home {
        /// Reference day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<String>,
    },
    /// Write all events to a timestamped backup file
    Backup {
        #[arg(long, env = "POCKETCAL_BACKUP_DIR")]
        dir: Option<PathBuf>,

        /// List existing backups instead of writing one
        #[arg(long)]
        list: bool,
    },
    /// Replace all events with the contents of a backup file
    Restore { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir).context("failed to initialize logging")?;
    }

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));

    match cli.command {
        Commands::Info => {
            println!("pocketcal_core version={}", core_version());
            println!("db={}", db_path.display());
            Ok(())
        }
        Commands::Add {
            date,
            time,
            category,
            description,
            status,
            location,
            contact,
            reminder,
        } => {
            let record = EventRecord::new(date, time, Category::from_label(&category)?)
                .with_description(description)
                .with_status(EventStatus::from_label(&status)?)
                .with_location(location)
                .with_contact(contact);
            let offset = ReminderOffset::from_label(&reminder)?;
            run_add(&db_path, record, offset)
        }
        Commands::Query {
            mode,
            category,
            from,
            to,
            date,
            year,
            month,
        } => {
            let params = QueryParams {
                category,
                start_date: from,
                end_date: to,
                date,
                year,
                month,
            };
            let query = EventQuery::from_parts(QueryMode::from_label(&mode)?, &params)?;
            run_query(&db_path, &query)
        }
        Commands::Home { today } => {
            let today = match today {
                Some(raw) => parse_event_date(&raw)
                    .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))?,
                None => Local::now().date_naive(),
            };
            run_home(&db_path, today)
        }
        Commands::Backup { dir, list } => {
            let dir = dir.unwrap_or_else(|| std::env::temp_dir().join(BACKUP_DIR_NAME));
            if list {
                for path in list_backup_files(&dir)? {
                    println!("{}", path.display());
                }
                return Ok(());
            }
            run_backup(&db_path, &dir)
        }
        Commands::Restore { path } => run_restore(&db_path, &path),
    }
}

fn run_add(db_path: &Path, record: EventRecord, offset: ReminderOffset) -> Result<()> {
    let conn = open_db(db_path)?;
    let service = EventService::new(
        SqliteEventRepository::new(&conn),
        InMemoryReminderScheduler::new(),
    );

    let saved = service.create_event(record, offset)?;
    println!("created {}", saved.id);
    match saved.reminder {
        ReminderOutcome::Scheduled(_) => {
            for request in service.scheduler().pending() {
                println!(
                    "reminder at {}: {} | {}",
                    request.trigger_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    request.title,
                    request.body
                );
            }
        }
        ReminderOutcome::NotRequested => {}
        other => println!("reminder not scheduled ({})", other.as_str()),
    }
    Ok(())
}

fn run_query(db_path: &Path, query: &EventQuery) -> Result<()> {
    let conn = open_db(db_path)?;
    let service = EventService::new(
        SqliteEventRepository::new(&conn),
        InMemoryReminderScheduler::new(),
    );

    let events = service.query_events(query)?;
    if events.is_empty() {
        println!("No events.");
    }
    for event in &events {
        print_event(event);
    }
    Ok(())
}

fn run_home(db_path: &Path, today: chrono::NaiveDate) -> Result<()> {
    let conn = open_db(db_path)?;
    let service = EventService::new(
        SqliteEventRepository::new(&conn),
        InMemoryReminderScheduler::new(),
    );

    let buckets = service.home_buckets(today)?;
    for (title, events) in [
        ("Today", &buckets.today),
        ("This week", &buckets.this_week),
        ("Upcoming", &buckets.upcoming),
    ] {
        println!("{title} ({})", events.len());
        for event in events {
            print_event(event);
        }
    }
    Ok(())
}

fn run_backup(db_path: &Path, dir: &Path) -> Result<()> {
    let conn = open_db(db_path)?;
    let service = EventService::new(
        SqliteEventRepository::new(&conn),
        InMemoryReminderScheduler::new(),
    );

    let path = service.create_backup(dir, Local::now().naive_local())?;
    println!("backup written to {}", path.display());
    Ok(())
}

fn run_restore(db_path: &Path, path: &Path) -> Result<()> {
    let conn = open_db(db_path)?;
    let service = EventService::new(
        SqliteEventRepository::new(&conn),
        InMemoryReminderScheduler::new(),
    );

    let summary = service
        .restore_from_file(path)
        .with_context(|| format!("failed to restore {}", path.display()))?;
    println!(
        "restored {} event(s), skipped {} line(s)",
        summary.restored, summary.skipped
    );
    Ok(())
}

fn print_event(event: &StoredEvent) {
    let record = &event.record;
    println!(
        "  {}  {} {}  {:<16}  {:<11}  {}",
        event.id,
        record.date,
        record.time,
        record.category.label(),
        record.status.label(),
        record.description
    );
}
