//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level event functions to Dart via FRB.
//! - Translate UI labels and ids into core types and core errors into
//!   envelope messages.
//! - Hold the process-wide pending reminder queue the host hands to the OS.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens its own connection; no connection outlives a call.
//! - Instants cross the boundary as epoch milliseconds (UTC).

use chrono::{DateTime, Local, Utc};
use log::error;
use pocketcal_core::db::open_db;
use pocketcal_core::model::datetime::parse_event_date;
use pocketcal_core::{
    compute_trigger_instant, core_version as core_version_inner,
    init_logging as init_logging_inner, ping as ping_inner, Category, EventId, EventQuery,
    EventRecord, EventService, EventServiceError, EventStatus, InMemoryReminderScheduler,
    QueryMode, QueryParams, ReminderOffset, ReminderRequest, SavedEvent,
    SqliteEventRepository, StoredEvent,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "pocketcal.sqlite3";
const BACKUP_DIR_NAME: &str = "pocketcal_backups";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static BACKUP_DIR: OnceLock<PathBuf> = OnceLock::new();
static REMINDERS: OnceLock<InMemoryReminderScheduler> = OnceLock::new();

type FfiEventService<'conn> =
    EventService<SqliteEventRepository<'conn>, &'static InMemoryReminderScheduler>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Event form fields as entered in the UI.
///
/// Date, time and free-text fields are stored verbatim; only labels are
/// trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:mm`.
    pub time: String,
    /// Category label, e.g. `Project Delivery`.
    pub category: String,
    pub description: String,
    /// Status label; blank means `Pending`.
    pub status: String,
    pub location: String,
    pub contact: String,
}

/// Event projection returned to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventItem {
    pub event_id: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub description: String,
    pub status: String,
    pub location: String,
    pub contact: String,
    /// Reminder offset label chosen at creation.
    pub reminder: String,
}

/// Response envelope for create/update/delete calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventActionResponse {
    pub ok: bool,
    pub event_id: Option<String>,
    /// `scheduled|not_requested|too_late|invalid_input`, empty on failure or
    /// delete.
    pub reminder_status: String,
    /// Trigger instant when a reminder was scheduled.
    pub reminder_at_ms: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EventActionResponse {
    fn saved(message: impl Into<String>, saved: SavedEvent) -> Self {
        Self {
            ok: true,
            event_id: Some(saved.id.to_string()),
            reminder_status: saved.reminder.as_str().to_string(),
            reminder_at_ms: saved.reminder.instant().map(|at| at.timestamp_millis()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            event_id: None,
            reminder_status: String::new(),
            reminder_at_ms: None,
            message: message.into(),
        }
    }
}

/// Query form fields; `mode` is one of `range|year|day|month|none`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQueryRequest {
    pub mode: String,
    /// Category label or `All`; `None` means all categories.
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Response envelope for list-shaped calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListResponse {
    pub ok: bool,
    pub items: Vec<EventItem>,
    pub message: String,
}

/// Home-view buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeBucketsResponse {
    pub ok: bool,
    pub today: Vec<EventItem>,
    pub this_week: Vec<EventItem>,
    pub upcoming: Vec<EventItem>,
    pub message: String,
}

/// Response envelope for backup and restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupResponse {
    pub ok: bool,
    /// Written backup file (create only).
    pub path: Option<String>,
    pub restored: u32,
    pub skipped: u32,
    pub message: String,
}

impl BackupResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            path: None,
            restored: 0,
            skipped: 0,
            message: message.into(),
        }
    }
}

/// Reminder waiting to be handed to the OS alarm facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminderItem {
    pub event_id: String,
    pub trigger_at_ms: i64,
    pub title: String,
    pub body: String,
}

/// Creates an event and schedules its reminder.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - `reminder` is an offset label such as `30 minutes before`; unknown
///   labels fail the call instead of defaulting.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn event_create(input: EventInput, reminder: String) -> EventActionResponse {
    let parsed = to_event_record(&input).and_then(|record| {
        ReminderOffset::from_label(reminder.trim())
            .map(|offset| (record, offset))
            .map_err(|err| err.to_string())
    });
    let (record, offset) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return EventActionResponse::failure(format!("event_create failed: {err}")),
    };

    match with_event_service("event_create", |service| {
        service.create_event(record, offset)
    }) {
        Ok(saved) => EventActionResponse::saved("Event created.", saved),
        Err(err) => EventActionResponse::failure(format!("event_create failed: {err}")),
    }
}

/// Replaces an event's fields and reschedules its reminder.
#[flutter_rust_bridge::frb(sync)]
pub fn event_update(event_id: String, input: EventInput) -> EventActionResponse {
    let parsed = parse_event_id(&event_id).and_then(|id| Ok((id, to_event_record(&input)?)));
    let (id, record) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return EventActionResponse::failure(format!("event_update failed: {err}")),
    };

    match with_event_service("event_update", |service| service.update_event(id, record)) {
        Ok(saved) => EventActionResponse::saved("Event updated.", saved),
        Err(err) => EventActionResponse::failure(format!("event_update failed: {err}")),
    }
}

/// Cancels an event's reminder and deletes it.
#[flutter_rust_bridge::frb(sync)]
pub fn event_delete(event_id: String) -> EventActionResponse {
    let id = match parse_event_id(&event_id) {
        Ok(id) => id,
        Err(err) => return EventActionResponse::failure(format!("event_delete failed: {err}")),
    };

    match with_event_service("event_delete", |service| service.delete_event(id)) {
        Ok(()) => EventActionResponse {
            ok: true,
            event_id: Some(id.to_string()),
            reminder_status: String::new(),
            reminder_at_ms: None,
            message: "Event deleted.".to_string(),
        },
        Err(err) => EventActionResponse::failure(format!("event_delete failed: {err}")),
    }
}

/// Runs the category + date-mode filter over all stored events.
///
/// # FFI contract
/// - Items are sorted ascending by date.
/// - Missing or malformed parameters for the selected mode fail the call.
#[flutter_rust_bridge::frb(sync)]
pub fn event_query(request: EventQueryRequest) -> EventListResponse {
    let query = QueryMode::from_label(&request.mode)
        .map_err(|err| err.to_string())
        .and_then(|mode| {
            let params = QueryParams {
                category: request.category,
                start_date: request.start_date,
                end_date: request.end_date,
                date: request.date,
                year: request.year,
                month: request.month,
            };
            EventQuery::from_parts(mode, &params).map_err(|err| err.to_string())
        });
    let query = match query {
        Ok(query) => query,
        Err(err) => {
            return EventListResponse {
                ok: false,
                items: Vec::new(),
                message: format!("event_query failed: {err}"),
            };
        }
    };

    match with_event_service("event_query", |service| service.query_events(&query)) {
        Ok(events) => {
            let items = events.iter().map(to_event_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No events.".to_string()
            } else {
                format!("Found {} event(s).", items.len())
            };
            EventListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => EventListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("event_query failed: {err}"),
        },
    }
}

/// Partitions stored events into today / this week / upcoming.
///
/// `today` is `YYYY-MM-DD`; `None` uses the device's current date.
#[flutter_rust_bridge::frb(sync)]
pub fn home_buckets(today: Option<String>) -> HomeBucketsResponse {
    let reference = match today.as_deref() {
        None | Some("") => Ok(Local::now().date_naive()),
        Some(raw) => parse_event_date(raw).ok_or_else(|| format!("invalid date `{raw}`")),
    };
    let result = reference
        .and_then(|day| with_event_service("home_buckets", |service| service.home_buckets(day)));

    match result {
        Ok(buckets) => HomeBucketsResponse {
            ok: true,
            message: format!("{} event(s) ahead.", buckets.len()),
            today: buckets.today.iter().map(to_event_item).collect(),
            this_week: buckets.this_week.iter().map(to_event_item).collect(),
            upcoming: buckets.upcoming.iter().map(to_event_item).collect(),
        },
        Err(err) => HomeBucketsResponse {
            ok: false,
            today: Vec::new(),
            this_week: Vec::new(),
            upcoming: Vec::new(),
            message: format!("home_buckets failed: {err}"),
        },
    }
}

/// Writes every stored event to a new timestamped file in the backup
/// directory.
#[flutter_rust_bridge::frb(sync)]
pub fn backup_create() -> BackupResponse {
    let dir = resolve_backup_dir();
    let taken_at = Local::now().naive_local();

    match with_event_service("backup_create", |service| {
        service.create_backup(&dir, taken_at)
    }) {
        Ok(path) => BackupResponse {
            ok: true,
            path: Some(path.display().to_string()),
            restored: 0,
            skipped: 0,
            message: "Backup created.".to_string(),
        },
        Err(err) => BackupResponse::failure(format!("backup_create failed: {err}")),
    }
}

/// Replaces the whole store with the events of a backup file.
///
/// # FFI contract
/// - A file without any usable line fails the call and keeps current data.
/// - Pending reminders of replaced events are dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn backup_restore(path: String) -> BackupResponse {
    let path = PathBuf::from(path.trim());

    match with_event_service("backup_restore", |service| {
        service.restore_from_file(&path)
    }) {
        Ok(summary) => BackupResponse {
            ok: true,
            path: Some(path.display().to_string()),
            restored: to_count(summary.restored),
            skipped: to_count(summary.skipped),
            message: format!("Restored {} event(s).", summary.restored),
        },
        Err(err) => BackupResponse::failure(format!("backup_restore failed: {err}")),
    }
}

/// Returns reminders scheduled in this process, earliest first.
#[flutter_rust_bridge::frb(sync)]
pub fn pending_reminders() -> Vec<PendingReminderItem> {
    reminders()
        .pending()
        .iter()
        .map(to_pending_reminder_item)
        .collect()
}

/// Removes and returns reminders due at or before now, earliest first.
///
/// Hosts without an OS alarm facility poll this to deliver notifications.
#[flutter_rust_bridge::frb(sync)]
pub fn take_due_reminders() -> Vec<PendingReminderItem> {
    reminders()
        .take_due(Utc::now())
        .iter()
        .map(to_pending_reminder_item)
        .collect()
}

/// Computes a reminder trigger in the device zone without storing anything.
///
/// Returns `None` when no reminder would fire (no offset, too late or bad
/// input).
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_trigger_ms(date: String, time: String, reminder: String) -> Option<i64> {
    compute_trigger_instant(&date, &time, reminder.trim())
        .map(|at: DateTime<Utc>| at.timestamp_millis())
}

fn with_event_service<T>(
    operation: &'static str,
    f: impl FnOnce(&FfiEventService<'_>) -> Result<T, EventServiceError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("event DB open failed: {err}"))?;
    let service = EventService::new(SqliteEventRepository::new(&conn), reminders());
    f(&service).map_err(|err| {
        error!("event=ffi_call module=ffi status=error op={operation} error={err}");
        err.to_string()
    })
}

fn reminders() -> &'static InMemoryReminderScheduler {
    REMINDERS.get_or_init(InMemoryReminderScheduler::new)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| env_path("POCKETCAL_DB_PATH").unwrap_or_else(|| temp_path(DB_FILE_NAME)))
        .clone()
}

fn resolve_backup_dir() -> PathBuf {
    BACKUP_DIR
        .get_or_init(|| {
            env_path("POCKETCAL_BACKUP_DIR").unwrap_or_else(|| temp_path(BACKUP_DIR_NAME))
        })
        .clone()
}

fn env_path(name: &str) -> Option<PathBuf> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

fn temp_path(name: impl AsRef<Path>) -> PathBuf {
    std::env::temp_dir().join(name)
}

fn parse_event_id(raw: &str) -> Result<EventId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid event id `{raw}`"))
}

fn to_event_record(input: &EventInput) -> Result<EventRecord, String> {
    let category = Category::from_label(input.category.trim()).map_err(|err| err.to_string())?;
    let status = match input.status.trim() {
        "" => EventStatus::Pending,
        label => EventStatus::from_label(label).map_err(|err| err.to_string())?,
    };

    Ok(
        EventRecord::new(input.date.as_str(), input.time.as_str(), category)
            .with_description(input.description.as_str())
            .with_status(status)
            .with_location(input.location.as_str())
            .with_contact(input.contact.as_str()),
    )
}

fn to_event_item(event: &StoredEvent) -> EventItem {
    let record = &event.record;
    EventItem {
        event_id: event.id.to_string(),
        date: record.date.clone(),
        time: record.time.clone(),
        category: record.category.label().to_string(),
        description: record.description.clone(),
        status: record.status.label().to_string(),
        location: record.location.clone(),
        contact: record.contact.clone(),
        reminder: event.reminder.label().to_string(),
    }
}

fn to_pending_reminder_item(request: &ReminderRequest) -> PendingReminderItem {
    PendingReminderItem {
        event_id: request.event_id.to_string(),
        trigger_at_ms: request.trigger_at.timestamp_millis(),
        title: request.title.clone(),
        body: request.body.clone(),
    }
}

fn to_count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        backup_create, backup_restore, core_version, event_create, event_delete, event_query,
        event_update, home_buckets, init_logging, pending_reminders, ping, reminder_trigger_ms,
        EventInput, EventQueryRequest,
    };
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use std::time::{SystemTime, UNIX_EPOCH};

    // Calls share one database file; restore replaces it wholesale.
    static DB_GUARD: Mutex<()> = Mutex::new(());

    fn lock_db() -> MutexGuard<'static, ()> {
        DB_GUARD.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn input(date: &str, category: &str, description: &str) -> EventInput {
        EventInput {
            date: date.to_string(),
            time: "10:00".to_string(),
            category: category.to_string(),
            description: description.to_string(),
            status: String::new(),
            location: String::new(),
            contact: String::new(),
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn event_create_schedules_future_reminder() {
        let _guard = lock_db();
        let token = unique_token("create");
        let created = event_create(
            input("2999-01-01", "Meeting", &token),
            "1 hour before".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.reminder_status, "scheduled");
        let event_id = created.event_id.expect("create should return event_id");

        let pending = pending_reminders();
        let reminder = pending
            .iter()
            .find(|item| item.event_id == event_id)
            .expect("reminder should be pending");
        assert_eq!(Some(reminder.trigger_at_ms), created.reminder_at_ms);
        assert_eq!(reminder.title, "Reminder: Meeting");

        let deleted = event_delete(event_id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert!(pending_reminders()
            .iter()
            .all(|item| item.event_id != event_id));
    }

    #[test]
    fn event_create_rejects_unknown_labels() {
        let bad_reminder = event_create(
            input("2999-01-01", "Meeting", "x"),
            "2 minutes before".to_string(),
        );
        assert!(!bad_reminder.ok);
        assert!(bad_reminder.message.contains("reminder offset"));

        let bad_category = event_create(input("2999-01-01", "Party", "x"), "None".to_string());
        assert!(!bad_category.ok);
        assert!(bad_category.message.contains("category"));
    }

    #[test]
    fn event_update_and_query_roundtrip() {
        let _guard = lock_db();
        let token = unique_token("update");
        let created = event_create(input("2999-03-01", "Exam", "draft"), "None".to_string());
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.reminder_status, "not_requested");
        let event_id = created.event_id.expect("create should return event_id");

        let updated = event_update(event_id.clone(), input("2999-03-02", "Exam", &token));
        assert!(updated.ok, "{}", updated.message);

        let response = event_query(EventQueryRequest {
            mode: "day".to_string(),
            category: Some("Exam".to_string()),
            date: Some("2999-03-02".to_string()),
            ..EventQueryRequest::default()
        });
        assert!(response.ok, "{}", response.message);
        assert!(response
            .items
            .iter()
            .any(|item| item.event_id == event_id && item.description == token));

        assert!(event_delete(event_id).ok);
    }

    #[test]
    fn event_create_keeps_free_text_and_rejects_padded_dates() {
        let _guard = lock_db();
        let padded_date = event_create(input(" 2999-01-01", "Meeting", "x"), "None".to_string());
        assert!(!padded_date.ok);
        assert!(padded_date.message.contains("date"));

        let mut padded_time = input("2999-01-01", "Meeting", "x");
        padded_time.time = "10:00 ".to_string();
        assert!(!event_create(padded_time, "None".to_string()).ok);

        let token = format!(" {} ", unique_token("padded"));
        let mut padded_text = input("2999-07-07", "Meeting", &token);
        padded_text.location = "  Room 4 ".to_string();
        let created = event_create(padded_text, "None".to_string());
        assert!(created.ok, "{}", created.message);
        let event_id = created.event_id.expect("create should return event_id");

        let response = event_query(EventQueryRequest {
            mode: "day".to_string(),
            date: Some("2999-07-07".to_string()),
            ..EventQueryRequest::default()
        });
        let item = response
            .items
            .iter()
            .find(|item| item.event_id == event_id)
            .expect("created event should be listed");
        assert_eq!(item.description, token);
        assert_eq!(item.location, "  Room 4 ");

        assert!(event_delete(event_id).ok);
    }

    #[test]
    fn event_query_reports_missing_range_bound() {
        let response = event_query(EventQueryRequest {
            mode: "range".to_string(),
            start_date: Some("2024-01-01".to_string()),
            ..EventQueryRequest::default()
        });
        assert!(!response.ok);
        assert!(response.message.contains("end_date"));
    }

    #[test]
    fn event_delete_rejects_malformed_and_unknown_ids() {
        assert!(!event_delete("not-a-uuid".to_string()).ok);
        let missing = event_delete("00000000-0000-4000-8000-000000000000".to_string());
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
    }

    #[test]
    fn home_buckets_rejects_malformed_reference_day() {
        let response = home_buckets(Some("2024-7-1".to_string()));
        assert!(!response.ok);
        assert!(!home_buckets(Some(" 2024-07-01".to_string())).ok);
    }

    #[test]
    fn home_buckets_message_counts_every_bucket() {
        let _guard = lock_db();
        let response = home_buckets(Some("2000-01-01".to_string()));
        assert!(response.ok, "{}", response.message);
        let total = response.today.len() + response.this_week.len() + response.upcoming.len();
        assert_eq!(response.message, format!("{total} event(s) ahead."));
    }

    #[test]
    fn backup_create_then_restore_keeps_events() {
        let _guard = lock_db();
        let token = unique_token("backup");
        let created = event_create(input("2999-05-05", "Other", &token), "None".to_string());
        assert!(created.ok, "{}", created.message);

        let backup = backup_create();
        assert!(backup.ok, "{}", backup.message);
        let path = backup.path.expect("backup should return path");

        let restored = backup_restore(path);
        assert!(restored.ok, "{}", restored.message);
        assert!(restored.restored >= 1);

        let response = event_query(EventQueryRequest {
            mode: "none".to_string(),
            ..EventQueryRequest::default()
        });
        assert!(response.items.iter().any(|item| item.description == token));
    }

    #[test]
    fn backup_restore_of_unusable_file_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("events_backup_20000101_000000.txt");
        std::fs::write(&path, "not a backup\n").expect("write file");

        let response = backup_restore(path.display().to_string());
        assert!(!response.ok);
        assert!(response.message.contains("no valid events"));
    }

    #[test]
    fn reminder_trigger_ms_collapses_outcomes() {
        assert!(reminder_trigger_ms(
            "2999-01-01".to_string(),
            "10:00".to_string(),
            "At event time".to_string()
        )
        .is_some());
        assert_eq!(
            reminder_trigger_ms(
                "2999-01-01".to_string(),
                "10:00".to_string(),
                "None".to_string()
            ),
            None
        );
        assert_eq!(
            reminder_trigger_ms(
                " 2999-01-01".to_string(),
                "10:00".to_string(),
                "At event time".to_string()
            ),
            None
        );
    }
}
