//! Event repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and bulk-replace APIs over the `events` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `EventRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `replace_all` is atomic: either every row is replaced or none is.

use crate::db::DbError;
use crate::model::event::{
    Category, EventId, EventRecord, EventStatus, EventValidationError, ReminderOffset,
    StoredEvent,
};
use log::info;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    event_date,
    event_time,
    category,
    description,
    status,
    location,
    contact,
    reminder
FROM events";

const EVENT_INSERT_SQL: &str = "INSERT INTO events (
    uuid,
    event_date,
    event_time,
    category,
    description,
    status,
    location,
    contact,
    reminder
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for event persistence.
pub trait EventRepository {
    fn create_event(&self, event: &StoredEvent) -> RepoResult<EventId>;
    fn update_event(&self, event: &StoredEvent) -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<StoredEvent>>;
    /// Returns every event ordered by date DESC, time DESC.
    fn list_events(&self) -> RepoResult<Vec<StoredEvent>>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
    /// Deletes every event and inserts `events` in one transaction.
    fn replace_all(&self, events: &[StoredEvent]) -> RepoResult<()>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &StoredEvent) -> RepoResult<EventId> {
        insert_event(self.conn, event)?;
        Ok(event.id)
    }

    fn update_event(&self, event: &StoredEvent) -> RepoResult<()> {
        event.record.validate()?;
        let record = &event.record;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                event_date = ?1,
                event_time = ?2,
                category = ?3,
                description = ?4,
                status = ?5,
                location = ?6,
                contact = ?7,
                reminder = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?9;",
            params![
                record.date.as_str(),
                record.time.as_str(),
                category_to_db(record.category),
                record.description.as_str(),
                status_to_db(record.status),
                record.location.as_str(),
                record.contact.as_str(),
                event.reminder.as_key(),
                event.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<StoredEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn list_events(&self) -> RepoResult<Vec<StoredEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL} ORDER BY event_date DESC, event_time DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn replace_all(&self, events: &[StoredEvent]) -> RepoResult<()> {
        for event in events {
            event.record.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM events;", [])?;
        for event in events {
            insert_event(&tx, event)?;
        }
        tx.commit()?;

        info!(
            "event=events_replace module=repo status=ok removed={} inserted={}",
            removed,
            events.len()
        );
        Ok(())
    }
}

fn insert_event(conn: &Connection, event: &StoredEvent) -> RepoResult<()> {
    event.record.validate()?;
    let record = &event.record;

    conn.execute(
        EVENT_INSERT_SQL,
        params![
            event.id.to_string(),
            record.date.as_str(),
            record.time.as_str(),
            category_to_db(record.category),
            record.description.as_str(),
            status_to_db(record.status),
            record.location.as_str(),
            record.contact.as_str(),
            event.reminder.as_key(),
        ],
    )?;
    Ok(())
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<StoredEvent> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in events.uuid"))
    })?;

    let category_text: String = row.get("category")?;
    let category = parse_category(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in events.category"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in events.status"))
    })?;

    let reminder_text: String = row.get("reminder")?;
    let reminder = ReminderOffset::from_key(&reminder_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid reminder `{reminder_text}` in events.reminder"
        ))
    })?;

    let record = EventRecord {
        date: row.get("event_date")?,
        time: row.get("event_time")?,
        category,
        description: row.get("description")?,
        status,
        location: row.get("location")?,
        contact: row.get("contact")?,
    };
    record
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("event {id}: {err}")))?;

    Ok(StoredEvent::with_id(id, record, reminder))
}

fn category_to_db(category: Category) -> &'static str {
    match category {
        Category::Appointment => "appointment",
        Category::Meeting => "meeting",
        Category::ProjectDelivery => "project_delivery",
        Category::Exam => "exam",
        Category::Other => "other",
    }
}

fn parse_category(value: &str) -> Option<Category> {
    Category::ALL
        .into_iter()
        .find(|category| category_to_db(*category) == value)
}

fn status_to_db(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Pending => "pending",
        EventStatus::InProgress => "in_progress",
        EventStatus::Completed => "completed",
        EventStatus::Cancelled => "cancelled",
    }
}

fn parse_status(value: &str) -> Option<EventStatus> {
    EventStatus::ALL
        .into_iter()
        .find(|status| status_to_db(*status) == value)
}
