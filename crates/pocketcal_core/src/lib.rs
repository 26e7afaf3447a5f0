//! Core domain logic for PocketCal.
//! This crate owns the event model, query engines, reminder timing and the
//! backup format; UI and FFI layers only translate inputs and outputs.

pub mod backup;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod reminder;
pub mod repo;
pub mod service;

pub use backup::archive::{backup_file_name, list_backup_files, BackupError};
pub use backup::codec::{decode_line, encode_line, LineDecodeError, LineEncodeError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::event::{
    Category, EventId, EventRecord, EventStatus, EventValidationError, ReminderOffset,
    StoredEvent, UnknownLabel,
};
pub use query::bucket::{bucket_events, HomeBuckets};
pub use query::filter::{
    filter_events, CategoryFilter, DateFilter, EventQuery, QueryError, QueryMode, QueryParams,
};
pub use reminder::scheduler::{
    InMemoryReminderScheduler, ReminderRequest, ReminderScheduler, SchedulerError,
};
pub use reminder::trigger::{compute_trigger, compute_trigger_instant, ReminderOutcome};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult, SqliteEventRepository};
pub use service::event_service::{EventService, EventServiceError, RestoreSummary, SavedEvent};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
