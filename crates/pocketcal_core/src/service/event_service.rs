//! Event use-case service.
//!
//! # Responsibility
//! - Orchestrate repository writes with reminder scheduling.
//! - Serve filtered queries and home buckets from the full event list.
//! - Create and restore backup files.
//!
//! # Invariants
//! - A reminder is only scheduled after its event is persisted.
//! - A reminder is cancelled before its event is deleted or updated.
//! - A create or update that fails leaves the stored row as it was.
//! - Restore leaves the store untouched when the backup has no usable event.

use crate::backup::archive::{read_backup_file, write_backup_file, BackupError};
use crate::backup::codec::{decode_document, encode_document};
use crate::model::event::{EventId, EventRecord, ReminderOffset, StoredEvent};
use crate::query::bucket::{bucket_events, HomeBuckets};
use crate::query::filter::{filter_events, EventQuery};
use crate::reminder::scheduler::{ReminderRequest, ReminderScheduler, SchedulerError};
use crate::reminder::trigger::{compute_trigger, ReminderOutcome};
use crate::repo::event_repo::{EventRepository, RepoError};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Service error for event use-cases.
#[derive(Debug)]
pub enum EventServiceError {
    /// Target event does not exist.
    EventNotFound(EventId),
    Repo(RepoError),
    Scheduler(SchedulerError),
    Backup(BackupError),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Scheduler(err) => write!(f, "{err}"),
            Self::Backup(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EventNotFound(_) => None,
            Self::Repo(err) => Some(err),
            Self::Scheduler(err) => Some(err),
            Self::Backup(err) => Some(err),
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<SchedulerError> for EventServiceError {
    fn from(value: SchedulerError) -> Self {
        Self::Scheduler(value)
    }
}

impl From<BackupError> for EventServiceError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

pub type ServiceResult<T> = Result<T, EventServiceError>;

/// Result of a write that may (re)schedule a reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedEvent {
    pub id: EventId,
    pub reminder: ReminderOutcome,
}

/// Result of a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    /// Lines discarded by the codec plus records failing validation.
    pub skipped: usize,
}

/// Event service facade over an injected repository and scheduler.
///
/// Event date/time values are interpreted in `tz`; `Local` by default.
pub struct EventService<R: EventRepository, S: ReminderScheduler, Tz: TimeZone = Local> {
    repo: R,
    scheduler: S,
    tz: Tz,
}

impl<R: EventRepository, S: ReminderScheduler> EventService<R, S, Local> {
    /// Creates a service that reads wall-clock values in the device zone.
    pub fn new(repo: R, scheduler: S) -> Self {
        Self::with_time_zone(repo, scheduler, Local)
    }
}

impl<R: EventRepository, S: ReminderScheduler, Tz: TimeZone> EventService<R, S, Tz> {
    pub fn with_time_zone(repo: R, scheduler: S, tz: Tz) -> Self {
        Self {
            repo,
            scheduler,
            tz,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Persists a new event, then schedules its reminder.
    pub fn create_event(
        &self,
        record: EventRecord,
        reminder: ReminderOffset,
    ) -> ServiceResult<SavedEvent> {
        self.create_event_at(record, reminder, Utc::now())
    }

    /// [`Self::create_event`] with an explicit reference instant.
    ///
    /// # Errors
    /// - `Scheduler` when the reminder cannot be scheduled; the new row is
    ///   deleted again.
    pub fn create_event_at(
        &self,
        record: EventRecord,
        reminder: ReminderOffset,
        now: DateTime<Utc>,
    ) -> ServiceResult<SavedEvent> {
        let event = StoredEvent::new(record, reminder);
        let id = self.repo.create_event(&event)?;
        let outcome = match self.schedule_reminder(&event, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(rollback) = self.repo.delete_event(id) {
                    error!(
                        "event=event_create module=service status=rollback_failed error={rollback}"
                    );
                }
                warn!("event=event_create module=service status=error error={err}");
                return Err(err);
            }
        };
        info!(
            "event=event_create module=service status=ok reminder={}",
            outcome.as_str()
        );
        Ok(SavedEvent {
            id,
            reminder: outcome,
        })
    }

    /// Replaces an event's record, keeping its reminder offset, and
    /// reschedules the reminder.
    pub fn update_event(&self, id: EventId, record: EventRecord) -> ServiceResult<SavedEvent> {
        self.update_event_at(id, record, Utc::now())
    }

    /// [`Self::update_event`] with an explicit reference instant.
    ///
    /// # Errors
    /// - `Scheduler` when the old reminder cannot be cancelled (nothing is
    ///   written) or the new one cannot be scheduled (the previous row and
    ///   reminder are put back).
    pub fn update_event_at(
        &self,
        id: EventId,
        record: EventRecord,
        now: DateTime<Utc>,
    ) -> ServiceResult<SavedEvent> {
        let existing = self
            .repo
            .get_event(id)?
            .ok_or(EventServiceError::EventNotFound(id))?;
        let updated = StoredEvent::with_id(id, record, existing.reminder);
        updated.record.validate().map_err(RepoError::from)?;

        self.scheduler.cancel(id)?;
        if let Err(err) = self.repo.update_event(&updated) {
            self.reschedule_best_effort(&existing, now);
            return Err(err.into());
        }
        let outcome = match self.schedule_reminder(&updated, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(rollback) = self.repo.update_event(&existing) {
                    error!(
                        "event=event_update module=service status=rollback_failed error={rollback}"
                    );
                }
                self.reschedule_best_effort(&existing, now);
                warn!("event=event_update module=service status=error error={err}");
                return Err(err);
            }
        };
        info!(
            "event=event_update module=service status=ok reminder={}",
            outcome.as_str()
        );
        Ok(SavedEvent {
            id,
            reminder: outcome,
        })
    }

    /// Cancels the event's reminder, then deletes it.
    pub fn delete_event(&self, id: EventId) -> ServiceResult<()> {
        if self.repo.get_event(id)?.is_none() {
            return Err(EventServiceError::EventNotFound(id));
        }
        self.scheduler.cancel(id)?;
        self.repo.delete_event(id)?;
        info!("event=event_delete module=service status=ok");
        Ok(())
    }

    pub fn get_event(&self, id: EventId) -> ServiceResult<Option<StoredEvent>> {
        Ok(self.repo.get_event(id)?)
    }

    /// Lists all events, newest date first.
    pub fn list_events(&self) -> ServiceResult<Vec<StoredEvent>> {
        Ok(self.repo.list_events()?)
    }

    /// Loads every event and runs the filter engine.
    pub fn query_events(&self, query: &EventQuery) -> ServiceResult<Vec<StoredEvent>> {
        let events = self.repo.list_events()?;
        let matched = filter_events(&events, query);
        info!(
            "event=event_query module=service status=ok total={} matched={}",
            events.len(),
            matched.len()
        );
        Ok(matched)
    }

    /// Loads every event and partitions it for the home view.
    pub fn home_buckets(&self, today: NaiveDate) -> ServiceResult<HomeBuckets<StoredEvent>> {
        let events = self.repo.list_events()?;
        Ok(bucket_events(&events, today))
    }

    /// Writes every event to a new timestamped backup file under `dir`.
    ///
    /// # Errors
    /// - `Backup(NothingToBackup)` when the store is empty.
    pub fn create_backup(&self, dir: &Path, taken_at: NaiveDateTime) -> ServiceResult<PathBuf> {
        let events = self.repo.list_events()?;
        if events.is_empty() {
            return Err(BackupError::NothingToBackup.into());
        }

        let contents = encode_document(events.iter().map(|event| &event.record))
            .map_err(BackupError::from)?;
        let path = write_backup_file(dir, taken_at, &contents)?;
        info!(
            "event=backup_create module=service status=ok events={}",
            events.len()
        );
        Ok(path)
    }

    /// Restores the store from a backup file.
    pub fn restore_from_file(&self, path: &Path) -> ServiceResult<RestoreSummary> {
        let text = read_backup_file(path)?;
        self.restore_from_str(&text)
    }

    /// Replaces the whole store with the events of a backup document.
    ///
    /// Reminders of replaced events are cancelled; restored events carry no
    /// reminder.
    ///
    /// # Errors
    /// - `Backup(NothingToRestore)` when no line yields a valid event; the
    ///   store is left untouched.
    pub fn restore_from_str(&self, text: &str) -> ServiceResult<RestoreSummary> {
        let decoded = decode_document(text);
        let mut skipped = decoded.skipped_lines;
        let mut restored = Vec::with_capacity(decoded.records.len());
        for record in decoded.records {
            match record.validate() {
                Ok(()) => restored.push(StoredEvent::new(record, ReminderOffset::None)),
                Err(err) => {
                    skipped += 1;
                    warn!("event=backup_restore module=service status=skip reason={err}");
                }
            }
        }

        if restored.is_empty() {
            return Err(BackupError::NothingToRestore {
                skipped_lines: skipped,
            }
            .into());
        }

        let previous = self.repo.list_events()?;
        self.repo.replace_all(&restored)?;
        for event in &previous {
            if let Err(err) = self.scheduler.cancel(event.id) {
                warn!("event=backup_restore module=service status=cancel_failed error={err}");
            }
        }

        info!(
            "event=backup_restore module=service status=ok restored={} skipped={}",
            restored.len(),
            skipped
        );
        Ok(RestoreSummary {
            restored: restored.len(),
            skipped,
        })
    }

    fn reschedule_best_effort(&self, event: &StoredEvent, now: DateTime<Utc>) {
        if let Err(err) = self.schedule_reminder(event, now) {
            warn!("event=reminder_restore module=service status=error error={err}");
        }
    }

    fn schedule_reminder(
        &self,
        event: &StoredEvent,
        now: DateTime<Utc>,
    ) -> ServiceResult<ReminderOutcome> {
        let outcome = compute_trigger(
            &event.record.date,
            &event.record.time,
            event.reminder,
            now,
            &self.tz,
        );
        if let ReminderOutcome::Scheduled(trigger_at) = outcome {
            self.scheduler
                .schedule(&ReminderRequest::for_event(event.id, &event.record, trigger_at))?;
        }
        Ok(outcome)
    }
}
