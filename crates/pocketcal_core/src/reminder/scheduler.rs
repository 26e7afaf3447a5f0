//! Reminder scheduling boundary.
//!
//! # Responsibility
//! - Define the contract used to hand reminders to an OS alarm facility.
//! - Provide an in-process scheduler that records pending reminders for a
//!   host layer (FFI/CLI) to deliver.
//!
//! # Invariants
//! - One pending reminder per event id; rescheduling replaces it.
//! - Cancelling an id with no pending reminder is a no-op.
//! - A poisoned lock is recovered on every path, reads and writes alike.

use crate::model::event::{EventId, EventRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

/// Absolute-instant reminder request keyed by event id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub event_id: EventId,
    pub trigger_at: DateTime<Utc>,
    /// Notification title, e.g. `Reminder: Meeting`.
    pub title: String,
    /// Notification body, e.g. `Standup - 2030-01-01 at 10:00`.
    pub body: String,
}

impl ReminderRequest {
    /// Builds a request with notification text derived from the record.
    pub fn for_event(event_id: EventId, record: &EventRecord, trigger_at: DateTime<Utc>) -> Self {
        let when = format!("{} at {}", record.date, record.time);
        let body = if record.description.is_empty() {
            when
        } else {
            format!("{} - {when}", record.description)
        };
        Self {
            event_id,
            trigger_at,
            title: format!("Reminder: {}", record.category.label()),
            body,
        }
    }
}

/// Failure reported by a scheduler backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Backend refused the request (permissions, quota, ...).
    Rejected(String),
    /// Backend cannot be reached (service down, closed channel, ...).
    Unavailable(String),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "reminder rejected: {message}"),
            Self::Unavailable(message) => write!(f, "reminder scheduler unavailable: {message}"),
        }
    }
}

impl Error for SchedulerError {}

/// Contract towards the alarm facility that delivers reminders.
pub trait ReminderScheduler {
    /// Schedules (or replaces) the reminder for `request.event_id`.
    fn schedule(&self, request: &ReminderRequest) -> Result<(), SchedulerError>;
    /// Revokes a previously scheduled reminder by event id.
    fn cancel(&self, event_id: EventId) -> Result<(), SchedulerError>;
}

impl<S: ReminderScheduler + ?Sized> ReminderScheduler for &S {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), SchedulerError> {
        (**self).schedule(request)
    }

    fn cancel(&self, event_id: EventId) -> Result<(), SchedulerError> {
        (**self).cancel(event_id)
    }
}

/// In-process scheduler keeping pending reminders in memory.
#[derive(Debug, Default)]
pub struct InMemoryReminderScheduler {
    pending: Mutex<BTreeMap<EventId, ReminderRequest>>,
}

impl InMemoryReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns pending reminders ordered by trigger instant.
    pub fn pending(&self) -> Vec<ReminderRequest> {
        let guard = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut requests = guard.values().cloned().collect::<Vec<_>>();
        requests.sort_by_key(|request| (request.trigger_at, request.event_id));
        requests
    }

    /// Returns the pending reminder for one event.
    pub fn get(&self, event_id: EventId) -> Option<ReminderRequest> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_id)
            .cloned()
    }

    /// Removes and returns reminders due at or before `now`.
    pub fn take_due(&self, now: DateTime<Utc>) -> Vec<ReminderRequest> {
        let mut guard = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let due_ids = guard
            .values()
            .filter(|request| request.trigger_at <= now)
            .map(|request| request.event_id)
            .collect::<Vec<_>>();
        let mut due = due_ids
            .into_iter()
            .filter_map(|id| guard.remove(&id))
            .collect::<Vec<_>>();
        due.sort_by_key(|request| (request.trigger_at, request.event_id));
        due
    }
}

impl ReminderScheduler for InMemoryReminderScheduler {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), SchedulerError> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request.event_id, request.clone());
        Ok(())
    }

    fn cancel(&self, event_id: EventId) -> Result<(), SchedulerError> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&event_id);
        Ok(())
    }
}
