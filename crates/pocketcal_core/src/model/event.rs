//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical event value object (`EventRecord`).
//! - Define the persisted projection (`StoredEvent`) with its stable id.
//! - Map closed enumerations to and from their user-facing labels.
//!
//! # Invariants
//! - `EventRecord` is immutable once constructed; edits build a new record.
//! - `date`/`time` are kept as text; only `validate()` guarantees their shape.
//! - Label parsing is exact and never falls back to a default variant.

use crate::model::datetime::{parse_event_date, parse_event_time};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for persisted events.
///
/// Also used as the reminder schedule/cancel key.
pub type EventId = Uuid;

/// Sentinel category label meaning "no category restriction".
pub const ALL_CATEGORIES_LABEL: &str = "All";

/// Error returned when a label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    /// Enumeration that rejected the label (`category`, `status`, ...).
    pub kind: &'static str,
    /// Rejected raw input.
    pub label: String,
}

impl Display for UnknownLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} label `{}`", self.kind, self.label)
    }
}

impl Error for UnknownLabel {}

/// Event category selected from the UI tab set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Appointment,
    Meeting,
    ProjectDelivery,
    Exam,
    Other,
}

impl Category {
    /// All categories in UI tab order.
    pub const ALL: [Category; 5] = [
        Category::Appointment,
        Category::Meeting,
        Category::ProjectDelivery,
        Category::Exam,
        Category::Other,
    ];

    /// User-facing label, also used by the backup text format.
    pub fn label(self) -> &'static str {
        match self {
            Self::Appointment => "Appointment",
            Self::Meeting => "Meeting",
            Self::ProjectDelivery => "Project Delivery",
            Self::Exam => "Exam",
            Self::Other => "Other",
        }
    }

    /// Parses an exact user-facing label.
    pub fn from_label(label: &str) -> Result<Self, UnknownLabel> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == label)
            .ok_or_else(|| UnknownLabel {
                kind: "category",
                label: label.to_string(),
            })
    }
}

/// Progress state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// All statuses in option-list order.
    pub const ALL: [EventStatus; 4] = [
        EventStatus::Pending,
        EventStatus::InProgress,
        EventStatus::Completed,
        EventStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, UnknownLabel> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == label)
            .ok_or_else(|| UnknownLabel {
                kind: "status",
                label: label.to_string(),
            })
    }
}

/// Lead time before an event at which a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderOffset {
    /// No reminder requested.
    #[default]
    None,
    AtEventTime,
    FiveMinutesBefore,
    FifteenMinutesBefore,
    ThirtyMinutesBefore,
    OneHourBefore,
    OneDayBefore,
}

impl ReminderOffset {
    /// All offsets in option-list order.
    pub const ALL: [ReminderOffset; 7] = [
        ReminderOffset::None,
        ReminderOffset::AtEventTime,
        ReminderOffset::FiveMinutesBefore,
        ReminderOffset::FifteenMinutesBefore,
        ReminderOffset::ThirtyMinutesBefore,
        ReminderOffset::OneHourBefore,
        ReminderOffset::OneDayBefore,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::AtEventTime => "At event time",
            Self::FiveMinutesBefore => "5 minutes before",
            Self::FifteenMinutesBefore => "15 minutes before",
            Self::ThirtyMinutesBefore => "30 minutes before",
            Self::OneHourBefore => "1 hour before",
            Self::OneDayBefore => "1 day before",
        }
    }

    /// Parses an exact option label.
    ///
    /// Unknown labels are an error; they never degrade to a zero offset.
    pub fn from_label(label: &str) -> Result<Self, UnknownLabel> {
        Self::ALL
            .into_iter()
            .find(|offset| offset.label() == label)
            .ok_or_else(|| UnknownLabel {
                kind: "reminder offset",
                label: label.to_string(),
            })
    }

    /// Minutes before the event, or `None` when no reminder is requested.
    pub fn minutes_before(self) -> Option<i64> {
        match self {
            Self::None => None,
            Self::AtEventTime => Some(0),
            Self::FiveMinutesBefore => Some(5),
            Self::FifteenMinutesBefore => Some(15),
            Self::ThirtyMinutesBefore => Some(30),
            Self::OneHourBefore => Some(60),
            Self::OneDayBefore => Some(1440),
        }
    }

    /// Stable storage key used by the SQLite schema.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AtEventTime => "at_event_time",
            Self::FiveMinutesBefore => "five_minutes_before",
            Self::FifteenMinutesBefore => "fifteen_minutes_before",
            Self::ThirtyMinutesBefore => "thirty_minutes_before",
            Self::OneHourBefore => "one_hour_before",
            Self::OneDayBefore => "one_day_before",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|offset| offset.as_key() == key)
    }
}

/// Validation failures for event records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// `date` is not a real calendar date in `YYYY-MM-DD` form.
    InvalidDate(String),
    /// `time` is not a real 24-hour time in `HH:mm` form.
    InvalidTime(String),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => {
                write!(f, "event date `{value}` must be a YYYY-MM-DD calendar date")
            }
            Self::InvalidTime(value) => {
                write!(f, "event time `{value}` must be a 24-hour HH:mm time")
            }
        }
    }
}

impl Error for EventValidationError {}

/// Canonical event value object.
///
/// Field order matches the backup text format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// `YYYY-MM-DD`, zero padded.
    pub date: String,
    /// `HH:mm`, 24-hour, zero padded.
    pub time: String,
    pub category: Category,
    pub description: String,
    pub status: EventStatus,
    pub location: String,
    pub contact: String,
}

impl EventRecord {
    /// Creates a record with empty free-text fields and `Pending` status.
    pub fn new(date: impl Into<String>, time: impl Into<String>, category: Category) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            category,
            description: String::new(),
            status: EventStatus::Pending,
            location: String::new(),
            contact: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    /// Parsed event date, `None` when malformed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_event_date(&self.date)
    }

    /// Parsed event time, `None` when malformed.
    pub fn parsed_time(&self) -> Option<NaiveTime> {
        parse_event_time(&self.time)
    }

    /// Checks the canonical date/time invariants.
    ///
    /// # Errors
    /// - `InvalidDate` when `date` is not canonical or not a real date.
    /// - `InvalidTime` when `time` is not canonical or not a real time.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.parsed_date().is_none() {
            return Err(EventValidationError::InvalidDate(self.date.clone()));
        }
        if self.parsed_time().is_none() {
            return Err(EventValidationError::InvalidTime(self.time.clone()));
        }
        Ok(())
    }
}

impl AsRef<EventRecord> for EventRecord {
    fn as_ref(&self) -> &EventRecord {
        self
    }
}

/// Persisted event: stable id, record and the reminder chosen at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: EventId,
    pub record: EventRecord,
    pub reminder: ReminderOffset,
}

impl StoredEvent {
    /// Wraps a record with a freshly generated id.
    pub fn new(record: EventRecord, reminder: ReminderOffset) -> Self {
        Self::with_id(Uuid::new_v4(), record, reminder)
    }

    /// Wraps a record with a caller-provided id.
    pub fn with_id(id: EventId, record: EventRecord, reminder: ReminderOffset) -> Self {
        Self {
            id,
            record,
            reminder,
        }
    }
}

impl AsRef<EventRecord> for StoredEvent {
    fn as_ref(&self) -> &EventRecord {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, EventStatus, ReminderOffset};

    #[test]
    fn labels_roundtrip_for_every_variant() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Ok(category));
        }
        for status in EventStatus::ALL {
            assert_eq!(EventStatus::from_label(status.label()), Ok(status));
        }
        for offset in ReminderOffset::ALL {
            assert_eq!(ReminderOffset::from_label(offset.label()), Ok(offset));
            assert_eq!(ReminderOffset::from_key(offset.as_key()), Some(offset));
        }
    }

    #[test]
    fn label_parsing_is_exact() {
        assert!(Category::from_label("meeting").is_err());
        assert!(Category::from_label("All").is_err());
        let err = ReminderOffset::from_label("2 minutes before").unwrap_err();
        assert_eq!(err.kind, "reminder offset");
        assert_eq!(err.label, "2 minutes before");
    }
}
