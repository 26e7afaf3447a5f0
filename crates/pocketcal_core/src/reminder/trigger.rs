//! Reminder trigger-time calculator.
//!
//! # Responsibility
//! - Turn an event's local date/time and a reminder offset into an absolute
//!   trigger instant.
//! - Report why no reminder is produced (not requested, too late, bad input).
//!
//! # Invariants
//! - Date/time are local wall-clock values in the supplied zone.
//! - Local times skipped by a DST gap are invalid input; times repeated by a
//!   DST overlap resolve to the earlier instant.
//! - `trigger < now + 1 minute` is `TooLate`.

use crate::model::datetime::{parse_event_date, parse_event_time};
use crate::model::event::ReminderOffset;
use chrono::{DateTime, Duration, Local, LocalResult, TimeZone, Utc};
use log::{debug, warn};

/// Minimum lead between "now" and a schedulable trigger.
pub const MIN_SCHEDULE_LEAD_SECS: i64 = 60;

/// Result of a trigger computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    /// Reminder should fire at this instant.
    Scheduled(DateTime<Utc>),
    /// The offset is `None`.
    NotRequested,
    /// Trigger is in the past or less than one minute away.
    TooLate,
    /// Date/time/offset could not be interpreted.
    InvalidInput,
}

impl ReminderOutcome {
    /// Collapses the outcome to the public "instant or nothing" contract.
    pub fn instant(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Scheduled(instant) => Some(instant),
            Self::NotRequested | Self::TooLate | Self::InvalidInput => None,
        }
    }

    /// Stable diagnostic name for logs and FFI envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled(_) => "scheduled",
            Self::NotRequested => "not_requested",
            Self::TooLate => "too_late",
            Self::InvalidInput => "invalid_input",
        }
    }
}

/// Computes the reminder trigger for an event.
///
/// `now` is the reference instant for the too-late check and `tz` the zone
/// the event's wall-clock date/time belong to.
pub fn compute_trigger<Tz: TimeZone>(
    date: &str,
    time: &str,
    offset: ReminderOffset,
    now: DateTime<Utc>,
    tz: &Tz,
) -> ReminderOutcome {
    let Some(minutes_before) = offset.minutes_before() else {
        debug!("event=reminder_compute module=reminder status=skip reason=not_requested");
        return ReminderOutcome::NotRequested;
    };

    let Some(event_instant) = local_event_instant(date, time, tz) else {
        warn!("event=reminder_compute module=reminder status=skip reason=invalid_input");
        return ReminderOutcome::InvalidInput;
    };

    let trigger = event_instant - Duration::minutes(minutes_before);
    if trigger < now + Duration::seconds(MIN_SCHEDULE_LEAD_SECS) {
        warn!(
            "event=reminder_compute module=reminder status=skip reason=too_late lead_ms={}",
            (trigger - now).num_milliseconds()
        );
        return ReminderOutcome::TooLate;
    }

    debug!(
        "event=reminder_compute module=reminder status=ok offset={} trigger_ms={}",
        offset.as_key(),
        trigger.timestamp_millis()
    );
    ReminderOutcome::Scheduled(trigger)
}

/// Label-based variant of [`compute_trigger`].
///
/// An unknown offset label is `InvalidInput`, never a zero offset.
pub fn compute_trigger_for_label<Tz: TimeZone>(
    date: &str,
    time: &str,
    offset_label: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> ReminderOutcome {
    match ReminderOffset::from_label(offset_label) {
        Ok(offset) => compute_trigger(date, time, offset, now, tz),
        Err(err) => {
            warn!("event=reminder_compute module=reminder status=skip reason=invalid_input error={err}");
            ReminderOutcome::InvalidInput
        }
    }
}

/// Computes the trigger instant in the device zone against the current time.
pub fn compute_trigger_instant(
    date: &str,
    time: &str,
    offset_label: &str,
) -> Option<DateTime<Utc>> {
    compute_trigger_for_label(date, time, offset_label, Utc::now(), &Local).instant()
}

/// Interprets canonical local date/time text as an absolute instant.
pub fn local_event_instant<Tz: TimeZone>(date: &str, time: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = parse_event_date(date)?.and_time(parse_event_time(time)?);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{local_event_instant, ReminderOutcome};
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn local_event_instant_applies_zone_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let instant = local_event_instant("2030-01-01", "10:00", &tz).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn outcome_collapses_to_instant_only_when_scheduled() {
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();
        assert_eq!(ReminderOutcome::Scheduled(at).instant(), Some(at));
        assert_eq!(ReminderOutcome::TooLate.instant(), None);
        assert_eq!(ReminderOutcome::NotRequested.instant(), None);
        assert_eq!(ReminderOutcome::InvalidInput.instant(), None);
    }
}
