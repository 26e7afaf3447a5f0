//! Home-view date bucketing.
//!
//! # Responsibility
//! - Split events into today / this week / upcoming relative to a reference day.
//!
//! # Invariants
//! - The week ends on the first Sunday on or after the reference day.
//! - Past events and events with malformed dates land in no bucket.
//! - Each bucket is sorted ascending by date, then time.

use crate::model::event::EventRecord;
use chrono::{Datelike, Days, NaiveDate, NaiveTime};

/// Home-view partition of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeBuckets<T> {
    /// Events dated exactly on the reference day, any time of day.
    pub today: Vec<T>,
    /// After the reference day, up to and including the week-end Sunday.
    pub this_week: Vec<T>,
    /// After the week-end Sunday.
    pub upcoming: Vec<T>,
}

impl<T> Default for HomeBuckets<T> {
    fn default() -> Self {
        Self {
            today: Vec::new(),
            this_week: Vec::new(),
            upcoming: Vec::new(),
        }
    }
}

impl<T> HomeBuckets<T> {
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.this_week.is_empty() && self.upcoming.is_empty()
    }

    pub fn len(&self) -> usize {
        self.today.len() + self.this_week.len() + self.upcoming.len()
    }
}

/// Returns the Sunday that closes the week containing `today`.
///
/// When `today` is a Sunday it is its own week end.
pub fn week_end(today: NaiveDate) -> NaiveDate {
    let days_until_sunday = 6 - today.weekday().num_days_from_monday();
    today
        .checked_add_days(Days::new(u64::from(days_until_sunday)))
        .unwrap_or(NaiveDate::MAX)
}

/// Partitions events into home-view buckets relative to `today`.
pub fn bucket_events<T>(events: &[T], today: NaiveDate) -> HomeBuckets<T>
where
    T: AsRef<EventRecord> + Clone,
{
    let boundary = week_end(today);
    let mut today_keyed = Vec::new();
    let mut week_keyed = Vec::new();
    let mut upcoming_keyed = Vec::new();

    for event in events {
        let record = event.as_ref();
        let Some(date) = record.parsed_date() else {
            continue;
        };
        let time = record.parsed_time();
        // Malformed times sort last within their day.
        let key = (date, time.is_none(), time.unwrap_or(NaiveTime::MIN));

        if date == today {
            today_keyed.push((key, event.clone()));
        } else if date > today && date <= boundary {
            week_keyed.push((key, event.clone()));
        } else if date > boundary {
            upcoming_keyed.push((key, event.clone()));
        }
    }

    HomeBuckets {
        today: sorted(today_keyed),
        this_week: sorted(week_keyed),
        upcoming: sorted(upcoming_keyed),
    }
}

fn sorted<K: Ord, T>(mut keyed: Vec<(K, T)>) -> Vec<T> {
    keyed.sort_by(|(left, _), (right, _)| left.cmp(right));
    keyed.into_iter().map(|(_, event)| event).collect()
}
