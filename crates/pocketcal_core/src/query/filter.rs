//! Category + date-mode event filtering.
//!
//! # Responsibility
//! - Build typed queries from UI-level text parameters.
//! - Apply category filter, then date filter, then a stable date sort.
//!
//! # Invariants
//! - RANGE bounds are inclusive on both ends.
//! - MONTH matches by month-of-year on the parsed date, in any year.
//! - Equal dates keep their input relative order.

use crate::model::datetime::{parse_event_date, parse_month, parse_year};
use crate::model::event::{Category, EventRecord, UnknownLabel, ALL_CATEGORIES_LABEL};
use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category restriction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// The "All" sentinel: every category passes.
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Parses the UI category tab label, accepting the `All` sentinel.
    pub fn from_label(label: &str) -> Result<Self, UnknownLabel> {
        if label == ALL_CATEGORIES_LABEL {
            return Ok(Self::All);
        }
        Category::from_label(label).map(Self::Only)
    }

    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == category,
        }
    }
}

/// Date mode of a query with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    /// `start <= date <= end`.
    Range { start: NaiveDate, end: NaiveDate },
    /// Any date in the given year.
    Year(i32),
    /// Exactly one date.
    Day(NaiveDate),
    /// Given month-of-year (1..=12) in any year.
    Month(u32),
    /// No date restriction.
    #[default]
    None,
}

impl DateFilter {
    pub fn matches(self, date: NaiveDate) -> bool {
        match self {
            Self::Range { start, end } => start <= date && date <= end,
            Self::Year(year) => date.year() == year,
            Self::Day(day) => date == day,
            Self::Month(month) => date.month() == month,
            Self::None => true,
        }
    }
}

/// Query mode selector as exposed to UI callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Range,
    Year,
    Day,
    Month,
    None,
}

impl QueryMode {
    pub fn from_label(label: &str) -> Result<Self, UnknownLabel> {
        match label.trim().to_ascii_lowercase().as_str() {
            "range" => Ok(Self::Range),
            "year" => Ok(Self::Year),
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "none" => Ok(Self::None),
            _ => Err(UnknownLabel {
                kind: "query mode",
                label: label.to_string(),
            }),
        }
    }
}

/// Raw, text-level query parameters collected by a UI form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Errors raised while building a typed query from text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A required parameter for the selected mode is absent or blank.
    MissingParameter(&'static str),
    InvalidDate { field: &'static str, value: String },
    InvalidYear(String),
    InvalidMonth(String),
    UnknownLabel(UnknownLabel),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParameter(name) => write!(f, "missing query parameter `{name}`"),
            Self::InvalidDate { field, value } => {
                write!(f, "query parameter `{field}` is not a YYYY-MM-DD date: `{value}`")
            }
            Self::InvalidYear(value) => write!(f, "year must be 4 digits, got `{value}`"),
            Self::InvalidMonth(value) => write!(f, "month must be 01..12, got `{value}`"),
            Self::UnknownLabel(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownLabel(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnknownLabel> for QueryError {
    fn from(value: UnknownLabel) -> Self {
        Self::UnknownLabel(value)
    }
}

/// Typed event query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventQuery {
    pub category: CategoryFilter,
    pub date: DateFilter,
}

impl EventQuery {
    pub fn new(category: CategoryFilter, date: DateFilter) -> Self {
        Self { category, date }
    }

    /// Builds a typed query from a mode and text parameters.
    ///
    /// # Errors
    /// - `MissingParameter` when the mode's required parameter is absent,
    ///   including either RANGE bound.
    /// - `InvalidDate`/`InvalidYear`/`InvalidMonth` for malformed values.
    /// - `UnknownLabel` for an unknown category label.
    pub fn from_parts(mode: QueryMode, params: &QueryParams) -> Result<Self, QueryError> {
        let category = match non_blank(params.category.as_deref()) {
            Some(label) => CategoryFilter::from_label(label)?,
            None => CategoryFilter::All,
        };

        let date = match mode {
            QueryMode::Range => DateFilter::Range {
                start: required_date("start_date", params.start_date.as_deref())?,
                end: required_date("end_date", params.end_date.as_deref())?,
            },
            QueryMode::Year => {
                let raw = non_blank(params.year.as_deref())
                    .ok_or(QueryError::MissingParameter("year"))?;
                DateFilter::Year(
                    parse_year(raw).ok_or_else(|| QueryError::InvalidYear(raw.to_string()))?,
                )
            }
            QueryMode::Day => DateFilter::Day(required_date("date", params.date.as_deref())?),
            QueryMode::Month => {
                let raw = non_blank(params.month.as_deref())
                    .ok_or(QueryError::MissingParameter("month"))?;
                DateFilter::Month(
                    parse_month(raw).ok_or_else(|| QueryError::InvalidMonth(raw.to_string()))?,
                )
            }
            QueryMode::None => DateFilter::None,
        };

        Ok(Self { category, date })
    }

    /// Returns whether one record passes both filters.
    ///
    /// Records with malformed dates never match.
    pub fn matches(&self, record: &EventRecord) -> bool {
        if !self.category.matches(record.category) {
            return false;
        }
        match record.parsed_date() {
            Some(date) => self.date.matches(date),
            None => false,
        }
    }
}

/// Filters and sorts events for a query.
///
/// Applies the category filter, then the date filter, then a stable
/// ascending sort by date. Empty output is a normal result.
pub fn filter_events<T>(events: &[T], query: &EventQuery) -> Vec<T>
where
    T: AsRef<EventRecord> + Clone,
{
    let mut matched = events
        .iter()
        .filter_map(|event| {
            let record = event.as_ref();
            if !query.category.matches(record.category) {
                return None;
            }
            let date = record.parsed_date()?;
            query.date.matches(date).then(|| (date, event.clone()))
        })
        .collect::<Vec<_>>();

    matched.sort_by_key(|(date, _)| *date);
    matched.into_iter().map(|(_, event)| event).collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn required_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, QueryError> {
    let raw = non_blank(value).ok_or(QueryError::MissingParameter(field))?;
    parse_event_date(raw).ok_or_else(|| QueryError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}
