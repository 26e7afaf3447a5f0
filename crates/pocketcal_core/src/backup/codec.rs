//! One-line-per-event backup text codec.
//!
//! # Responsibility
//! - Encode records as `~~`-delimited lines in fixed field order.
//! - Decode lines back into records, discarding lines that do not fit.
//!
//! # Invariants
//! - Field order: date, time, category, description, status, location, contact.
//! - A line must split into exactly 7 fields to be accepted.
//! - The format has no escaping: fields containing `~~`, line breaks or a
//!   trailing `~` cannot be encoded and are rejected on write.

use crate::model::event::{Category, EventRecord, EventStatus, UnknownLabel};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field delimiter of the backup line format.
pub const FIELD_SEPARATOR: &str = "~~";
/// Number of fields per backup line.
pub const FIELD_COUNT: usize = 7;

/// Why a backup line was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDecodeError {
    Blank,
    FieldCount(usize),
    UnknownLabel(UnknownLabel),
}

impl Display for LineDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "blank line"),
            Self::FieldCount(count) => {
                write!(f, "expected {FIELD_COUNT} fields, found {count}")
            }
            Self::UnknownLabel(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LineDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownLabel(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnknownLabel> for LineDecodeError {
    fn from(value: UnknownLabel) -> Self {
        Self::UnknownLabel(value)
    }
}

/// Why a record cannot be written as a backup line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEncodeError {
    /// Field contains the delimiter, a line break, or ends with `~` before
    /// another field.
    ReservedSequence { field: &'static str },
}

impl Display for LineEncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedSequence { field } => write!(
                f,
                "field `{field}` cannot be written without corrupting the `{FIELD_SEPARATOR}` line format"
            ),
        }
    }
}

impl Error for LineEncodeError {}

/// Encodes one record as a newline-terminated backup line.
///
/// # Errors
/// - `ReservedSequence` when any field would corrupt the line structure.
pub fn encode_line(record: &EventRecord) -> Result<String, LineEncodeError> {
    let fields: [(&'static str, &str); FIELD_COUNT] = [
        ("date", record.date.as_str()),
        ("time", record.time.as_str()),
        ("category", record.category.label()),
        ("description", record.description.as_str()),
        ("status", record.status.label()),
        ("location", record.location.as_str()),
        ("contact", record.contact.as_str()),
    ];

    for (index, (field, value)) in fields.iter().enumerate() {
        // A trailing `~` would merge with the following delimiter.
        let merges_with_delimiter = index + 1 < FIELD_COUNT && value.ends_with('~');
        if value.contains(FIELD_SEPARATOR)
            || value.contains(['\n', '\r'])
            || merges_with_delimiter
        {
            return Err(LineEncodeError::ReservedSequence { field: *field });
        }
    }

    let mut line = fields
        .iter()
        .map(|(_, value)| *value)
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);
    line.push('\n');
    Ok(line)
}

/// Decodes one backup line.
///
/// Only the line terminator is stripped; field whitespace is preserved.
pub fn decode_line(line: &str) -> Result<EventRecord, LineDecodeError> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Err(LineDecodeError::Blank);
    }

    let parts = line.split(FIELD_SEPARATOR).collect::<Vec<_>>();
    if parts.len() != FIELD_COUNT {
        return Err(LineDecodeError::FieldCount(parts.len()));
    }

    Ok(EventRecord {
        date: parts[0].to_string(),
        time: parts[1].to_string(),
        category: Category::from_label(parts[2])?,
        description: parts[3].to_string(),
        status: EventStatus::from_label(parts[4])?,
        location: parts[5].to_string(),
        contact: parts[6].to_string(),
    })
}

/// Outcome of decoding a whole backup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBackup {
    /// Accepted records in document order.
    pub records: Vec<EventRecord>,
    /// Non-blank lines that were discarded.
    pub skipped_lines: usize,
}

/// Decodes every line of a backup document, discarding lines that do not fit.
pub fn decode_document(text: &str) -> DecodedBackup {
    let mut decoded = DecodedBackup::default();
    for (index, line) in text.lines().enumerate() {
        match decode_line(line) {
            Ok(record) => decoded.records.push(record),
            Err(LineDecodeError::Blank) => {}
            Err(err) => {
                decoded.skipped_lines += 1;
                warn!(
                    "event=backup_decode module=backup status=skip line={} reason={}",
                    index + 1,
                    err
                );
            }
        }
    }
    decoded
}

/// Encodes a document, one line per record.
///
/// # Errors
/// - Fails on the first record that cannot be encoded.
pub fn encode_document<'a, I>(records: I) -> Result<String, LineEncodeError>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut text = String::new();
    for record in records {
        text.push_str(&encode_line(record)?);
    }
    Ok(text)
}
