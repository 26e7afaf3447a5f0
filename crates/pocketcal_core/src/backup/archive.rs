//! Backup file naming and file-system helpers.
//!
//! # Responsibility
//! - Derive timestamped backup file names.
//! - Write backup documents into a backup directory and read them back.
//!
//! # Invariants
//! - Writes never replace an existing file (`create_new`); a name taken in
//!   the same second gets a two-digit `_NN` suffix that still sorts newest
//!   first.
//! - The backup directory is created on demand.

use crate::backup::codec::LineEncodeError;
use chrono::NaiveDateTime;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const BACKUP_FILE_PREFIX: &str = "events_backup_";
const BACKUP_FILE_EXTENSION: &str = "txt";
const MAX_SAME_SECOND_SUFFIX: u32 = 99;

/// Backup/restore failures.
#[derive(Debug)]
pub enum BackupError {
    /// The store holds no events.
    NothingToBackup,
    /// The document contained no usable event line.
    NothingToRestore { skipped_lines: usize },
    Encode(LineEncodeError),
    Io(std::io::Error),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToBackup => write!(f, "no events to back up"),
            Self::NothingToRestore { skipped_lines } => write!(
                f,
                "backup contains no valid events ({skipped_lines} line(s) discarded)"
            ),
            Self::Encode(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "backup file error: {err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NothingToBackup | Self::NothingToRestore { .. } => None,
        }
    }
}

impl From<LineEncodeError> for BackupError {
    fn from(value: LineEncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<std::io::Error> for BackupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Returns `events_backup_YYYYMMDD_HHMMSS.txt` for a local timestamp.
pub fn backup_file_name(taken_at: NaiveDateTime) -> String {
    format!(
        "{BACKUP_FILE_PREFIX}{}.{BACKUP_FILE_EXTENSION}",
        taken_at.format("%Y%m%d_%H%M%S")
    )
}

fn numbered_backup_file_name(taken_at: NaiveDateTime, attempt: u32) -> String {
    if attempt == 0 {
        return backup_file_name(taken_at);
    }
    format!(
        "{BACKUP_FILE_PREFIX}{}_{attempt:02}.{BACKUP_FILE_EXTENSION}",
        taken_at.format("%Y%m%d_%H%M%S")
    )
}

/// Returns whether a path looks like a backup produced by this module.
pub fn is_backup_file_name(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.starts_with(BACKUP_FILE_PREFIX)
        && path.extension().and_then(|ext| ext.to_str()) == Some(BACKUP_FILE_EXTENSION)
}

/// Writes a backup document to a new timestamped file under `dir`.
///
/// # Errors
/// - `Io` when the directory cannot be created, every same-second name is
///   taken, or the write fails.
pub fn write_backup_file(
    dir: &Path,
    taken_at: NaiveDateTime,
    contents: &str,
) -> Result<PathBuf, BackupError> {
    std::fs::create_dir_all(dir)?;

    let mut attempt = 0;
    let (path, result) = loop {
        let path = dir.join(numbered_backup_file_name(taken_at, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Err(err)
                if err.kind() == ErrorKind::AlreadyExists && attempt < MAX_SAME_SECOND_SUFFIX =>
            {
                attempt += 1;
            }
            opened => {
                let result = opened.and_then(|mut file| {
                    file.write_all(contents.as_bytes())?;
                    file.sync_all()
                });
                break (path, result);
            }
        }
    };

    match result {
        Ok(()) => {
            info!(
                "event=backup_write module=backup status=ok bytes={} path={}",
                contents.len(),
                path.display()
            );
            Ok(path)
        }
        Err(err) => {
            error!(
                "event=backup_write module=backup status=error path={} error={}",
                path.display(),
                err
            );
            Err(err.into())
        }
    }
}

/// Reads a backup document.
pub fn read_backup_file(path: &Path) -> Result<String, BackupError> {
    Ok(std::fs::read_to_string(path)?)
}

/// Lists backup files in `dir`, newest name first.
///
/// A missing directory yields an empty list.
pub fn list_backup_files(dir: &Path) -> Result<Vec<PathBuf>, BackupError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_backup_file_name(&path) {
            files.push(path);
        }
    }
    files.sort_by(|left, right| right.cmp(left));
    Ok(files)
}
