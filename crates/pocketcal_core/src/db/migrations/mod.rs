//! Event store schema steps.
//!
//! # Invariants
//! - Steps are listed by ascending version with no gaps.
//! - `PRAGMA user_version` holds the last applied step.
//! - Pending steps run in one transaction; a failing step leaves the
//!   version untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, script)` pairs.
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Schema version this build writes.
pub const SCHEMA_VERSION: u32 = SCHEMA_STEPS.len() as u32;

/// Brings the connection's schema up to [`SCHEMA_VERSION`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `Migration` naming the failing step.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let pending = pending_steps(found);
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &(version, script) in pending {
        tx.execute_batch(script)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration { version, source })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={} to={}",
        found, SCHEMA_VERSION
    );
    Ok(())
}

fn pending_steps(applied: u32) -> &'static [(u32, &'static str)] {
    let start = (applied as usize).min(SCHEMA_STEPS.len());
    &SCHEMA_STEPS[start..]
}

#[cfg(test)]
mod tests {
    use super::{pending_steps, SCHEMA_STEPS, SCHEMA_VERSION};

    #[test]
    fn steps_are_numbered_from_one_without_gaps() {
        for (index, (version, _)) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(*version as usize, index + 1);
        }
        assert_eq!(SCHEMA_VERSION, 1);
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        assert_eq!(pending_steps(0).len(), SCHEMA_STEPS.len());
        assert!(pending_steps(SCHEMA_VERSION).is_empty());
    }
}
