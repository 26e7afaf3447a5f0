//! Backup/restore text format and file helpers.
//!
//! # Responsibility
//! - Encode/decode the `~~` line format (`codec`).
//! - Name, write and read backup files (`archive`).
//!
//! # Invariants
//! - Backup files are never overwritten; names carry a second-level timestamp.

pub mod archive;
pub mod codec;
