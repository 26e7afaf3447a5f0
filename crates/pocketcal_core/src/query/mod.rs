//! Pure query engines over in-memory event lists.
//!
//! # Responsibility
//! - Filter events by category and date mode (`filter`).
//! - Partition events into home-view buckets (`bucket`).
//!
//! # Invariants
//! - Engines never touch storage and never fail on malformed records;
//!   events with unparseable dates are excluded.
//! - Output ordering is deterministic for the same input.

pub mod bucket;
pub mod filter;
