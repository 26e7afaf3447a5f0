//! Domain model for calendar events.
//!
//! # Responsibility
//! - Define the event value object and its persisted projection.
//! - Provide strict parsing primitives for canonical date/time text.
//!
//! # Invariants
//! - Every persisted event is identified by a stable `EventId`.
//! - Category, status and reminder offset are closed enumerations.

pub mod datetime;
pub mod event;
