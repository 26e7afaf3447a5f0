//! Reminder trigger computation and scheduling boundary.
//!
//! # Responsibility
//! - Compute the instant a reminder fires (`trigger`).
//! - Define the schedule/cancel contract towards the host OS (`scheduler`).
//!
//! # Invariants
//! - The event id is both the schedule key and the cancel key.
//! - Reminders closer than one minute from now are never scheduled.

pub mod scheduler;
pub mod trigger;
