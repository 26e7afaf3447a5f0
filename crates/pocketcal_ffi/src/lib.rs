//! Flutter-facing bindings for the PocketCal core.

pub mod api;
