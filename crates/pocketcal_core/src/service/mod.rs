//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, scheduler and engine calls into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod event_service;
