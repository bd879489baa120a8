//! Core types shared across htree facilities
//!
//! This crate carries the canonical field keys and event names used by the
//! structured logging facility and by tests that assert on captured events.

pub mod schema;
