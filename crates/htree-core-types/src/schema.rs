//! Canonical schema constants for structured logging and events
//!
//! These constants keep event field names consistent between the emitting
//! macros and the assertions made against captured events.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Tree addressing
pub const FIELD_NODE_KEY: &str = "node_key";
pub const FIELD_PARENT_KEY: &str = "parent_key";
pub const FIELD_LINK_FIELD: &str = "link_field";
pub const FIELD_NODE_KIND: &str = "node_kind";

// Collection sizes
pub const FIELD_CHANGE_COUNT: &str = "change_count";
pub const FIELD_NODE_COUNT: &str = "node_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
