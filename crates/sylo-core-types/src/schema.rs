//! Canonical event names for structured logging
//!
//! The `log_op_*` macros stamp every event with one of these so log pipelines
//! and test assertions can rely on stable values.

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
