//! Core types shared across the Sylo orchestration crates
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Schema constants**: canonical structured-log event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId};
