//! Correlation types for request tracking
//!
//! A `RequestId` is either supplied by the caller (echoed back verbatim in the
//! response envelope) or generated fresh at dispatch entry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single command dispatch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Use the caller-supplied id verbatim when non-empty, otherwise generate one.
    pub fn resolve(supplied: Option<&str>) -> Self {
        match supplied {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation carried from the transport adapter into a dispatch
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(request_id: RequestId) -> Self {
        Self { request_id }
    }
}
