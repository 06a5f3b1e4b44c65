//! Uniform response envelope
//!
//! Exactly one envelope is produced per dispatch. The constructors enforce
//! that a success never carries an error block and a failure never carries
//! data.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::{CoreError, ErrorCode};

/// Client-facing error block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&CoreError> for ErrorBody {
    fn from(err: &CoreError) -> Self {
        Self {
            code: err.kind(),
            message: err.message().to_string(),
            details: err.details().cloned(),
        }
    }
}

/// Tracing metadata echoed in every envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub request_id: String,
    pub action: String,
    /// Milliseconds from dispatch entry to envelope construction
    pub execution_time: u64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    metadata: ResponseMetadata,
}

impl ResponseEnvelope {
    pub fn success(data: Value, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata,
        }
    }

    pub fn failure(error: ErrorBody, metadata: ResponseMetadata) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            metadata,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorBody> {
        self.error.as_ref()
    }

    /// Error code of a failed response
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }

    pub fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    /// Per-field messages of a `VALIDATION_FAILED` response
    pub fn validation_errors(&self) -> Vec<String> {
        self.error
            .as_ref()
            .and_then(|e| e.details.as_ref())
            .and_then(|d| d.get("errors"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
