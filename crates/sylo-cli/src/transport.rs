//! Wire format adapter
//!
//! Turns raw JSON into `CommandRequest`s before anything reaches the
//! orchestrator, and maps envelopes back onto process exit codes.

use chrono::Utc;
use serde_json::{Map, Value};
use sylo_core::errors::{CoreError, ErrorCode, SyloError};
use sylo_core::model::{CommandRequest, ErrorBody, RequestMetadata, ResponseEnvelope, ResponseMetadata};
use sylo_core_types::RequestId;

/// Parse one wire request
///
/// Expects `{"action": "...", "parameters": {...}, "metadata": {"requestId": "..."}}`.
/// `parameters` and `metadata` may be omitted.
pub fn parse_request(raw: &str) -> Result<CommandRequest, SyloError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| invalid(format!("Malformed JSON: {err}")))?;
    request_from_value(value)
}

/// Parse a JSON array of wire requests
///
/// A malformed element fails the whole batch; nothing is dispatched.
pub fn parse_batch(raw: &str) -> Result<Vec<CommandRequest>, SyloError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| invalid(format!("Malformed JSON: {err}")))?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                request_from_value(item).map_err(|err| invalid(format!("Command {index}: {err}")))
            })
            .collect(),
        _ => Err(invalid("Batch input must be a JSON array of commands")),
    }
}

pub fn request_from_value(value: Value) -> Result<CommandRequest, SyloError> {
    let mut object = match value {
        Value::Object(object) => object,
        _ => return Err(invalid("Command must be a JSON object")),
    };

    let action = match object.remove("action") {
        Some(Value::String(action)) if !action.trim().is_empty() => action,
        Some(Value::String(_)) => return Err(invalid("Action must not be empty")),
        Some(_) => return Err(invalid("Action must be a string")),
        None => return Err(invalid("Missing required field 'action'")),
    };

    let parameters = match object.remove("parameters") {
        Some(Value::Object(parameters)) => parameters,
        None | Some(Value::Null) => Map::new(),
        Some(_) => return Err(invalid("Parameters must be a JSON object")),
    };

    let metadata = match object.remove("metadata") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value::<RequestMetadata>(value)
                .map_err(|err| invalid(format!("Invalid metadata: {err}")))?,
        ),
    };

    Ok(CommandRequest {
        action,
        parameters,
        metadata,
    })
}

fn invalid(reason: impl Into<String>) -> SyloError {
    SyloError::InvalidCommand {
        reason: reason.into(),
    }
}

/// Envelope for a request rejected before dispatch
pub fn rejection(err: SyloError, action: Option<&str>) -> ResponseEnvelope {
    let request_id = RequestId::new();
    let core = CoreError::from(err).with_request_id(request_id.clone());
    tracing::warn!(
        component = module_path!(),
        op = "parse",
        request_id = request_id.as_str(),
        err.code = core.code(),
        message = core.message(),
    );
    ResponseEnvelope::failure(
        ErrorBody::from(&core),
        ResponseMetadata {
            request_id: request_id.into_string(),
            action: action.unwrap_or_default().to_string(),
            execution_time: 0,
            timestamp: Utc::now(),
        },
    )
}

/// Process exit status for an envelope
pub fn exit_code(envelope: &ResponseEnvelope) -> i32 {
    match envelope.error_code() {
        None => 0,
        Some(ErrorCode::ValidationFailed | ErrorCode::InvalidCommand | ErrorCode::MissingParameters) => 2,
        Some(ErrorCode::CommandNotFound) => 3,
        Some(ErrorCode::Unauthorized) => 4,
        Some(ErrorCode::RateLimited) => 5,
        Some(ErrorCode::ExecutionFailed | ErrorCode::InternalError) => 1,
    }
}

/// Worst exit status across a batch
pub fn batch_exit_code(envelopes: &[ResponseEnvelope]) -> i32 {
    let codes: Vec<i32> = envelopes.iter().map(exit_code).collect();
    if codes.contains(&1) {
        1
    } else {
        codes.into_iter().max().unwrap_or(0)
    }
}
