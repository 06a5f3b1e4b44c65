use serde::{Deserialize, Serialize};
use sylo_core_types::RequestId;
use thiserror::Error;

/// Result type alias using SyloError
pub type Result<T> = std::result::Result<T, SyloError>;

// ========== Error Facility ==========

/// Canonical error code taxonomy
///
/// Every failed dispatch carries exactly one of these codes in its response
/// envelope. The string form is stable and is what clients match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown or disabled command name
    CommandNotFound,
    /// Caller lacks a required permission
    Unauthorized,
    /// Parameter shape, type or rule violations
    ValidationFailed,
    /// The handler itself failed
    ExecutionFailed,
    /// Anything escaping the categories above
    InternalError,
    /// Malformed request shape, rejected by a transport adapter
    InvalidCommand,
    /// Reserved for adapters that enforce rate limits
    RateLimited,
    /// Subsumed into `ValidationFailed` details by the orchestrator
    MissingParameters,
}

impl ErrorCode {
    /// Get the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::CommandNotFound => "COMMAND_NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::ExecutionFailed => "EXECUTION_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::InvalidCommand => "INVALID_COMMAND",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::MissingParameters => "MISSING_PARAMETERS",
        }
    }

    /// Parse a stable string code back into the enum
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::CommandNotFound,
        ErrorCode::Unauthorized,
        ErrorCode::ValidationFailed,
        ErrorCode::ExecutionFailed,
        ErrorCode::InternalError,
        ErrorCode::InvalidCommand,
        ErrorCode::RateLimited,
        ErrorCode::MissingParameters,
    ];
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical structured error
///
/// Carries the classification (`kind`) plus the context needed to render a
/// client-facing error block and a useful log line.
#[derive(Debug, Clone)]
pub struct CoreError {
    kind: ErrorCode,
    op: Option<String>,
    action: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    details: Option<serde_json::Value>,
}

impl CoreError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorCode) -> Self {
        Self {
            kind,
            op: None,
            action: None,
            request_id: None,
            message: String::new(),
            details: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the command name being dispatched
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach client-visible structured details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn kind(&self) -> ErrorCode {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(action) = &self.action {
            write!(f, " (action: {})", action)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for CoreError {}

// ========== End Error Facility ==========

/// Every failure condition the orchestration core distinguishes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyloError {
    /// No command is registered under this name
    #[error("Command '{name}' not found")]
    CommandNotFound { name: String },

    /// The command exists but is switched off
    #[error("Command '{name}' is currently disabled")]
    CommandDisabled { name: String },

    /// The permission policy rejected the caller
    #[error("Insufficient permissions to execute this command")]
    PermissionDenied { name: String, required: Vec<String> },

    /// Declarative or custom parameter validation failed
    #[error("Parameter validation failed")]
    ValidationFailed { errors: Vec<String> },

    /// The handler returned an error
    #[error("{message}")]
    HandlerFailed { message: String, chain: Vec<String> },

    /// The handler exceeded the configured timeout
    #[error("Command execution timed out after {timeout_ms} ms")]
    HandlerTimedOut { timeout_ms: u64 },

    /// The dispatch was cancelled by its caller
    #[error("Command execution was cancelled")]
    Cancelled,

    /// The handler panicked; the payload is never shown to clients
    #[error("An unexpected error occurred")]
    HandlerPanicked { payload: String },

    /// A command with this name is already registered
    #[error("Command '{name}' is already registered")]
    DuplicateCommand { name: String },

    /// The request did not have the expected shape
    #[error("{reason}")]
    InvalidCommand { reason: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SyloError {
    /// The error code this failure is reported under
    pub fn code(&self) -> ErrorCode {
        match self {
            SyloError::CommandNotFound { .. } | SyloError::CommandDisabled { .. } => {
                ErrorCode::CommandNotFound
            }
            SyloError::PermissionDenied { .. } => ErrorCode::Unauthorized,
            SyloError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SyloError::HandlerFailed { .. }
            | SyloError::HandlerTimedOut { .. }
            | SyloError::Cancelled => ErrorCode::ExecutionFailed,
            SyloError::InvalidCommand { .. } => ErrorCode::InvalidCommand,
            SyloError::HandlerPanicked { .. }
            | SyloError::DuplicateCommand { .. }
            | SyloError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Build a `HandlerFailed` from whatever the handler returned
    pub fn from_handler(err: &anyhow::Error) -> Self {
        SyloError::HandlerFailed {
            message: err.to_string(),
            chain: err.chain().map(|cause| cause.to_string()).collect(),
        }
    }
}

/// Conversion from SyloError to CoreError
///
/// Only `ValidationFailed` carries client-visible details unconditionally;
/// handler error chains are attached by the orchestrator when configured.
impl From<SyloError> for CoreError {
    fn from(err: SyloError) -> Self {
        let kind = err.code();
        let message = err.to_string();
        match err {
            SyloError::CommandNotFound { name } | SyloError::CommandDisabled { name } => {
                CoreError::new(kind)
                    .with_op("lookup")
                    .with_action(name)
                    .with_message(message)
            }
            SyloError::PermissionDenied { name, .. } => CoreError::new(kind)
                .with_op("authorize")
                .with_action(name)
                .with_message(message),
            SyloError::ValidationFailed { errors } => CoreError::new(kind)
                .with_op("validate")
                .with_message(message)
                .with_details(serde_json::json!({ "errors": errors })),
            SyloError::HandlerFailed { .. }
            | SyloError::HandlerTimedOut { .. }
            | SyloError::Cancelled
            | SyloError::HandlerPanicked { .. } => {
                CoreError::new(kind).with_op("execute").with_message(message)
            }
            SyloError::DuplicateCommand { name } => CoreError::new(kind)
                .with_op("register")
                .with_action(name)
                .with_message(message),
            SyloError::InvalidCommand { .. } => {
                CoreError::new(kind).with_op("parse").with_message(message)
            }
            SyloError::Internal { .. } => {
                CoreError::new(kind).with_message("An unexpected error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable_strings() {
        assert_eq!(ErrorCode::CommandNotFound.code(), "COMMAND_NOT_FOUND");
        assert_eq!(ErrorCode::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(ErrorCode::ValidationFailed.code(), "VALIDATION_FAILED");
        assert_eq!(ErrorCode::ExecutionFailed.code(), "EXECUTION_FAILED");
        assert_eq!(ErrorCode::InternalError.code(), "INTERNAL_ERROR");
        assert_eq!(ErrorCode::InvalidCommand.code(), "INVALID_COMMAND");
        assert_eq!(ErrorCode::RateLimited.code(), "RATE_LIMITED");
        assert_eq!(ErrorCode::MissingParameters.code(), "MISSING_PARAMETERS");
    }

    #[test]
    fn test_code_serializes_as_stable_string() {
        for code in ErrorCode::ALL {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.code()));
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ErrorCode::from_code("NOPE"), None);
    }

    #[test]
    fn test_disabled_maps_to_not_found_with_disabled_message() {
        let core: CoreError = SyloError::CommandDisabled {
            name: "create_widget".to_string(),
        }
        .into();
        assert_eq!(core.kind(), ErrorCode::CommandNotFound);
        assert_eq!(core.message(), "Command 'create_widget' is currently disabled");
        assert_eq!(core.action(), Some("create_widget"));
    }

    #[test]
    fn test_validation_failed_carries_error_list() {
        let core: CoreError = SyloError::ValidationFailed {
            errors: vec!["a".to_string(), "b".to_string()],
        }
        .into();
        assert_eq!(core.code(), "VALIDATION_FAILED");
        assert_eq!(
            core.details(),
            Some(&serde_json::json!({ "errors": ["a", "b"] }))
        );
    }

    #[test]
    fn test_panic_is_internal_with_generic_message() {
        let err = SyloError::HandlerPanicked {
            payload: "index out of bounds".to_string(),
        };
        let core: CoreError = err.into();
        assert_eq!(core.kind(), ErrorCode::InternalError);
        assert_eq!(core.message(), "An unexpected error occurred");
    }

    #[test]
    fn test_handler_failure_uses_error_message() {
        let source = anyhow::anyhow!("connection reset").context("insert failed");
        let err = SyloError::from_handler(&source);
        assert_eq!(err.to_string(), "insert failed");
        assert_eq!(err.code(), ErrorCode::ExecutionFailed);
        match err {
            SyloError::HandlerFailed { chain, .. } => {
                assert_eq!(chain, vec!["insert failed", "connection reset"]);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = CoreError::new(ErrorCode::Unauthorized)
            .with_op("authorize")
            .with_action("delete_project")
            .with_message("Insufficient permissions to execute this command");
        let text = err.to_string();
        assert!(text.starts_with("[UNAUTHORIZED] in operation 'authorize'"));
        assert!(text.contains("(action: delete_project)"));
    }
}
