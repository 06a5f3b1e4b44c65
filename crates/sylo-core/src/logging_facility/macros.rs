//! Canonical logging macros
//!
//! Callers must depend on `sylo-core-types` and `tracing` for the expansions.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use sylo_core::log_op_start;
/// log_op_start!("execute");
/// log_op_start!("execute", action = "create_widget");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = sylo_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = sylo_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use sylo_core::log_op_end;
/// log_op_end!("execute", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = sylo_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = sylo_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into `CoreError`.
///
/// # Example
///
/// ```
/// # use sylo_core::{log_op_error, errors::SyloError};
/// let err = SyloError::CommandNotFound { name: "nope".to_string() };
/// log_op_error!("execute", err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let core_err: $crate::errors::CoreError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = sylo_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?core_err.kind(),
            err.code = core_err.code(),
            message = core_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let core_err: $crate::errors::CoreError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = sylo_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?core_err.kind(),
            err.code = core_err.code(),
            message = core_err.message(),
            $($field)*
        );
    }};
}
