//! Operation lifecycle macros
//!
//! One event per lifecycle step, tagged with the caller's module as
//! `component`, the operation name as `op` and the schema `event` value.
//! Each macro expands to a block expression, so it works as a statement or
//! as a match arm. Extra `tracing` fields may follow the fixed arguments.

/// Record that `op` started
///
/// ```
/// # use pollbridge_core::log_op_start;
/// log_op_start!("poll");
/// log_op_start!("execute_command", command_type = "lua");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {{
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START,
            $($($field)*)?
        )
    }};
}

/// Record that `op` finished successfully after `duration_ms`
///
/// ```
/// # use pollbridge_core::{log_op_end, log_op_start};
/// match Some(2) {
///     Some(_) => log_op_end!("execute_command", duration_ms = 42u64),
///     None => log_op_start!("execute_command"),
/// }
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        $crate::__tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    }};
}

/// Record that `op` failed
///
/// `$err` is anything convertible into `ExError` (`BridgeError`,
/// `&BridgeError`, or an `ExError` already carrying context). Its kind and
/// code are always emitted; its request id is emitted when present.
///
/// ```
/// # use pollbridge_core::{log_op_error, errors::BridgeError};
/// let err = BridgeError::QueueFull { command_type: "lua".to_string() };
/// log_op_error!("execute_command", &err, duration_ms = 10u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = ::core::convert::Into::into($err);
        $crate::__tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            request_id = ex_err.request_id().map($crate::types::RequestId::as_str),
            $($($field)*)?
        )
    }};
}
