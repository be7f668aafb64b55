//! Operation logging macros
//!
//! Every operation logs `start`, then exactly one of `end` or `end_error`.
//! All three carry `component` (the calling module) and `op`; the closing
//! events also carry `duration_ms` measured from the `Instant` taken at start.
//! Extra `tracing` fields can be appended to any of them.

use std::time::Instant;

/// Milliseconds elapsed since `start`, saturating.
#[doc(hidden)]
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Log the start of an operation
///
/// ```
/// # use japi_core::log_op_start;
/// log_op_start!("sync_project");
/// log_op_start!("sync_project", project = "proj1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__types::schema::EVENT_START
            $(, $($field)+)?
        )
    };
}

/// Log the successful end of an operation started at `start`
///
/// ```
/// # use japi_core::log_op_end;
/// let start = std::time::Instant::now();
/// log_op_end!("sync_project", start, created = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, $start:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__types::schema::EVENT_END,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start)
            $(, $($field)+)?
        )
    };
}

/// Log the failure of an operation started at `start`
///
/// `err` is anything convertible into `ExError`; its kind and code become
/// the `err_kind` and `err_code` fields and its rendering the message.
///
/// ```
/// # use japi_core::{log_op_error, errors::JapiError};
/// let start = std::time::Instant::now();
/// let err = JapiError::PayloadUnserializable { message: "bad".to_string() };
/// log_op_error!("record_version", err, start, key = "p/k/f/a/v1");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, $start:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = ::core::convert::Into::into($err);
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::__types::schema::EVENT_END_ERROR,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start),
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($($field)+,)?
            "{}",
            ex_err
        );
    }};
}
