//! Structured log macros.
//!
//! Every deployment log line carries the same fields so they can be
//! filtered in a JSON pipeline:
//! - `component`: `registry`, `factory`, `fixtures`, ...
//! - `address`: contract the event is about

/// Log a deployment event with standard fields.
///
/// ```rust,ignore
/// log_deploy_event!(info, "registry", "mastercopy deployed", outcome.address, noop = outcome.noop);
/// ```
#[macro_export]
macro_rules! log_deploy_event {
    ($level:ident, $component:expr, $msg:expr, $address:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            component = $component,
            address = %$address,
            $($($field)*,)?
            $msg
        )
    };
}
