//! Built-in configuration defaults.

use crate::telemetry::LogFormat;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default recursion cap of one traversal. Zero leaves the depth bounded only
/// by the stack of the building thread.
pub const DEFAULT_RECURSION_LIMIT: usize = 0;

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default traversal recursion cap (uncapped).
#[must_use]
pub const fn default_recursion_limit() -> usize {
    DEFAULT_RECURSION_LIMIT
}
