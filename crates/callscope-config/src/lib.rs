//! Shared configuration for call hierarchy tooling.
//!
//! Values layer built-in defaults, an optional configuration file
//! (`--config-path`), `CALLSCOPE_*` environment variables and command-line
//! flags, in increasing order of precedence.

mod defaults;
pub mod telemetry;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_RECURSION_LIMIT, default_log_filter, default_log_filter_string,
    default_log_format, default_recursion_limit,
};
pub use telemetry::{LogFormat, LogFormatParseError};

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CALLSCOPE")]
pub struct Config {
    /// Log filter expression in `tracing_subscriber::EnvFilter` syntax.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Maximum number of nested expansions in one hierarchy traversal; `0`
    /// means no cap beyond the available stack.
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            recursion_limit: default_recursion_limit(),
        }
    }
}

impl Config {
    /// Returns the log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the traversal recursion cap, `0` when uncapped.
    #[must_use]
    pub const fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }
}
