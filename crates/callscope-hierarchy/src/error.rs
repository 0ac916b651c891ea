//! Error types for hierarchy construction.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised by a symbol resolution service.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The service has no source for the requested file.
    #[error("source file not loaded: {path}")]
    MissingSourceFile {
        /// Path of the missing file.
        path: Utf8PathBuf,
    },

    /// An offset lies outside the file it was mapped against.
    #[error("offset {offset} is outside {path}")]
    Position {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Offending byte offset.
        offset: u32,
    },

    /// A line number lies past the last line of the file.
    #[error("line {line} is outside {path}")]
    MissingLine {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Requested line (0-based).
        line: u32,
    },

    /// The service rejected or failed a request.
    #[error("resolution request failed: {message}")]
    Request {
        /// Description of the failure.
        message: String,
    },

    /// An IO error occurred while talking to the service.
    #[error("IO error: {message}")]
    Io {
        /// Description of the IO error.
        message: String,
        /// Underlying error wrapped in Arc for Clone support.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl ServiceError {
    /// Creates a new `MissingSourceFile` error.
    #[must_use]
    pub fn missing_source_file(path: impl Into<Utf8PathBuf>) -> Self {
        Self::MissingSourceFile { path: path.into() }
    }

    /// Creates a new `Position` error.
    #[must_use]
    pub fn position(path: impl Into<Utf8PathBuf>, offset: u32) -> Self {
        Self::Position {
            path: path.into(),
            offset,
        }
    }

    /// Creates a new `MissingLine` error.
    #[must_use]
    pub fn missing_line(path: impl Into<Utf8PathBuf>, line: u32) -> Self {
        Self::MissingLine {
            path: path.into(),
            line,
        }
    }

    /// Creates a new `Request` error.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Creates a new `Io` error.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }
}

/// Why a hierarchy could not be built.
#[derive(Debug, Clone, Error)]
pub enum BuildFailure {
    /// Recursion exhausted the stack or the recursion cap before any subtree
    /// completed.
    #[error("traversal stack exhausted at depth {depth}")]
    ResourceExhaustion {
        /// Recursion depth at which expansion stopped.
        depth: usize,
    },

    /// The resolution service failed while a node was under construction.
    #[error("failed to expand {entity}: {source}")]
    Service {
        /// Entity under construction when the failure occurred.
        entity: String,
        /// Underlying service error.
        #[source]
        source: ServiceError,
    },
}

impl BuildFailure {
    /// Returns whether the failure was caused by stack exhaustion.
    #[must_use]
    pub const fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::ResourceExhaustion { .. })
    }
}
