//! The symbol resolution service consumed by the hierarchy builder.
//!
//! The service performs the actual program analysis. This crate only asks it
//! which callable sits at a position, who calls a callable, what a callable
//! calls, and how byte offsets map to line/character pairs.

use camino::Utf8Path;

use crate::entity::{CallableEntity, TextSpan};
use crate::error::ServiceError;

/// An edge pointing from a caller toward the queried entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCall {
    /// The calling entity.
    pub from: CallableEntity,
    /// Spans of the call expressions inside `from`.
    pub from_spans: Vec<TextSpan>,
}

/// An edge pointing from the queried entity toward a callee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingCall {
    /// The called entity.
    pub to: CallableEntity,
    /// Spans of the call expressions inside the queried entity.
    pub from_spans: Vec<TextSpan>,
}

/// A 0-indexed position as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePosition {
    /// Line number (0-based).
    pub line: u32,
    /// Character offset within the line (0-based).
    pub character: u32,
}

impl ServicePosition {
    /// Creates a service position.
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Synchronous symbol resolution backend.
///
/// Calls are made serially from a single traversal. Implementations must
/// tolerate positions that resolve to nothing and positions that resolve to
/// several candidates.
pub trait ResolutionService {
    /// Handle to a loaded source file.
    type Source;

    /// Resolves the callable at `offset` in `file`.
    ///
    /// # Errors
    /// Returns an error if the request itself fails. Unresolved positions are
    /// an empty list, not an error.
    fn resolve_callable(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<CallableEntity>, ServiceError>;

    /// Lists the callers of the entity whose name starts at `offset`.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    fn callers_of(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<IncomingCall>, ServiceError>;

    /// Lists the callees of the entity whose name starts at `offset`.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    fn callees_of(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<OutgoingCall>, ServiceError>;

    /// Returns a handle to a loaded source file.
    ///
    /// # Errors
    /// Returns [`ServiceError::MissingSourceFile`] when the file is not
    /// available.
    fn source_file(&mut self, file: &Utf8Path) -> Result<Self::Source, ServiceError>;

    /// Maps a byte offset to a 0-indexed line/character pair.
    ///
    /// # Errors
    /// Returns [`ServiceError::Position`] when the offset lies outside the
    /// file.
    fn line_and_character_of(
        &self,
        source: &Self::Source,
        offset: u32,
    ) -> Result<ServicePosition, ServiceError>;
}
