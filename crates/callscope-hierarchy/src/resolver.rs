//! Resolution of a call site to the callable it names.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::entity::{CallableEntity, TextSpan};
use crate::service::ResolutionService;

const RESOLVER_TARGET: &str = "callscope_hierarchy::resolver";

/// A textual call site believed to name a callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    file: Utf8PathBuf,
    span: TextSpan,
    name: String,
}

impl CallSite {
    /// Creates a call site covering `span` in `file`.
    #[must_use]
    pub fn new(file: impl Into<Utf8PathBuf>, span: TextSpan, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            span,
            name: name.into(),
        }
    }

    /// Returns the file containing the call site.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// Returns the byte offset the service resolves.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.span.start
    }

    /// Returns the span of the call expression.
    #[must_use]
    pub const fn span(&self) -> TextSpan {
        self.span
    }

    /// Returns the call site's display text.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for CallSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.file, self.span.start, self.name)
    }
}

/// Outcome of resolving a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one candidate.
    Resolved(CallableEntity),
    /// Several candidates; the first one was chosen.
    Ambiguous {
        /// The chosen candidate.
        entity: CallableEntity,
        /// Number of candidates reported.
        candidates: usize,
    },
    /// Nothing callable at the position, or the service failed.
    NotFound,
}

impl Resolution {
    /// Returns the chosen entity, if any.
    #[must_use]
    pub fn entity(&self) -> Option<&CallableEntity> {
        match self {
            Self::Resolved(entity) | Self::Ambiguous { entity, .. } => Some(entity),
            Self::NotFound => None,
        }
    }

    /// Consumes the outcome and returns the chosen entity, if any.
    #[must_use]
    pub fn into_entity(self) -> Option<CallableEntity> {
        match self {
            Self::Resolved(entity) | Self::Ambiguous { entity, .. } => Some(entity),
            Self::NotFound => None,
        }
    }
}

/// Resolves `site` through the service with a single request.
///
/// Service failures are logged and reported as [`Resolution::NotFound`].
pub fn resolve<S: ResolutionService>(service: &mut S, site: &CallSite) -> Resolution {
    let candidates = match service.resolve_callable(site.file(), site.position()) {
        Ok(candidates) => candidates,
        Err(error) => {
            warn!(
                target: RESOLVER_TARGET,
                call_site = %site,
                %error,
                "resolution service failed"
            );
            return Resolution::NotFound;
        }
    };

    let count = candidates.len();
    match (candidates.into_iter().next(), count) {
        (None, _) => {
            debug!(target: RESOLVER_TARGET, call_site = %site, "no callable at call site");
            Resolution::NotFound
        }
        (Some(entity), 1) => Resolution::Resolved(entity),
        (Some(entity), _) => {
            warn!(
                target: RESOLVER_TARGET,
                call_site = %site,
                candidates = count,
                chosen = entity.name(),
                "ambiguous call site, using first candidate"
            );
            Resolution::Ambiguous {
                entity,
                candidates: count,
            }
        }
    }
}
