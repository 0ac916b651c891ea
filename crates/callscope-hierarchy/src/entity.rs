//! Callable entities as reported by the symbol resolution service.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// A half-open byte span in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextSpan {
    /// Byte offset of the first character.
    pub start: u32,
    /// Length of the span in bytes.
    pub length: u32,
}

impl TextSpan {
    /// Creates a span from its start offset and length.
    #[must_use]
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    /// Creates a span covering `start..end`.
    ///
    /// An `end` before `start` yields an empty span at `start`.
    #[must_use]
    pub const fn from_bounds(start: u32, end: u32) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// Returns the exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.start.saturating_add(self.length)
    }
}

/// Kind of callable represented by an entity.
///
/// Tags reported by a resolution service are mapped onto this closed set at
/// the service boundary; anything unrecognised becomes [`SymbolKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// A free function.
    Function,
    /// A method on a class, struct or interface.
    Method,
    /// A class constructor.
    Constructor,
    /// A property getter.
    Getter,
    /// A property setter.
    Setter,
    /// A callable property.
    Property,
    /// A class, when the class itself is invoked.
    Class,
    /// A module or script body.
    Module,
    /// The synthetic call-site node at the top of a presented hierarchy.
    CallSite,
    /// Unknown or unclassified callable.
    Unknown,
}

impl SymbolKind {
    /// Maps a textual kind tag onto the closed set.
    ///
    /// Matching is ASCII case-insensitive and accepts the common aliases used
    /// by language services (`local function`, `getter`, `get` …).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "function" | "local function" => Self::Function,
            "method" | "local method" => Self::Method,
            "constructor" | "construct" => Self::Constructor,
            "getter" | "get" => Self::Getter,
            "setter" | "set" => Self::Setter,
            "property" => Self::Property,
            "class" | "local class" => Self::Class,
            "module" | "script" => Self::Module,
            "call" | "call site" | "callsite" => Self::CallSite,
            _ => Self::Unknown,
        }
    }

    /// Converts from LSP `SymbolKind` to our domain type.
    #[must_use]
    pub const fn from_lsp(kind: lsp_types::SymbolKind) -> Self {
        match kind {
            lsp_types::SymbolKind::FUNCTION => Self::Function,
            lsp_types::SymbolKind::METHOD => Self::Method,
            lsp_types::SymbolKind::CONSTRUCTOR => Self::Constructor,
            lsp_types::SymbolKind::PROPERTY | lsp_types::SymbolKind::FIELD => Self::Property,
            lsp_types::SymbolKind::CLASS => Self::Class,
            lsp_types::SymbolKind::MODULE
            | lsp_types::SymbolKind::FILE
            | lsp_types::SymbolKind::NAMESPACE => Self::Module,
            _ => Self::Unknown,
        }
    }
}

/// Identity of a callable entity within one traversal.
///
/// Two entities are the same for deduplication purposes when they live in the
/// same file and their name spans start at the same byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    file: Utf8PathBuf,
    offset: u32,
}

impl EntityKey {
    /// Creates a key from a file and selection-start offset.
    #[must_use]
    pub fn new(file: impl Into<Utf8PathBuf>, offset: u32) -> Self {
        Self {
            file: file.into(),
            offset,
        }
    }

    /// Returns the file component.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// Returns the selection-start offset.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.file, self.offset)
    }
}

/// A function, method or other callable resolved by the service.
///
/// Entities are read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableEntity {
    file: Utf8PathBuf,
    kind: SymbolKind,
    modifiers: Option<String>,
    name: String,
    container: Option<String>,
    span: TextSpan,
    selection_span: TextSpan,
}

impl CallableEntity {
    /// Creates an entity whose selection span equals its full span.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        file: impl Into<Utf8PathBuf>,
        span: TextSpan,
    ) -> Self {
        Self {
            file: file.into(),
            kind,
            modifiers: None,
            name: name.into(),
            container: None,
            span,
            selection_span: span,
        }
    }

    /// Sets the narrower span covering only the entity's name.
    #[must_use]
    pub const fn with_selection_span(mut self, selection_span: TextSpan) -> Self {
        self.selection_span = selection_span;
        self
    }

    /// Sets the enclosing container name.
    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Sets the modifier list, e.g. `export,async`.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: impl Into<String>) -> Self {
        let text = modifiers.into();
        self.modifiers = (!text.is_empty()).then_some(text);
        self
    }

    /// Returns the traversal identity of this entity.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.file.clone(), self.selection_span.start)
    }

    /// Returns the file containing the entity.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Returns the modifier list if present.
    #[must_use]
    pub fn modifiers(&self) -> Option<&str> {
        self.modifiers.as_deref()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the container name if present.
    #[must_use]
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Returns the span of the whole declaration.
    #[must_use]
    pub const fn span(&self) -> TextSpan {
        self.span
    }

    /// Returns the span of the name.
    #[must_use]
    pub const fn selection_span(&self) -> TextSpan {
        self.selection_span
    }
}
