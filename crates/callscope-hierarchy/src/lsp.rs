//! Resolution service backed by a language server's call hierarchy.
//!
//! Offsets are translated to protocol positions through [`SourceText`]
//! indexes read from disk, and every [`CallHierarchyItem`] the server hands
//! back is remembered by entity key so follow-up queries send the server the
//! exact item it produced.

use std::collections::HashMap;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use lsp_types::{
    CallHierarchyIncomingCall, CallHierarchyIncomingCallsParams, CallHierarchyItem,
    CallHierarchyOutgoingCall, CallHierarchyOutgoingCallsParams, CallHierarchyPrepareParams,
    PartialResultParams, Position, Range, SymbolTag, TextDocumentIdentifier,
    TextDocumentPositionParams, WorkDoneProgressParams,
};
use tracing::debug;

use crate::entity::{CallableEntity, EntityKey, SymbolKind, TextSpan};
use crate::error::ServiceError;
use crate::service::{IncomingCall, OutgoingCall, ResolutionService, ServicePosition};
use crate::source::SourceText;
use crate::uri::{path_to_uri, uri_to_path};

const LSP_TARGET: &str = "callscope_hierarchy::lsp";

/// Client abstraction for LSP call hierarchy operations.
///
/// This trait enables testing with mock clients and abstracts over
/// different LSP client implementations.
pub trait CallHierarchyClient {
    /// Prepares call hierarchy items at the given position.
    ///
    /// # Errors
    /// Returns an error if the LSP request fails.
    fn prepare_call_hierarchy(
        &mut self,
        params: CallHierarchyPrepareParams,
    ) -> Result<Option<Vec<CallHierarchyItem>>, ServiceError>;

    /// Gets incoming calls for the given item.
    ///
    /// # Errors
    /// Returns an error if the LSP request fails.
    fn incoming_calls(
        &mut self,
        params: CallHierarchyIncomingCallsParams,
    ) -> Result<Option<Vec<CallHierarchyIncomingCall>>, ServiceError>;

    /// Gets outgoing calls for the given item.
    ///
    /// # Errors
    /// Returns an error if the LSP request fails.
    fn outgoing_calls(
        &mut self,
        params: CallHierarchyOutgoingCallsParams,
    ) -> Result<Option<Vec<CallHierarchyOutgoingCall>>, ServiceError>;
}

/// LSP-based resolution service.
pub struct LspResolutionService<C> {
    client: C,
    sources: HashMap<Utf8PathBuf, Arc<SourceText>>,
    items: HashMap<EntityKey, CallHierarchyItem>,
}

impl<C> LspResolutionService<C> {
    /// Creates a service issuing requests through `client`.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            sources: HashMap::new(),
            items: HashMap::new(),
        }
    }

    /// Registers in-memory text for `path`, taking precedence over the file
    /// on disk. Useful for unsaved editor buffers.
    pub fn insert_source(&mut self, source: SourceText) {
        self.sources
            .insert(source.path().to_owned(), Arc::new(source));
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    fn load(&mut self, path: &Utf8Path) -> Result<Arc<SourceText>, ServiceError> {
        if let Some(source) = self.sources.get(path) {
            return Ok(Arc::clone(source));
        }
        let source = Arc::new(SourceText::load(path)?);
        debug!(
            target: LSP_TARGET,
            path = %path,
            lines = source.line_count(),
            "loaded source file"
        );
        self.sources.insert(path.to_owned(), Arc::clone(&source));
        Ok(source)
    }

    /// Converts a server item to an entity and remembers the item.
    fn remember(&mut self, item: CallHierarchyItem) -> Result<CallableEntity, ServiceError> {
        let path = uri_to_path(&item.uri)?;
        let source = self.load(&path)?;
        let span = span_of(&source, item.range)?;
        let selection_span = span_of(&source, item.selection_range)?;

        let kind = SymbolKind::from_lsp(item.kind);
        let mut entity = CallableEntity::new(item.name.as_str(), kind, path, span)
            .with_selection_span(selection_span);
        if let Some(detail) = item.detail.as_deref().filter(|detail| !detail.is_empty()) {
            entity = entity.with_container(detail);
        }
        if item
            .tags
            .as_ref()
            .is_some_and(|tags| tags.contains(&SymbolTag::DEPRECATED))
        {
            entity = entity.with_modifiers("deprecated");
        }

        self.items.insert(entity.key(), item);
        Ok(entity)
    }

    fn spans_in(
        &mut self,
        path: &Utf8Path,
        ranges: Vec<Range>,
    ) -> Result<Vec<TextSpan>, ServiceError> {
        let source = self.load(path)?;
        ranges
            .into_iter()
            .map(|range| span_of(&source, range))
            .collect()
    }
}

impl<C: CallHierarchyClient> LspResolutionService<C> {
    fn prepare(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<CallHierarchyItem>, ServiceError> {
        let source = self.load(file)?;
        let position = source.position_of(offset)?;
        let params = CallHierarchyPrepareParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier {
                    uri: path_to_uri(file)?,
                },
                position: Position::new(position.line, position.character),
            },
            work_done_progress_params: WorkDoneProgressParams::default(),
        };

        self.client
            .prepare_call_hierarchy(params)
            .map(Option::unwrap_or_default)
    }

    /// Finds the server item for the entity whose name starts at `offset`,
    /// preparing it afresh when it has not been seen yet.
    fn item_at(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Option<CallHierarchyItem>, ServiceError> {
        let key = EntityKey::new(file, offset);
        if let Some(item) = self.items.get(&key) {
            return Ok(Some(item.clone()));
        }
        for item in self.prepare(file, offset)? {
            self.remember(item)?;
        }
        Ok(self.items.get(&key).cloned())
    }
}

impl<C: CallHierarchyClient> ResolutionService for LspResolutionService<C> {
    type Source = Arc<SourceText>;

    fn resolve_callable(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<CallableEntity>, ServiceError> {
        self.prepare(file, offset)?
            .into_iter()
            .map(|item| self.remember(item))
            .collect()
    }

    fn callers_of(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<IncomingCall>, ServiceError> {
        let Some(item) = self.item_at(file, offset)? else {
            return Ok(Vec::new());
        };
        let params = CallHierarchyIncomingCallsParams {
            item,
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        };

        let incoming = self.client.incoming_calls(params)?.unwrap_or_default();
        incoming
            .into_iter()
            .map(|call| {
                let from = self.remember(call.from)?;
                let from_spans = self.spans_in(from.file(), call.from_ranges)?;
                Ok(IncomingCall { from, from_spans })
            })
            .collect()
    }

    fn callees_of(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<OutgoingCall>, ServiceError> {
        let Some(item) = self.item_at(file, offset)? else {
            return Ok(Vec::new());
        };
        let params = CallHierarchyOutgoingCallsParams {
            item,
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        };

        let outgoing = self.client.outgoing_calls(params)?.unwrap_or_default();
        outgoing
            .into_iter()
            .map(|call| {
                let to = self.remember(call.to)?;
                let from_spans = self.spans_in(file, call.from_ranges)?;
                Ok(OutgoingCall { to, from_spans })
            })
            .collect()
    }

    fn source_file(&mut self, file: &Utf8Path) -> Result<Self::Source, ServiceError> {
        self.load(file)
    }

    fn line_and_character_of(
        &self,
        source: &Self::Source,
        offset: u32,
    ) -> Result<ServicePosition, ServiceError> {
        source.position_of(offset)
    }
}

fn span_of(source: &SourceText, range: Range) -> Result<TextSpan, ServiceError> {
    let start = source.offset_of(ServicePosition::new(range.start.line, range.start.character))?;
    let end = source.offset_of(ServicePosition::new(range.end.line, range.end.character))?;
    Ok(TextSpan::from_bounds(start, end))
}
