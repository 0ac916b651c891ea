//! Shared test helpers: a scripted in-memory resolution service.

use std::collections::HashMap;
use std::sync::Arc;

use camino::Utf8Path;

use crate::{
    CallSite, CallableEntity, HierarchyNode, IncomingCall, OutgoingCall, ResolutionService,
    ServiceError, ServicePosition, SourceText, SymbolKind, TextSpan,
};

pub(super) const FILE: &str = "/src/app.ts";

/// Offset of the name within each `function <name>() {}` line.
const NAME_COLUMN: u32 = 9;

#[derive(Debug, Default)]
pub(super) struct CallCounts {
    pub(super) resolve: usize,
    pub(super) callers: usize,
    pub(super) callees: usize,
    /// Relation queries per entity name.
    pub(super) expanded: HashMap<String, usize>,
}

/// A program of one file holding one function per line.
///
/// Function `i` sits on line `i` (0-based), its selection span starts at
/// column 9 and its full span covers the whole line.
#[derive(Debug)]
pub(super) struct FakeService {
    source: Arc<SourceText>,
    entities: Vec<CallableEntity>,
    edges: Vec<(usize, usize)>,
    aliases: Vec<(usize, usize)>,
    failing: Option<usize>,
    resolution_fails: bool,
    source_missing: bool,
    pub(super) counts: CallCounts,
}

impl FakeService {
    pub(super) fn new(names: &[&str]) -> Self {
        let mut text = String::new();
        let mut entities = Vec::with_capacity(names.len());
        for name in names {
            let start = u32::try_from(text.len()).expect("test source fits in u32");
            let line = format!("function {name}() {{}}");
            let length = u32::try_from(line.len()).expect("line fits in u32");
            let name_length = u32::try_from(name.len()).expect("name fits in u32");
            entities.push(
                CallableEntity::new(*name, SymbolKind::Function, FILE, TextSpan::new(start, length))
                    .with_selection_span(TextSpan::new(start + NAME_COLUMN, name_length)),
            );
            text.push_str(&line);
            text.push('\n');
        }
        let source = SourceText::new(FILE, text).expect("test source indexes");
        Self {
            source: Arc::new(source),
            entities,
            edges: Vec::new(),
            aliases: Vec::new(),
            failing: None,
            resolution_fails: false,
            source_missing: false,
            counts: CallCounts::default(),
        }
    }

    fn index_of(&self, name: &str) -> usize {
        self.entities
            .iter()
            .position(|entity| entity.name() == name)
            .unwrap_or_else(|| panic!("unknown function {name}"))
    }

    fn at(&self, index: usize) -> &CallableEntity {
        self.entities.get(index).expect("entity index in range")
    }

    fn index_at(&self, file: &Utf8Path, offset: u32) -> Option<usize> {
        if file != FILE {
            return None;
        }
        self.entities
            .iter()
            .position(|entity| entity.selection_span().start == offset)
    }

    pub(super) fn entity(&self, name: &str) -> CallableEntity {
        self.at(self.index_of(name)).clone()
    }

    /// A call site naming `name`.
    pub(super) fn site(&self, name: &str) -> CallSite {
        let entity = self.at(self.index_of(name));
        CallSite::new(FILE, entity.selection_span(), format!("{name}()"))
    }

    /// A call site past the end of every declaration.
    pub(super) fn unresolved_site(&self) -> CallSite {
        let end = u32::try_from(self.source.text().len()).expect("text fits in u32");
        CallSite::new(FILE, TextSpan::new(end, 0), "missing()")
    }

    pub(super) fn calls(&mut self, caller: &str, callee: &str) -> &mut Self {
        let edge = (self.index_of(caller), self.index_of(callee));
        self.edges.push(edge);
        self
    }

    /// Makes the position of `at` resolve to `also` as a second candidate.
    pub(super) fn also_resolves(&mut self, at: &str, also: &str) -> &mut Self {
        let alias = (self.index_of(at), self.index_of(also));
        self.aliases.push(alias);
        self
    }

    pub(super) fn fail_relations_of(&mut self, name: &str) -> &mut Self {
        self.failing = Some(self.index_of(name));
        self
    }

    pub(super) fn fail_resolution(&mut self) -> &mut Self {
        self.resolution_fails = true;
        self
    }

    pub(super) fn forget_source(&mut self) -> &mut Self {
        self.source_missing = true;
        self
    }

    fn record_expansion(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Option<usize>, ServiceError> {
        let index = self.index_at(file, offset);
        if let Some(found) = index {
            let name = self.at(found).name().to_owned();
            *self.counts.expanded.entry(name).or_default() += 1;
            if self.failing == Some(found) {
                return Err(ServiceError::request("scripted failure"));
            }
        }
        Ok(index)
    }
}

impl ResolutionService for FakeService {
    type Source = Arc<SourceText>;

    fn resolve_callable(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<CallableEntity>, ServiceError> {
        self.counts.resolve += 1;
        if self.resolution_fails {
            return Err(ServiceError::request("scripted resolution failure"));
        }
        let Some(index) = self.index_at(file, offset) else {
            return Ok(Vec::new());
        };
        let mut candidates = vec![self.at(index).clone()];
        candidates.extend(
            self.aliases
                .iter()
                .filter(|(at, _)| *at == index)
                .map(|(_, also)| self.at(*also).clone()),
        );
        Ok(candidates)
    }

    fn callers_of(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<IncomingCall>, ServiceError> {
        self.counts.callers += 1;
        let Some(index) = self.record_expansion(file, offset)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .edges
            .iter()
            .filter(|(_, callee)| *callee == index)
            .map(|(caller, _)| IncomingCall {
                from: self.at(*caller).clone(),
                from_spans: Vec::new(),
            })
            .collect())
    }

    fn callees_of(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<OutgoingCall>, ServiceError> {
        self.counts.callees += 1;
        let Some(index) = self.record_expansion(file, offset)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .edges
            .iter()
            .filter(|(caller, _)| *caller == index)
            .map(|(_, callee)| OutgoingCall {
                to: self.at(*callee).clone(),
                from_spans: Vec::new(),
            })
            .collect())
    }

    fn source_file(&mut self, file: &Utf8Path) -> Result<Self::Source, ServiceError> {
        if self.source_missing || file != FILE {
            return Err(ServiceError::missing_source_file(file));
        }
        Ok(Arc::clone(&self.source))
    }

    fn line_and_character_of(
        &self,
        source: &Self::Source,
        offset: u32,
    ) -> Result<ServicePosition, ServiceError> {
        source.position_of(offset)
    }
}

/// A straight call chain `f0 -> f1 -> ... -> f{length - 1}`.
///
/// Entity `i` occupies offset `i`, and offsets map to line `offset`,
/// character 0, so every lookup is constant time however long the chain is.
/// With a side leaf, `f0` first calls `leaf` (at offset `length`), which
/// completes before the chain is entered.
#[derive(Debug)]
pub(super) struct ChainService {
    length: u32,
    side_leaf: bool,
}

impl ChainService {
    pub(super) const fn new(length: u32) -> Self {
        Self {
            length,
            side_leaf: false,
        }
    }

    pub(super) const fn with_side_leaf(mut self) -> Self {
        self.side_leaf = true;
        self
    }

    pub(super) fn entity(&self, index: u32) -> CallableEntity {
        let name = if index == self.length {
            "leaf".to_owned()
        } else {
            format!("f{index}")
        };
        CallableEntity::new(name, SymbolKind::Function, FILE, TextSpan::new(index, 1))
    }

    fn callees(&self, index: u32) -> Vec<u32> {
        let mut callees = Vec::new();
        if index == 0 && self.side_leaf {
            callees.push(self.length);
        }
        let next = index.saturating_add(1);
        if next < self.length {
            callees.push(next);
        }
        callees
    }
}

impl ResolutionService for ChainService {
    type Source = ();

    fn resolve_callable(
        &mut self,
        file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<CallableEntity>, ServiceError> {
        if file != FILE || offset >= self.length {
            return Ok(Vec::new());
        }
        Ok(vec![self.entity(offset)])
    }

    fn callers_of(
        &mut self,
        _file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<IncomingCall>, ServiceError> {
        Ok(offset
            .checked_sub(1)
            .filter(|_| offset < self.length)
            .map(|caller| IncomingCall {
                from: self.entity(caller),
                from_spans: Vec::new(),
            })
            .into_iter()
            .collect())
    }

    fn callees_of(
        &mut self,
        _file: &Utf8Path,
        offset: u32,
    ) -> Result<Vec<OutgoingCall>, ServiceError> {
        if offset >= self.length {
            return Ok(Vec::new());
        }
        Ok(self
            .callees(offset)
            .into_iter()
            .map(|callee| OutgoingCall {
                to: self.entity(callee),
                from_spans: Vec::new(),
            })
            .collect())
    }

    fn source_file(&mut self, file: &Utf8Path) -> Result<Self::Source, ServiceError> {
        if file == FILE {
            Ok(())
        } else {
            Err(ServiceError::missing_source_file(file))
        }
    }

    fn line_and_character_of(
        &self,
        _source: &Self::Source,
        offset: u32,
    ) -> Result<ServicePosition, ServiceError> {
        Ok(ServicePosition::new(offset, 0))
    }
}

/// Names of a node's children, in order.
pub(super) fn child_names(node: &HierarchyNode) -> Vec<&str> {
    node.children().iter().map(|child| child.name()).collect()
}

/// Renders a tree as indented `id name h=height` lines.
pub(super) fn render(node: &HierarchyNode) -> String {
    let mut lines = Vec::new();
    render_into(node, 0, &mut lines);
    lines.join("\n")
}

fn render_into(node: &HierarchyNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}{} {} h={}",
        "  ".repeat(depth),
        node.id(),
        node.name(),
        node.height()
    ));
    for child in node.children() {
        render_into(child, depth + 1, lines);
    }
}
