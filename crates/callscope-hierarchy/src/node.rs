//! Hierarchy tree nodes.

use std::sync::Arc;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::entity::SymbolKind;
use crate::metrics;

/// Integer identifier of a node, unique within one hierarchy.
///
/// Ids follow pre-order traversal; the synthetic call-site root is always 0.
pub type NodeId = u32;

/// A presented source position.
///
/// `line` is 1-indexed while `character` keeps the service's 0-indexed
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LineCharacter {
    /// Line number (1-based).
    pub line: u32,
    /// Character offset within the line (0-based).
    pub character: u32,
}

impl LineCharacter {
    /// Creates a position from presented coordinates.
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Converts a 0-indexed service position into presented coordinates.
    #[must_use]
    pub const fn from_service(line: u32, character: u32) -> Self {
        Self {
            line: line.saturating_add(1),
            character,
        }
    }
}

/// A presented range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    /// Start position.
    pub start: LineCharacter,
    /// End position.
    pub end: LineCharacter,
}

impl SourceRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(start: LineCharacter, end: LineCharacter) -> Self {
        Self { start, end }
    }
}

/// Descriptive fields carried by every node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    /// Display name.
    pub name: String,
    /// Callable kind.
    pub kind: SymbolKind,
    /// Modifier list, e.g. `export,async`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<String>,
    /// Enclosing container name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// File containing the callable.
    pub file: Utf8PathBuf,
    /// Range of the whole declaration.
    pub range: SourceRange,
    /// Range of the name.
    pub selection_range: SourceRange,
}

/// A node of an incoming or outgoing call hierarchy.
///
/// Children keep the order reported by the resolution service. A child
/// reached twice within one traversal is shared, not rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    id: NodeId,
    #[serde(flatten)]
    details: NodeDetails,
    has_children: bool,
    children: Vec<Arc<HierarchyNode>>,
    height: usize,
}

impl HierarchyNode {
    /// Creates a node and computes its height from the given children.
    #[must_use]
    pub fn new(
        id: NodeId,
        details: NodeDetails,
        has_children: bool,
        children: Vec<Arc<Self>>,
    ) -> Self {
        let height = metrics::height_from_children(&children);
        Self {
            id,
            details,
            has_children,
            children,
            height,
        }
    }

    /// Appends a child and refreshes the cached height.
    pub fn push_child(&mut self, child: Arc<Self>) {
        self.children.push(child);
        self.has_children = true;
        self.height = metrics::height_from_children(&self.children);
    }

    /// Returns the node id.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn details(&self) -> &NodeDetails {
        &self.details
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.details.name
    }

    /// Returns the callable kind.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.details.kind
    }

    /// Returns the fully qualified name including the container.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.details.container.as_ref().map_or_else(
            || self.details.name.clone(),
            |container| format!("{container}.{}", self.details.name),
        )
    }

    /// Returns whether the service reported any relations for this entity.
    #[must_use]
    pub const fn has_children(&self) -> bool {
        self.has_children
    }

    /// Returns the children in service order.
    #[must_use]
    pub fn children(&self) -> &[Arc<Self>] {
        &self.children
    }

    /// Returns the cached subtree height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Iterates over this node and every descendant in pre-order.
    ///
    /// Shared subtrees are yielded once per parent that holds them.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Finds the first node in pre-order with the given simple or qualified
    /// name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Self> {
        self.descendants()
            .find(|node| node.name() == name || node.qualified_name() == name)
    }
}

/// Pre-order iterator returned by [`HierarchyNode::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a HierarchyNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| child.as_ref()));
        Some(node)
    }
}

/// A finished hierarchy rooted at the synthetic call-site node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyTree {
    root: HierarchyNode,
    partial: bool,
}

impl HierarchyTree {
    pub(crate) const fn new(root: HierarchyNode, partial: bool) -> Self {
        Self { root, partial }
    }

    /// Returns the synthetic call-site root.
    #[must_use]
    pub const fn root(&self) -> &HierarchyNode {
        &self.root
    }

    /// Returns whether traversal ran out of stack or hit the recursion cap,
    /// leaving only the subtree completed before that point.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.partial
    }

    /// Consumes the tree and returns its root.
    #[must_use]
    pub fn into_root(self) -> HierarchyNode {
        self.root
    }
}
