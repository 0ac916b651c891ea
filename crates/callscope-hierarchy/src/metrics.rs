//! Subtree height computation.

use std::sync::Arc;

use crate::node::HierarchyNode;

/// Computes the height of `node` by walking its whole subtree.
///
/// A leaf has height 0; any other node is one more than its tallest child.
/// Cached heights stored on the nodes are ignored.
#[must_use]
pub fn height(node: &HierarchyNode) -> usize {
    node.children()
        .iter()
        .map(|child| height(child))
        .max()
        .map_or(0, |tallest| tallest.saturating_add(1))
}

/// Computes a height from children whose own heights are already final.
#[must_use]
pub fn height_from_children(children: &[Arc<HierarchyNode>]) -> usize {
    children
        .iter()
        .map(|child| child.height())
        .max()
        .map_or(0, |tallest| tallest.saturating_add(1))
}
