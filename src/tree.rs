//! Heading tree construction: folds a flat, depth-tagged heading sequence
//! into a rooted tree.
//!
//! Nodes live in an arena owned by the tree. Children lists are the only
//! ownership path; parent links are plain indices back into the arena. A
//! tree is never patched: every rebuild produces a fresh one.

use crate::types::HeadingRecord;

/// Index of a node inside its `TocTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// One heading in the tree, or the synthetic root.
#[derive(Debug, Clone)]
pub struct TocNode<R> {
    /// Nested headings in document order.
    pub children: Vec<NodeId>,
    /// 0 for the root, 1-6 otherwise.
    pub depth: u8,
    /// Enclosing node; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Handle of the originating heading; `None` only for the root.
    pub source: Option<R>,
    /// Heading text; `None` only for the root.
    pub title: Option<String>,
}

/// A built heading tree with exactly one synthetic root.
#[derive(Debug, Clone)]
pub struct TocTree<R> {
    /// Arena of nodes; the root sits at index 0.
    nodes: Vec<TocNode<R>>,
}

impl<R> TocTree<R> {
    /// Id of the synthetic root.
    const ROOT: NodeId = NodeId(0);

    /// Build the tree with the previous-shallower-heading rule.
    ///
    /// The insertion point starts at the root. For each record, pop the
    /// insertion point while its depth is >= the record's depth, append the
    /// record there, then descend into it. Depth jumps in either direction
    /// are folded, never rejected.
    pub fn build<I>(headings: I) -> Self
    where
        I: IntoIterator<Item = HeadingRecord<R>>,
    {
        let mut nodes = vec![TocNode {
            children: Vec::new(),
            depth: 0,
            parent: None,
            source: None,
            title: None,
        }];
        let mut current = Self::ROOT;

        for record in headings {
            let depth = record.depth.get();
            current = nearest_shallower(&nodes, current, depth);

            let id = NodeId(nodes.len());
            nodes.push(TocNode {
                children: Vec::new(),
                depth,
                parent: Some(current),
                source: Some(record.source),
                title: Some(record.title),
            });
            if let Some(parent) = nodes.get_mut(current.0) {
                parent.children.push(id);
            }
            current = id;
        }

        return Self { nodes };
    }

    /// The synthetic root.
    pub const fn root(&self) -> NodeId {
        return Self::ROOT;
    }

    /// Look a node up. Ids handed out by this tree always resolve.
    pub fn node(&self, id: NodeId) -> Option<&TocNode<R>> {
        return self.nodes.get(id.0);
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        return self.node(id).map_or(&[], |n| return n.children.as_slice());
    }

    /// Whether the root has at least one heading under it.
    pub fn has_headings(&self) -> bool {
        return !self.children(Self::ROOT).is_empty();
    }

    /// Number of headings, not counting the root.
    pub fn len(&self) -> usize {
        return self.nodes.len().saturating_sub(1);
    }
}

/// Walk up from `from` until reaching a node strictly shallower than `depth`.
/// The root has depth 0 and every record depth is at least 1, so the walk
/// stops at the root at the latest.
fn nearest_shallower<R>(nodes: &[TocNode<R>], from: NodeId, depth: u8) -> NodeId {
    let mut current = from;
    while let Some(node) = nodes.get(current.0)
        && node.depth >= depth
    {
        let Some(parent) = node.parent else {
            break;
        };
        current = parent;
    }
    return current;
}
