//! Tree node stored in the arena, and a read-only view over it.

use std::fmt;

use generational_arena::Index;

use crate::domain::tree::NodeTree;

/// Stable handle to a node inside a [`NodeTree`].
///
/// Handles become stale once the node (or one of its ancestors) is removed;
/// lookups with a stale handle return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// Tree node in the arena-based hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    /// Display title, stored verbatim
    pub title: String,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<NodeId>,
    /// Indices of child nodes, in insertion (= display) order
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(title: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            title: title.into(),
            parent,
            children: Vec::new(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Borrowed view of a live node together with the tree it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a NodeTree,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a NodeTree, id: NodeId, node: &'a Node) -> Self {
        Self { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn title(&self) -> &'a str {
        &self.node.title
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    pub fn children(&self) -> &'a [NodeId] {
        &self.node.children
    }

    pub fn is_root(&self) -> bool {
        self.id == self.tree.root()
    }

    /// Depth counted from the root (level 0).
    pub fn level(&self) -> usize {
        // a live node always resolves
        self.tree.level(self.id).unwrap_or(0)
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}
