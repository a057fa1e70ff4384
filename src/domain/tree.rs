use generational_arena::Arena;
use tracing::instrument;

use crate::domain::node::{Node, NodeId, NodeRef};
use crate::domain::record::NodeRecord;

/// Arena-based tree with exactly one root.
///
/// Parents own their children through the ordered `children` list; the
/// `parent` field on each node is a plain index and never keeps a node alive.
/// Removing a node frees its whole subtree from the arena, so no stale
/// back-reference stays reachable from the root.
#[derive(Debug, Clone)]
pub struct NodeTree {
    arena: Arena<Node>,
    root: NodeId,
}

impl NodeTree {
    pub fn new(root_title: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Node::new(root_title, None)));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id.0).map(|node| NodeRef::new(self, id, node))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// A tree always holds its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Appends a new node titled `title` as the last child of `parent`.
    ///
    /// Returns `None` only when `parent` is not a live node of this tree.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, title: &str) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let child = NodeId(self.arena.insert(Node::new(title, Some(parent))));
        self.arena.get_mut(parent.0)?.children.push(child);
        Some(child)
    }

    /// Detaches `child` from `parent` and frees the whole subtree.
    ///
    /// Only direct children are considered. Returns whether anything was removed.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(parent_node) = self.arena.get_mut(parent.0) else {
            return false;
        };
        let Some(pos) = parent_node.children.iter().position(|&c| c == child) else {
            return false;
        };
        parent_node.children.remove(pos);

        let doomed: Vec<NodeId> = self.iter_from(child).map(|n| n.id()).collect();
        for id in doomed {
            self.arena.remove(id.0);
        }
        true
    }

    /// Depth of `id` counted by walking parent links; the root is level 0.
    pub fn level(&self, id: NodeId) -> Option<usize> {
        let mut current = self.arena.get(id.0)?;
        let mut level = 0;
        while let Some(parent) = current.parent {
            current = self.arena.get(parent.0)?;
            level += 1;
        }
        Some(level)
    }

    pub fn rename(&mut self, id: NodeId, title: &str) -> bool {
        match self.arena.get_mut(id.0) {
            Some(node) => {
                node.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Pre-order traversal of the whole tree.
    pub fn iter(&self) -> PreOrderIter<'_> {
        self.iter_from(self.root)
    }

    /// Pre-order traversal of the subtree rooted at `start`.
    pub fn iter_from(&self, start: NodeId) -> PreOrderIter<'_> {
        PreOrderIter::new(self, start)
    }

    /// Largest level of any node; a root without children has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn max_depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            if let Some(node) = self.arena.get(id.0) {
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
        max
    }

    /// Structural snapshot of the subtree at `id`.
    pub fn to_record(&self, id: NodeId) -> Option<NodeRecord> {
        let node = self.arena.get(id.0)?;
        Some(NodeRecord {
            title: node.title.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.to_record(c))
                .collect(),
        })
    }

    /// Rebuilds `record` (and its descendants) as the last child of `parent`.
    #[instrument(level = "trace", skip(self, record))]
    pub fn attach_record(&mut self, parent: NodeId, record: &NodeRecord) -> Option<NodeId> {
        let top = self.add_child(parent, &record.title)?;
        let mut stack: Vec<(&NodeRecord, NodeId)> =
            record.children.iter().rev().map(|r| (r, top)).collect();

        while let Some((current, parent_id)) = stack.pop() {
            let id = self.add_child(parent_id, &current.title)?;
            stack.extend(current.children.iter().rev().map(|r| (r, id)));
        }
        Some(top)
    }
}

/// Depth-first, pre-order iterator: node first, then children left to right.
pub struct PreOrderIter<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a NodeTree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children().iter().rev());
                return Some(node);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_tree_when_inspected_then_root_is_only_node_at_level_zero() {
        let tree = NodeTree::new("root");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.level(tree.root()), Some(0));
        assert_eq!(tree.max_depth(), 0);
    }

    #[test]
    fn given_stale_parent_when_adding_child_then_returns_none() {
        let mut tree = NodeTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        assert!(tree.remove_child(tree.root(), a));

        assert_eq!(tree.add_child(a, "orphan"), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn given_nested_children_when_iterating_then_visits_in_pre_order() {
        let mut tree = NodeTree::new("r");
        let a = tree.add_child(tree.root(), "a").unwrap();
        tree.add_child(a, "a1").unwrap();
        tree.add_child(a, "a2").unwrap();
        tree.add_child(tree.root(), "b").unwrap();

        let titles: Vec<&str> = tree.iter().map(|n| n.title()).collect();
        assert_eq!(titles, vec!["r", "a", "a1", "a2", "b"]);
    }
}
