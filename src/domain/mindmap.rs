//! Mind map: a titled tree with whole-tree queries and (de)serialization.

use tracing::{debug, instrument};

use crate::domain::node::{NodeId, NodeRef};
use crate::domain::record::MapRecord;
use crate::domain::tree::NodeTree;

/// Node count and depth of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapStats {
    pub node_count: usize,
    /// Level of the deepest node; 0 for a map with only a root
    pub max_depth: usize,
}

#[derive(Debug, Clone)]
pub struct MindMap {
    /// Map identity, also used to derive default file names
    pub title: String,
    tree: NodeTree,
}

impl MindMap {
    /// Create a map whose root is titled `root_title`, or the map title when absent.
    pub fn new(title: &str, root_title: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            tree: NodeTree::new(root_title.unwrap_or(title)),
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root()
    }

    /// Title of the root node.
    pub fn root_title(&self) -> &str {
        self.tree
            .get(self.tree.root())
            .map(|root| root.title())
            .unwrap_or(self.title.as_str())
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.tree.get(id)
    }

    /// First node in pre-order whose title equals `title`, ignoring case.
    pub fn search_node(&self, title: &str) -> Option<NodeId> {
        self.search_node_from(title, self.tree.root())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn search_node_from(&self, title: &str, start: NodeId) -> Option<NodeId> {
        let needle = title.to_lowercase();
        let found = self
            .tree
            .iter_from(start)
            .find(|node| node.title().to_lowercase() == needle)
            .map(|node| node.id());
        debug!("search '{}': {:?}", title, found);
        found
    }

    /// Titles from the root down to `id`, inclusive.
    pub fn get_path(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = self.tree.get(id);
        while let Some(node) = current {
            path.push(node.title().to_string());
            current = node.parent().and_then(|p| self.tree.get(p));
        }
        path.reverse();
        path
    }

    pub fn stats(&self) -> MapStats {
        MapStats {
            node_count: self.tree.len(),
            max_depth: self.tree.max_depth(),
        }
    }

    /// Indented outline, two spaces per level, one `- title` line per node.
    pub fn render_outline(&self) -> String {
        self.tree
            .iter()
            .map(|node| format!("{}- {}", "  ".repeat(node.level()), node.title()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_record(&self) -> MapRecord {
        let children = self
            .tree
            .get(self.tree.root())
            .map(|root| root.children())
            .unwrap_or_default();
        MapRecord {
            title: self.title.clone(),
            root_title: Some(self.root_title().to_string()),
            children: children
                .iter()
                .filter_map(|&c| self.tree.to_record(c))
                .collect(),
        }
    }

    /// Rebuild a map from its record; a missing `root_title` falls back to the map title.
    #[instrument(level = "debug", skip(record), fields(title = %record.title))]
    pub fn from_record(record: &MapRecord) -> Self {
        let mut map = Self::new(&record.title, Some(record.effective_root_title()));
        let root = map.tree.root();
        for child in &record.children {
            let attached = map.tree.attach_record(root, child);
            debug_assert!(attached.is_some(), "root of a fresh tree is live");
        }
        map
    }
}
