//! Durable form of a mind map: a nested record mirroring the tree.
//!
//! ```json
//! {
//!   "title": "My Project",
//!   "root_title": "My Project",
//!   "children": [ { "title": "Features", "children": [] } ]
//! }
//! ```
//!
//! `root_title` is optional on read; older files omit it and the map title is
//! used for the root instead.

use serde::{Deserialize, Serialize};

/// Whole-map record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_title: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

/// Record for a single non-root node and its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub title: String,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

impl MapRecord {
    /// Title the root node gets when this record is loaded.
    pub fn effective_root_title(&self) -> &str {
        self.root_title.as_deref().unwrap_or(&self.title)
    }
}
