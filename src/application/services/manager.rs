//! Mind map session service
//!
//! Holds at most one active map and turns user-level operations into tree and
//! storage calls. Mutating operations report an [`Outcome`] instead of failing.

use tracing::{debug, info, instrument};

use crate::application::services::storage::MapStorage;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{require_title, DomainError, MindMap, NodeId};

/// Token that always selects the root node.
pub const ROOT_ALIAS: &str = "root";

/// Result of a user-level operation: whether it succeeded plus a message for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub succeeded: bool,
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }
}

impl From<ApplicationResult<String>> for Outcome {
    fn from(result: ApplicationResult<String>) -> Self {
        match result {
            Ok(message) => Outcome::ok(message),
            Err(e) => Outcome::failed(e.to_string()),
        }
    }
}

/// Summary of the active map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapInfo {
    pub title: String,
    pub root_title: String,
    pub node_count: usize,
    pub max_depth: usize,
}

pub struct MindMapManager {
    storage: MapStorage,
    current: Option<MindMap>,
}

impl MindMapManager {
    pub fn new(storage: MapStorage) -> Self {
        Self {
            storage,
            current: None,
        }
    }

    pub fn storage(&self) -> &MapStorage {
        &self.storage
    }

    pub fn current_map(&self) -> Option<&MindMap> {
        self.current.as_ref()
    }

    fn active(&self) -> ApplicationResult<&MindMap> {
        self.current.as_ref().ok_or(ApplicationError::NoActiveMap)
    }

    fn active_mut(&mut self) -> ApplicationResult<&mut MindMap> {
        self.current.as_mut().ok_or(ApplicationError::NoActiveMap)
    }

    /// Start a new map, replacing the active one. A blank root title falls back to the map title.
    #[instrument(level = "debug", skip(self))]
    pub fn create_map(&mut self, title: &str, root_title: Option<&str>) -> Outcome {
        self.try_create_map(title, root_title).into()
    }

    fn try_create_map(&mut self, title: &str, root_title: Option<&str>) -> ApplicationResult<String> {
        let title = require_title(title, "Map title")?;
        let root_title = root_title.map(str::trim).filter(|t| !t.is_empty());

        self.current = Some(MindMap::new(title, root_title));
        info!("created map '{}'", title);
        Ok(match root_title {
            Some(root) => format!("Created new mind map: '{title}' with root node: '{root}'"),
            None => format!("Created new mind map: '{title}'"),
        })
    }

    /// Persist the active map. Without a name, the map title is used with spaces replaced by `_`.
    #[instrument(level = "debug", skip(self))]
    pub fn save_map(&self, name: Option<&str>) -> Outcome {
        self.try_save_map(name).into()
    }

    fn try_save_map(&self, name: Option<&str>) -> ApplicationResult<String> {
        let map = self.active()?;
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n.to_string(),
            None => default_file_name(&map.title),
        };
        let path = self.storage.save(map, &name)?;
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or(name);
        Ok(format!("Map saved as '{file}'"))
    }

    /// Replace the active map with a stored one; on failure the active map is kept.
    #[instrument(level = "debug", skip(self))]
    pub fn load_map(&mut self, name: &str) -> Outcome {
        self.try_load_map(name).into()
    }

    fn try_load_map(&mut self, name: &str) -> ApplicationResult<String> {
        let name = require_title(name, "Map name")?;
        let map = self.storage.load(name)?;
        let message = format!("Loaded map: {}", map.title);
        self.current = Some(map);
        Ok(message)
    }

    pub fn list_maps(&self) -> ApplicationResult<Vec<String>> {
        self.storage.list_saved()
    }

    /// Add `title` under the node named `parent` (`root` or the root's title select the root).
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(&mut self, parent: &str, title: &str) -> Outcome {
        self.try_add_node(parent, title).into()
    }

    fn try_add_node(&mut self, parent: &str, title: &str) -> ApplicationResult<String> {
        let title = require_title(title, "Node title")?;
        let parent = require_title(parent, "Parent node")?;
        let map = self.active_mut()?;

        let (parent_id, parent_title) = if is_root_alias(parent, map.root_title()) {
            (map.root_id(), map.root_title().to_string())
        } else {
            let id = map
                .search_node(parent)
                .ok_or_else(|| DomainError::ParentNotFound(parent.to_string()))?;
            (id, parent.to_string())
        };

        map.tree_mut()
            .add_child(parent_id, title)
            .ok_or_else(|| DomainError::ParentNotFound(parent.to_string()))?;
        debug!("added '{}' under '{}'", title, parent_title);
        Ok(format!("Added '{title}' under '{parent_title}'"))
    }

    /// Remove the first node titled `title` together with its subtree. The root is protected.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&mut self, title: &str) -> Outcome {
        self.try_delete_node(title).into()
    }

    fn try_delete_node(&mut self, title: &str) -> ApplicationResult<String> {
        let title = require_title(title, "Node title")?;
        let map = self.active_mut()?;

        let id = map
            .search_node(title)
            .ok_or_else(|| DomainError::NodeNotFound(title.to_string()))?;
        let node = map
            .node(id)
            .ok_or_else(|| DomainError::NodeNotFound(title.to_string()))?;
        let Some(parent) = node.parent() else {
            return Err(DomainError::RootDeletion.into());
        };

        if !map.tree_mut().remove_child(parent, id) {
            return Err(DomainError::DetachFailed(title.to_string()).into());
        }
        info!("deleted '{}'", title);
        Ok(format!("Deleted node '{title}'"))
    }

    /// Retitle the first node matching `title`.
    #[instrument(level = "debug", skip(self))]
    pub fn rename_node(&mut self, title: &str, new_title: &str) -> Outcome {
        self.try_rename_node(title, new_title).into()
    }

    fn try_rename_node(&mut self, title: &str, new_title: &str) -> ApplicationResult<String> {
        let new_title = require_title(new_title, "New title")?;
        self.active()?;
        let id = self
            .search_node(title)
            .ok_or_else(|| DomainError::NodeNotFound(title.to_string()))?;
        let map = self.active_mut()?;
        map.tree_mut().rename(id, new_title);
        Ok(format!("Renamed '{title}' to '{new_title}'"))
    }

    /// First node matching `title`; the token `root` selects the root.
    pub fn search_node(&self, title: &str) -> Option<NodeId> {
        let map = self.current.as_ref()?;
        if title.trim().eq_ignore_ascii_case(ROOT_ALIAS) {
            return Some(map.root_id());
        }
        map.search_node(title.trim())
    }

    pub fn display_map(&self) -> Option<String> {
        self.current.as_ref().map(MindMap::render_outline)
    }

    pub fn map_info(&self) -> Option<MapInfo> {
        let map = self.current.as_ref()?;
        let stats = map.stats();
        Some(MapInfo {
            title: map.title.clone(),
            root_title: map.root_title().to_string(),
            node_count: stats.node_count,
            max_depth: stats.max_depth,
        })
    }
}

/// File name derived from a map title.
pub fn default_file_name(title: &str) -> String {
    title.replace(' ', "_")
}

fn is_root_alias(parent: &str, root_title: &str) -> bool {
    parent.to_lowercase() == ROOT_ALIAS || parent.to_lowercase() == root_title.to_lowercase()
}
