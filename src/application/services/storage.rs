//! Persistence of mind maps as JSON files
//!
//! One file per map, named `<name>.json`, inside a base directory that is
//! created on first save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{MapRecord, MindMap};
use crate::infrastructure::traits::FileSystem;

/// File extension of stored maps (without the dot).
pub const MAP_EXTENSION: &str = "json";

/// Service for saving, loading and listing mind map files.
pub struct MapStorage {
    fs: Arc<dyn FileSystem>,
    base_dir: PathBuf,
}

impl MapStorage {
    pub fn new(fs: Arc<dyn FileSystem>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Full path for `name`, appending `.json` unless already present.
    pub fn file_path(&self, name: &str) -> PathBuf {
        let suffix = format!(".{MAP_EXTENSION}");
        if name.ends_with(&suffix) {
            self.base_dir.join(name)
        } else {
            self.base_dir.join(format!("{name}{suffix}"))
        }
    }

    /// Serialize `map` and write it under `name`. Returns the written path.
    #[instrument(level = "debug", skip(self, map), fields(map = %map.title))]
    pub fn save(&self, map: &MindMap, name: &str) -> ApplicationResult<PathBuf> {
        self.fs
            .create_dir_all(&self.base_dir)
            .with_path_context("create data directory", &self.base_dir)?;

        let path = self.file_path(name);
        let json = serde_json::to_string_pretty(&map.to_record()).map_err(|e| {
            ApplicationError::OperationFailed {
                context: format!("serialize mind map '{}'", map.title),
                source: Box::new(e),
            }
        })?;
        self.fs
            .write(&path, &json)
            .with_path_context("write mind map", &path)?;

        debug!("saved {}", path.display());
        Ok(path)
    }

    /// Read and rebuild the map stored under `name`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, name: &str) -> ApplicationResult<MindMap> {
        let path = self.file_path(name);
        if !self.fs.is_file(&path) {
            return Err(ApplicationError::MapNotFound {
                name: name.to_string(),
                path,
            });
        }

        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read mind map", &path)?;
        let record = parse_record(&content).map_err(|source| {
            warn!("cannot parse {}: {}", path.display(), source);
            ApplicationError::MalformedRecord {
                path: path.clone(),
                source,
            }
        })?;

        Ok(MindMap::from_record(&record))
    }

    /// Base names of all stored maps, in directory order.
    ///
    /// A missing base directory yields an empty list.
    #[instrument(level = "debug", skip(self))]
    pub fn list_saved(&self) -> ApplicationResult<Vec<String>> {
        if !self.fs.is_dir(&self.base_dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .fs
            .list_dir(&self.base_dir)
            .with_path_context("list data directory", &self.base_dir)?;

        let names = entries
            .iter()
            .filter(|p| self.fs.is_file(p))
            .filter(|p| p.extension().is_some_and(|ext| ext == MAP_EXTENSION))
            .filter_map(|p| p.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }
}

/// Parse a map record of any nesting depth.
///
/// Each tree level adds an object and an array, so serde_json's default
/// recursion limit would reject maps deeper than about 62 levels. The limit is
/// lifted and the stack grows on demand instead.
fn parse_record(content: &str) -> serde_json::Result<MapRecord> {
    let mut json = serde_json::Deserializer::from_str(content);
    json.disable_recursion_limit();
    let record = MapRecord::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(record)
}
