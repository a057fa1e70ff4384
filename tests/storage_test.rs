//! Tests for MapStorage (JSON persistence)

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use mindmap::application::services::MapStorage;
use mindmap::application::ApplicationError;
use mindmap::domain::MindMap;
use mindmap::infrastructure::traits::{FileSystem, RealFileSystem};
use mindmap::util::testing;

fn storage_in(temp: &TempDir) -> MapStorage {
    MapStorage::new(Arc::new(RealFileSystem), temp.path().join("data"))
}

fn demo_map() -> MindMap {
    let mut map = MindMap::new("Demo", Some("Centre"));
    let root = map.tree().root();
    let a = map.tree_mut().add_child(root, "Alpha").unwrap();
    map.tree_mut().add_child(a, "Ünïcödé ✓").unwrap();
    map.tree_mut().add_child(root, "Beta").unwrap();
    map
}

#[test]
fn given_map_when_saving_then_creates_directory_and_json_file() {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    let path = storage.save(&demo_map(), "Demo").unwrap();

    assert_eq!(path, temp.path().join("data").join("Demo.json"));
    let content = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["title"], "Demo");
    assert_eq!(value["root_title"], "Centre");
    assert_eq!(value["children"][0]["title"], "Alpha");
    assert!(content.contains("Ünïcödé ✓"), "non-ASCII is written verbatim");
}

#[test]
fn given_saved_map_when_loading_then_record_is_identical() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    let original = demo_map();
    storage.save(&original, "Demo").unwrap();

    let loaded = storage.load("Demo").unwrap();

    assert_eq!(loaded.to_record(), original.to_record());
}

#[test]
fn given_name_with_extension_when_resolving_path_then_does_not_double_it() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    assert_eq!(storage.file_path("Demo.json"), storage.file_path("Demo"));
}

#[test]
fn given_missing_file_when_loading_then_returns_map_not_found() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    let result = storage.load("ghost");

    assert!(
        matches!(result, Err(ApplicationError::MapNotFound { ref name, .. }) if name == "ghost"),
        "got {:?}",
        result.err()
    );
}

#[test]
fn given_invalid_json_when_loading_then_returns_malformed_record() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    fs::create_dir_all(storage.base_dir()).unwrap();
    fs::write(storage.file_path("broken"), "{ not json").unwrap();

    let result = storage.load("broken");

    assert!(matches!(
        result,
        Err(ApplicationError::MalformedRecord { .. })
    ));
}

#[test]
fn given_record_without_title_when_loading_then_returns_malformed_record() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    fs::create_dir_all(storage.base_dir()).unwrap();
    fs::write(storage.file_path("untitled"), r#"{"children": []}"#).unwrap();

    assert!(matches!(
        storage.load("untitled"),
        Err(ApplicationError::MalformedRecord { .. })
    ));
}

#[test]
fn given_legacy_file_without_root_title_when_loading_then_root_uses_map_title() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    fs::create_dir_all(storage.base_dir()).unwrap();
    fs::write(
        storage.file_path("legacy"),
        r#"{"title": "Old Map", "children": [{"title": "Idea", "children": []}]}"#,
    )
    .unwrap();

    let map = storage.load("legacy").unwrap();

    assert_eq!(map.title, "Old Map");
    assert_eq!(map.root_title(), "Old Map");
    assert_eq!(map.stats().node_count, 2);
}

#[test]
fn given_mixed_directory_when_listing_then_returns_only_json_stems() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    storage.save(&demo_map(), "one").unwrap();
    storage.save(&demo_map(), "two").unwrap();
    fs::write(storage.base_dir().join("notes.txt"), "x").unwrap();
    fs::create_dir_all(storage.base_dir().join("dir.json")).unwrap();

    let mut names = storage.list_saved().unwrap();
    names.sort();

    assert_eq!(names, vec!["one", "two"]);
}

#[test]
fn given_missing_directory_when_listing_then_returns_empty() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);

    assert!(storage.list_saved().unwrap().is_empty());
}

#[test]
fn given_map_deeper_than_json_nesting_limit_when_round_tripping_then_loads_intact() {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    let mut map = MindMap::new("Deep", None);
    let mut current = map.tree().root();
    for i in 0..200 {
        current = map.tree_mut().add_child(current, &format!("level {i}")).unwrap();
    }
    storage.save(&map, "deep").unwrap();

    let loaded = storage.load("deep").expect("deep map loads");

    assert_eq!(loaded.stats().max_depth, 200);
    assert_eq!(loaded.to_record(), map.to_record());
}

#[test]
fn given_trailing_garbage_when_loading_then_returns_malformed_record() {
    let temp = TempDir::new().unwrap();
    let storage = storage_in(&temp);
    fs::create_dir_all(storage.base_dir()).unwrap();
    fs::write(storage.file_path("tail"), r#"{"title": "T"} extra"#).unwrap();

    assert!(matches!(
        storage.load("tail"),
        Err(ApplicationError::MalformedRecord { .. })
    ));
}

// ============================================================
// In-memory filesystem
// ============================================================

#[derive(Default)]
struct MemoryFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl FileSystem for MemoryFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .lock()
            .unwrap()
            .keys()
            .any(|p| p.parent() == Some(path))
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}

#[test]
fn given_in_memory_filesystem_when_saving_and_listing_then_storage_uses_it() {
    let memory = Arc::new(MemoryFs::default());
    let storage = MapStorage::new(memory.clone(), "maps");

    storage.save(&demo_map(), "Demo").unwrap();
    memory.write(Path::new("maps/notes.txt"), "x").unwrap();

    assert_eq!(storage.list_saved().unwrap(), vec!["Demo"]);
    assert_eq!(storage.load("Demo").unwrap().to_record(), demo_map().to_record());
    assert!(memory.is_file(Path::new("maps/Demo.json")));
}
