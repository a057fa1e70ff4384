//! Tests for MindMap search, paths and record round-trips

use mindmap::domain::{MapRecord, MindMap, NodeId, NodeRecord};

/// My Project
///   Features
///     User Interface
///       Responsive design
///     API
///   Tasks
fn project_map() -> MindMap {
    let mut map = MindMap::new("My Project", None);
    let root = map.tree().root();
    let tree = map.tree_mut();
    let features = tree.add_child(root, "Features").unwrap();
    tree.add_child(root, "Tasks").unwrap();
    let ui = tree.add_child(features, "User Interface").unwrap();
    tree.add_child(features, "API").unwrap();
    tree.add_child(ui, "Responsive design").unwrap();
    map
}

fn all_ids(map: &MindMap) -> Vec<NodeId> {
    map.tree().iter().map(|n| n.id()).collect()
}

#[test]
fn given_project_map_when_searching_leaf_then_returns_level_and_path() {
    let map = project_map();

    let id = map.search_node("Responsive design").expect("found");
    let node = map.node(id).unwrap();

    assert_eq!(node.level(), 3);
    assert_eq!(
        map.get_path(id),
        vec!["My Project", "Features", "User Interface", "Responsive design"]
    );
}

#[test]
fn given_upper_case_title_when_searching_lower_case_then_finds_and_keeps_case() {
    let map = project_map();

    let id = map.search_node("api").expect("case-insensitive match");

    assert_eq!(map.node(id).unwrap().title(), "API");
    assert_eq!(map.get_path(id).last().map(String::as_str), Some("API"));
}

#[test]
fn given_missing_title_when_searching_then_returns_none() {
    let map = project_map();
    assert_eq!(map.search_node("Nope"), None);
}

#[test]
fn given_duplicate_titles_when_searching_then_returns_first_in_pre_order() {
    let mut map = MindMap::new("Dups", None);
    let root = map.tree().root();
    let a = map.tree_mut().add_child(root, "a").unwrap();
    let deep = map.tree_mut().add_child(a, "Same").unwrap();
    map.tree_mut().add_child(root, "same").unwrap();

    assert_eq!(map.search_node("same"), Some(deep));
}

#[test]
fn given_start_node_when_searching_from_then_only_subtree_is_searched() {
    let map = project_map();
    let features = map.search_node("Features").unwrap();

    assert!(map.search_node_from("Tasks", features).is_none());
    assert!(map.search_node_from("API", features).is_some());
}

#[test]
fn given_every_node_when_getting_path_then_length_is_level_plus_one() {
    let map = project_map();

    for id in all_ids(&map) {
        let node = map.node(id).unwrap();
        let path = map.get_path(id);
        assert_eq!(path.len(), node.level() + 1);
        assert_eq!(path.first().map(String::as_str), Some("My Project"));
        assert_eq!(path.last().map(String::as_str), Some(node.title()));
    }
}

#[test]
fn given_distinct_root_title_when_created_then_root_uses_it() {
    let map = MindMap::new("Map", Some("Central idea"));
    assert_eq!(map.title, "Map");
    assert_eq!(map.root_title(), "Central idea");
}

#[test]
fn given_renamed_root_when_reading_root_title_then_reflects_new_title() {
    let mut map = MindMap::new("Map", None);
    let root = map.root_id();

    assert!(map.tree_mut().rename(root, "Hub"));

    assert_eq!(map.root_title(), "Hub");
    assert_eq!(map.title, "Map");
    assert_eq!(map.to_record().root_title.as_deref(), Some("Hub"));
}

#[test]
fn given_project_map_when_computing_stats_then_counts_nodes_and_depth() {
    let stats = project_map().stats();
    assert_eq!(stats.node_count, 6);
    assert_eq!(stats.max_depth, 3);
}

#[test]
fn given_project_map_when_rendering_outline_then_indents_two_spaces_per_level() {
    let outline = project_map().render_outline();
    let expected = "\
- My Project
  - Features
    - User Interface
      - Responsive design
    - API
  - Tasks";
    assert_eq!(outline, expected);
}

// ============================================================
// Records
// ============================================================

#[test]
fn given_project_map_when_round_tripping_record_then_shape_and_titles_match() {
    let map = project_map();

    let record = map.to_record();
    let restored = MindMap::from_record(&record);

    assert_eq!(restored.to_record(), record);
    assert_eq!(restored.render_outline(), map.render_outline());
}

#[test]
fn given_root_only_map_when_round_tripping_then_children_stay_empty() {
    let map = MindMap::new("Empty", None);

    let restored = MindMap::from_record(&map.to_record());

    assert_eq!(restored.stats().node_count, 1);
    assert!(restored.to_record().children.is_empty());
}

#[test]
fn given_deep_tree_when_round_tripping_then_depth_is_preserved() {
    let mut map = MindMap::new("Deep", None);
    let mut current = map.tree().root();
    for i in 0..8 {
        current = map.tree_mut().add_child(current, &format!("level {i}")).unwrap();
        map.tree_mut().add_child(current, &format!("sibling {i}")).unwrap();
    }

    let restored = MindMap::from_record(&map.to_record());

    assert_eq!(restored.stats(), map.stats());
    assert_eq!(restored.stats().max_depth, 8);
    assert_eq!(restored.to_record(), map.to_record());
}

#[test]
fn given_record_without_root_title_when_loading_then_root_uses_map_title() {
    let record = MapRecord {
        title: "Legacy".to_string(),
        root_title: None,
        children: vec![NodeRecord {
            title: "Child".to_string(),
            children: vec![],
        }],
    };

    let map = MindMap::from_record(&record);

    assert_eq!(map.root_title(), "Legacy");
    assert_eq!(map.to_record().root_title.as_deref(), Some("Legacy"));
    assert!(map.search_node("child").is_some());
}

#[test]
fn given_record_json_with_missing_children_when_parsing_then_defaults_to_empty() {
    let record: MapRecord = serde_json::from_str(r#"{"title": "Bare"}"#).unwrap();
    assert!(record.children.is_empty());
    assert_eq!(record.effective_root_title(), "Bare");
}
