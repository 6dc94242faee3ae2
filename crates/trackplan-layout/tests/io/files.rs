use std::sync::Arc;

use tempfile::tempdir;
use trackplan_core::Node;
use trackplan_layout::{EditorSettings, Layout, LayoutDocument, PieceCatalog, LAYOUT_FILE_EXTENSION};

#[test]
fn test_save_and_load_layout_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(format!("yard.{}", LAYOUT_FILE_EXTENSION));
    let catalog = Arc::new(PieceCatalog::standard());

    let mut layout = Layout::new(catalog.clone());
    layout.set_settings(EditorSettings {
        snap_size: 16.0,
        ..EditorSettings::default()
    });
    let first = layout.place_piece("straight").unwrap();
    let second = layout.place_next("straight").unwrap();
    layout
        .group_nodes(&[Node::Piece(first), Node::Piece(second)], false)
        .unwrap();
    layout.save(&path).unwrap();

    let loaded = Layout::load(&path, catalog).unwrap();
    assert_eq!(loaded.piece_count(), 2);
    assert_eq!(loaded.group_count(), 1);
    assert_eq!(loaded.settings().snap_size, 16.0);
    assert_eq!(loaded.piece(first).unwrap().linked_count(), 1);
    assert_eq!(loaded.owner_of(Node::Piece(first)), loaded.owner_of(Node::Piece(second)));
    assert!(loaded.audit().is_empty(), "{:?}", loaded.audit());
}

#[test]
fn test_load_reports_bad_files() {
    let dir = tempdir().unwrap();
    let catalog = Arc::new(PieceCatalog::standard());

    let missing = dir.path().join("missing.tpl.json");
    assert!(Layout::load(&missing, catalog.clone()).is_err());

    let garbage = dir.path().join("garbage.tpl.json");
    std::fs::write(&garbage, "{ not json").unwrap();
    assert!(Layout::load(&garbage, catalog.clone()).is_err());

    let empty = dir.path().join("empty.tpl.json");
    std::fs::write(&empty, r#"{"version": 2, "date": "2024-05-01T12:00:00Z", "layers": []}"#)
        .unwrap();
    let err = LayoutDocument::load_from_file(&empty, &catalog).unwrap_err();
    assert!(err.to_string().contains("Invalid layout file"));
}
