use std::f64::consts::PI;
use std::sync::Arc;

use trackplan_core::{ConnectionError, Error, LayoutError, LengthUnit, Node, Pose};
use trackplan_layout::{
    is_valid_layout, ConnectorOffset, IdPolicy, Layout, LayoutDocument, PieceCatalog, ShapeKind,
};

fn catalog() -> Arc<PieceCatalog> {
    Arc::new(PieceCatalog::standard())
}

/// A chain of three in a nested permanent group, a loose baseplate and a
/// shape on a second, hidden layer.
fn sample_layout() -> Layout {
    let mut layout = Layout::new(catalog());
    let a = layout.place_piece("straight").unwrap();
    let b = layout.place_next("curve").unwrap();
    let c = layout.place_next("straight").unwrap();
    let inner = layout
        .group_nodes(&[Node::Piece(a), Node::Piece(b)], false)
        .unwrap();
    layout
        .group_nodes(&[Node::Group(inner), Node::Piece(c)], false)
        .unwrap();
    layout
        .add_piece("baseplate", Pose::new(0.0, 2000.0, 0.0))
        .unwrap();

    let open = layout.piece(a).unwrap().connections()[0].id;
    layout
        .set_connection_offset(open, ConnectorOffset::new(140.0, PI, PI))
        .unwrap();

    let shapes = layout.add_layer("Shapes");
    layout.set_active_layer(shapes).unwrap();
    layout.add_piece("shape", Pose::new(-500.0, 0.0, 0.3)).unwrap();
    layout.set_layer_visible(shapes, false).unwrap();
    layout.view.zoom = 2.5;
    layout
}

#[test]
fn test_document_round_trip_keeps_topology() {
    let layout = sample_layout();
    let document = layout.to_document().unwrap();
    let value = document.to_value().unwrap();
    assert!(is_valid_layout(&value, &PieceCatalog::standard()));

    let decoded = LayoutDocument::from_value(value, &PieceCatalog::standard()).unwrap();
    assert_eq!(decoded, document);

    let restored = Layout::from_document(&decoded, catalog()).unwrap();
    assert!(restored.audit().is_empty(), "{:?}", restored.audit());
    assert_eq!(restored.piece_count(), layout.piece_count());
    assert_eq!(restored.group_count(), layout.group_count());
    assert_eq!(restored.layers().len(), 2);
    assert!(!restored.layers()[1].is_visible());
    assert_eq!(restored.layers()[1].name(), "Shapes");
    assert_eq!(restored.view.zoom, 2.5);

    for piece in layout.pieces() {
        for conn in piece.connections() {
            let copy = restored.connection(conn.id).unwrap();
            assert_eq!(copy.other(), conn.other());
            assert_eq!(copy.has_custom_offset(), conn.has_custom_offset());
            assert!(restored
                .connection_pose(conn.id)
                .unwrap()
                .near(&layout.connection_pose(conn.id).unwrap()));
        }
    }
    for layer in layout.layers() {
        assert_eq!(
            restored.open_connection_count(layer.id()).unwrap(),
            layout.open_connection_count(layer.id()).unwrap()
        );
    }
}

#[test]
fn test_second_round_trip_is_stable() {
    let layout = sample_layout();
    let first = layout.to_document().unwrap();
    let restored = Layout::from_document(&first, catalog()).unwrap();
    let second = restored.to_document().unwrap();
    assert_eq!(first.layers, second.layers);
    assert_eq!(first.config, second.config);
}

#[test]
fn test_style_data_is_written() {
    let layout = sample_layout();
    let document = layout.to_document().unwrap();

    let baseplate = document.layers[0]
        .components
        .iter()
        .find(|c| c.alias == "baseplate")
        .unwrap();
    assert_eq!(baseplate.units, Some(LengthUnit::Studs));
    assert_eq!(baseplate.width, Some(512.0));
    assert!(baseplate.connections.is_empty());

    let shape = &document.layers[1].components[0];
    assert_eq!(shape.shape, Some(ShapeKind::Rectangle));
    assert!(shape.color.is_some());

    let straight = &document.layers[0].components[0];
    assert!(straight.connections[0].offset.is_some());
    assert!(straight.connections[1].offset.is_none());
    assert_eq!(document.layers[0].groups.as_ref().map(Vec::len), Some(2));
    assert!(document.layers[1].groups.is_none());
}

#[test]
fn test_group_member_order_survives_reload_and_clone() {
    let mut layout = Layout::new(catalog());
    let a = layout.place_piece("straight").unwrap();
    let b = layout.place_next("straight").unwrap();
    let c = layout.place_next("straight").unwrap();
    let inner = layout
        .group_nodes(&[Node::Piece(b), Node::Piece(a)], false)
        .unwrap();
    let outer = layout
        .group_nodes(&[Node::Piece(c), Node::Group(inner)], false)
        .unwrap();
    let leaves = layout.leaves(Node::Group(outer));

    let restored = Layout::from_document(&layout.to_document().unwrap(), catalog()).unwrap();
    assert_eq!(
        restored.group(outer).unwrap().members(),
        &[Node::Piece(c), Node::Group(inner)]
    );
    assert_eq!(
        restored.group(inner).unwrap().members(),
        &[Node::Piece(b), Node::Piece(a)]
    );
    assert_eq!(restored.leaves(Node::Group(outer)), leaves);

    let copy = layout.clone_node(Node::Group(outer), 0.0, 600.0).unwrap();
    let Node::Group(copy) = copy else {
        panic!("expected a group, got {}", copy);
    };
    let members = layout.group(copy).unwrap().members();
    assert!(matches!(members, [Node::Piece(_), Node::Group(_)]));
    let copied: Vec<Pose> = layout
        .leaves(Node::Group(copy))
        .iter()
        .map(|id| layout.piece(*id).unwrap().pose())
        .collect();
    for (id, pose) in leaves.iter().zip(&copied) {
        let original = layout.piece(*id).unwrap().pose();
        assert!(pose.near(&original.translate(0.0, 600.0)));
    }
}

#[test]
fn test_temporary_groups_are_not_written() {
    let mut layout = Layout::new(catalog());
    let a = layout.add_piece("straight", Pose::origin()).unwrap();
    let b = layout.add_piece("straight", Pose::new(0.0, 500.0, 0.0)).unwrap();
    let selection = layout.process_selection_box_results(&[a, b]).unwrap();
    assert!(selection.is_group());

    let document = layout.to_document().unwrap();
    assert!(document.layers[0].groups.is_none());
    assert!(document.layers[0].components.iter().all(|c| c.group.is_none()));
}

#[test]
fn test_import_with_kept_ids_refuses_duplicates() {
    let mut layout = sample_layout();
    let document = layout.to_document().unwrap();
    let layers = layout.layers().len();
    let pieces = layout.piece_count();

    let result = layout.import_layer(&document.layers[0], IdPolicy::Keep);
    assert!(matches!(
        result,
        Err(Error::Layout(LayoutError::DuplicateGroup(_)))
    ));

    let mut ungrouped = document.layers[0].clone();
    ungrouped.groups = None;
    for component in &mut ungrouped.components {
        component.group = None;
    }
    let result = layout.import_layer(&ungrouped, IdPolicy::Keep);
    assert!(matches!(
        result,
        Err(Error::Connection(ConnectionError::DuplicateId(_)))
    ));

    assert_eq!(layout.layers().len(), layers);
    assert_eq!(layout.piece_count(), pieces);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_import_with_fresh_ids_copies_a_layer() {
    let mut layout = sample_layout();
    let document = layout.to_document().unwrap();
    let pieces = layout.piece_count();

    let imported = layout
        .import_layer(&document.layers[0], IdPolicy::Regenerate)
        .unwrap();
    let layer = layout.layer(imported).unwrap();
    assert_eq!(layer.children().len(), 4);
    assert_eq!(layer.open_connections().len(), 2);
    assert_eq!(layout.piece_count(), pieces + 4);
    assert_eq!(layout.group_count(), 4);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_rejected_document_builds_nothing() {
    let value = serde_json::json!({
        "version": 2,
        "date": "2024-05-01T12:00:00Z",
        "layers": [{"components": [
            {"type": "monorail", "pose": {"x": 0, "y": 0, "angle": 0}, "connections": []}
        ]}]
    });
    let err = LayoutDocument::from_value(value, &PieceCatalog::standard()).unwrap_err();
    assert!(err.is_rejected_import());
}
