use std::sync::Arc;

use trackplan_core::{Error, LayoutError, Node, Pose};
use trackplan_layout::{Layout, PieceCatalog, DEFAULT_LAYER_NAME};

fn new_layout() -> Layout {
    Layout::new(Arc::new(PieceCatalog::standard()))
}

#[test]
fn test_new_layout_has_one_layer() {
    let layout = new_layout();
    assert_eq!(layout.layers().len(), 1);
    assert_eq!(layout.layers()[0].name(), DEFAULT_LAYER_NAME);
    assert_eq!(layout.active_layer(), layout.layers()[0].id());
}

#[test]
fn test_last_layer_cannot_be_removed() {
    let mut layout = new_layout();
    let only = layout.active_layer();
    assert!(matches!(
        layout.remove_layer(only),
        Err(Error::Layout(LayoutError::LastLayer))
    ));
}

#[test]
fn test_removing_a_layer_destroys_its_pieces() {
    let mut layout = new_layout();
    let base = layout.active_layer();
    let kept = layout.add_piece("straight", Pose::origin()).unwrap();

    let upper = layout.add_layer("Upper");
    layout.rename_layer(upper, "Bridges").unwrap();
    layout.set_active_layer(upper).unwrap();
    layout.add_piece("straight", Pose::new(0.0, 300.0, 0.0)).unwrap();
    layout.add_piece("curve", Pose::new(0.0, 600.0, 0.0)).unwrap();
    assert_eq!(layout.layer(upper).unwrap().name(), "Bridges");

    layout.remove_layer(upper).unwrap();
    assert_eq!(layout.layers().len(), 1);
    assert_eq!(layout.active_layer(), base);
    assert_eq!(layout.piece_count(), 1);
    assert!(layout.piece(kept).is_some());
    assert_eq!(layout.registry().len(), 2);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_pieces_on_different_layers_do_not_dock() {
    let mut layout = new_layout();
    let lower = layout.add_piece("straight", Pose::origin()).unwrap();
    let upper = layout.add_layer("Upper");
    layout.set_active_layer(upper).unwrap();
    let above = layout
        .add_piece("straight", Pose::new(256.0, 0.0, std::f64::consts::PI))
        .unwrap();

    assert_eq!(layout.piece(lower).unwrap().linked_count(), 0);
    assert_eq!(layout.piece(above).unwrap().linked_count(), 0);
    assert_eq!(layout.open_connection_count(upper).unwrap(), 2);
}

#[test]
fn test_piece_at_prefers_the_top_piece_of_the_top_layer() {
    let mut layout = new_layout();
    let bottom = layout.add_piece("baseplate", Pose::origin()).unwrap();
    let middle = layout.add_piece("shape", Pose::origin()).unwrap();
    assert_eq!(layout.piece_at(0.0, 0.0), Some(middle));

    layout.send_to_back(Node::Piece(middle)).unwrap();
    assert_eq!(layout.piece_at(0.0, 0.0), Some(bottom));

    let upper = layout.add_layer("Upper");
    layout.set_active_layer(upper).unwrap();
    let top = layout.add_piece("shape", Pose::origin()).unwrap();
    assert_eq!(layout.piece_at(0.0, 0.0), Some(top));

    layout.set_layer_visible(upper, false).unwrap();
    assert_eq!(layout.piece_at(0.0, 0.0), Some(bottom));
    assert_eq!(layout.piece_at(5000.0, 5000.0), None);
}
