use std::sync::Arc;

use trackplan_core::constants::ROTATION_STEP;
use trackplan_core::{Error, LayoutError, Node, PieceId};
use trackplan_layout::{Layout, PieceCatalog};

fn chain(count: usize) -> (Layout, Vec<PieceId>) {
    let mut layout = Layout::new(Arc::new(PieceCatalog::standard()));
    let mut ids = vec![layout.place_piece("straight").unwrap()];
    for _ in 1..count {
        ids.push(layout.place_next("straight").unwrap());
    }
    layout.clear_selection();
    (layout, ids)
}

#[test]
fn test_short_drag_is_cancelled() {
    let (mut layout, ids) = chain(2);
    let before = layout.piece(ids[1]).unwrap().pose();

    layout.start_drag(Node::Piece(ids[1])).unwrap();
    assert!(layout.session().is_dragging());
    layout.drag_to(1.0, 1.5).unwrap();
    assert_eq!(layout.end_drag().unwrap(), None);

    assert!(!layout.session().is_dragging());
    assert_eq!(layout.piece(ids[1]).unwrap().pose(), before);
    assert_eq!(layout.piece(ids[1]).unwrap().linked_count(), 1);
    assert_eq!(layout.hit_index().len(), layout.piece_count());
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_drag_moves_the_outermost_group() {
    let (mut layout, ids) = chain(3);
    let inner = layout.group_nodes(&[Node::Piece(ids[0])], false).unwrap();
    let outer = layout
        .group_nodes(&[Node::Group(inner), Node::Piece(ids[1])], false)
        .unwrap();
    let before = layout.piece(ids[0]).unwrap().pose();

    let target = layout.start_drag(Node::Piece(ids[0])).unwrap();
    assert_eq!(target, Node::Group(outer));
    assert_eq!(layout.hit_index().len(), 1);

    layout.drag_by(0.0, 200.0).unwrap();
    layout.drag_by(0.0, 100.0).unwrap();
    assert_eq!(layout.session().drag().unwrap().dy, 300.0);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());

    assert_eq!(layout.end_drag().unwrap(), Some(Node::Group(outer)));
    assert!(layout
        .piece(ids[0])
        .unwrap()
        .pose()
        .near(&before.translate(0.0, 300.0)));
    assert_eq!(layout.piece(ids[0]).unwrap().linked_count(), 1);
    assert_eq!(layout.piece(ids[2]).unwrap().linked_count(), 0);
    assert_eq!(layout.hit_index().len(), 3);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_drag_drop_docks_to_open_connector() {
    let (mut layout, ids) = chain(2);
    layout.move_node(Node::Piece(ids[1]), 0.0, 80.0).unwrap();
    assert_eq!(layout.piece(ids[1]).unwrap().linked_count(), 0);

    layout.start_drag(Node::Piece(ids[1])).unwrap();
    layout.drag_to(0.0, -80.0).unwrap();
    layout.end_drag().unwrap();

    assert_eq!(layout.piece(ids[1]).unwrap().linked_count(), 1);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_cancel_restores_poses() {
    let (mut layout, ids) = chain(2);
    let before = layout.piece(ids[0]).unwrap().pose();

    layout.start_drag(Node::Piece(ids[0])).unwrap();
    layout.drag_to(500.0, 0.0).unwrap();
    layout.cancel_drag().unwrap();

    assert_eq!(layout.piece(ids[0]).unwrap().pose(), before);
    assert_eq!(layout.piece(ids[0]).unwrap().linked_count(), 1);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_drag_calls_need_an_active_drag() {
    let (mut layout, _) = chain(1);
    assert!(matches!(
        layout.drag_to(1.0, 1.0),
        Err(Error::Layout(LayoutError::NotDragging))
    ));
    assert!(matches!(
        layout.end_drag(),
        Err(Error::Layout(LayoutError::NotDragging))
    ));
    assert!(layout.cancel_drag().is_err());
}

#[test]
fn test_destroying_a_dragged_piece() {
    let (mut layout, ids) = chain(2);
    layout.start_drag(Node::Piece(ids[0])).unwrap();
    layout.destroy_piece(ids[0]).unwrap();
    layout.cancel_drag().unwrap();

    assert_eq!(layout.piece_count(), 1);
    assert_eq!(layout.hit_index().len(), 1);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_rotation_during_drag_survives_later_moves() {
    let (mut layout, ids) = chain(1);
    let before = layout.piece(ids[0]).unwrap().pose();

    layout.start_drag(Node::Piece(ids[0])).unwrap();
    layout.drag_to(50.0, 0.0).unwrap();
    assert!(layout.rotate_piece(ids[0]).unwrap());
    layout.drag_to(60.0, 0.0).unwrap();

    let moved = layout.piece(ids[0]).unwrap().pose();
    assert!((moved.angle - ROTATION_STEP).abs() < 1e-6);
    assert!((moved.x - (before.x + 60.0)).abs() < 1e-3);
    assert_eq!(layout.hit_index().len(), 0);

    assert_eq!(layout.end_drag().unwrap(), Some(Node::Piece(ids[0])));
    let dropped = layout.piece(ids[0]).unwrap().pose();
    assert!((dropped.angle - ROTATION_STEP).abs() < 1e-6);
    assert!((dropped.x - (before.x + 60.0)).abs() < 1e-3);
    assert!((dropped.y - before.y).abs() < 1e-3);
    assert_eq!(layout.hit_index().len(), 1);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_cancel_undoes_rotation_made_during_drag() {
    let (mut layout, ids) = chain(1);
    let before = layout.piece(ids[0]).unwrap().pose();

    layout.start_drag(Node::Piece(ids[0])).unwrap();
    layout.drag_to(0.0, 120.0).unwrap();
    assert!(layout.rotate_piece(ids[0]).unwrap());
    layout.cancel_drag().unwrap();

    assert_eq!(layout.piece(ids[0]).unwrap().pose(), before);
    assert_eq!(layout.hit_index().len(), 1);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}
