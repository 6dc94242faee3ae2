use std::sync::Arc;

use trackplan_core::{Node, Pose};
use trackplan_layout::{EditorSettings, Layout, PieceCatalog, PieceData};

fn new_layout() -> Layout {
    Layout::new(Arc::new(PieceCatalog::standard()))
}

#[test]
fn test_first_piece_goes_to_the_origin() {
    let mut layout = new_layout();
    layout.set_settings(EditorSettings {
        origin_x: 100.0,
        origin_y: -40.0,
        ..EditorSettings::default()
    });
    let id = layout.place_piece("straight").unwrap();

    assert!(layout.piece(id).unwrap().pose().near(&Pose::new(100.0, -40.0, 0.0)));
    assert_eq!(layout.session().selection(), Some(Node::Piece(id)));
    let cursor = layout.session().cursor().unwrap();
    assert_eq!(cursor, layout.piece(id).unwrap().connections()[1].id);
}

#[test]
fn test_sixteen_chained_curves_close_a_circle() {
    let mut layout = new_layout();
    let first = layout.place_piece("curve").unwrap();
    assert_eq!(
        layout.session().cursor(),
        Some(layout.piece(first).unwrap().connections()[1].id)
    );
    for _ in 1..16 {
        layout.place_next("curve").unwrap();
    }

    assert_eq!(layout.piece_count(), 16);
    assert_eq!(layout.open_connection_count(layout.active_layer()).unwrap(), 0);
    assert_eq!(layout.piece(first).unwrap().linked_count(), 2);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_free_placement_follows_the_selected_piece() {
    let mut layout = new_layout();
    let first = layout.add_piece("straight", Pose::new(0.0, 0.0, std::f64::consts::FRAC_PI_2)).unwrap();
    layout.select(Some(Node::Piece(first)));

    let second = layout.place_piece("buffer").unwrap();
    let expected = Pose::new(0.0, 128.0 + 32.0, std::f64::consts::FRAC_PI_2);
    assert!(layout.piece(second).unwrap().pose().approx_eq(&expected, 1e-3));
}

#[test]
fn test_placement_snaps_to_the_grid() {
    let mut layout = new_layout();
    layout.set_settings(EditorSettings {
        snap_size: 50.0,
        origin_x: 124.0,
        origin_y: 76.0,
        ..EditorSettings::default()
    });
    let id = layout.place_piece("baseplate").unwrap();
    let pose = layout.piece(id).unwrap().pose();
    assert_eq!((pose.x, pose.y), (100.0, 100.0));
}

#[test]
fn test_place_next_follows_the_chain_cursor() {
    let mut layout = new_layout();
    layout.place_piece("straight").unwrap();
    let curve = layout.place_next("curve").unwrap();
    let cursor = layout.session().cursor().unwrap();
    assert_eq!(cursor, layout.piece(curve).unwrap().connections()[1].id);

    let buffer = layout.place_next("buffer").unwrap();
    assert_eq!(layout.piece(buffer).unwrap().linked_count(), 1);
    assert_eq!(layout.session().cursor(), None);

    let free = layout.place_next("straight").unwrap();
    assert_eq!(layout.piece(free).unwrap().linked_count(), 0);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_updating_piece_data_refreshes_hit_testing() {
    let mut layout = new_layout();
    let id = layout.add_piece("shape", Pose::origin()).unwrap();
    assert_eq!(layout.piece_at(150.0, 0.0), None);

    let data = PieceData {
        width: 400.0,
        ..layout.piece(id).unwrap().data().clone()
    };
    layout.update_piece_data(id, data).unwrap();
    assert_eq!(layout.piece_at(150.0, 0.0), Some(id));
}
