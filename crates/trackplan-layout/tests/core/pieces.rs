use std::sync::Arc;

use trackplan_core::{ConnectionError, Error, PieceId, Pose};
use trackplan_layout::{EditorSettings, Layout, PieceCatalog};

fn new_layout() -> Layout {
    Layout::new(Arc::new(PieceCatalog::standard()))
}

fn chain(layout: &mut Layout, count: usize) -> Vec<PieceId> {
    let mut ids = vec![layout.place_piece("straight").unwrap()];
    for _ in 1..count {
        ids.push(layout.place_next("straight").unwrap());
    }
    ids
}

#[test]
fn test_chain_of_four_has_two_open_ends() {
    let mut layout = new_layout();
    let ids = chain(&mut layout, 4);

    assert_eq!(layout.piece_count(), 4);
    assert_eq!(layout.open_connection_count(layout.active_layer()).unwrap(), 2);
    assert_eq!(layout.piece(ids[0]).unwrap().linked_count(), 1);
    assert_eq!(layout.piece(ids[1]).unwrap().linked_count(), 2);
    assert_eq!(layout.piece(ids[2]).unwrap().linked_count(), 2);
    assert_eq!(layout.piece(ids[3]).unwrap().linked_count(), 1);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_docked_connectors_coincide() {
    let mut layout = new_layout();
    let ids = chain(&mut layout, 2);

    let first = layout.piece(ids[0]).unwrap();
    for conn in first.connections() {
        let Some(other) = conn.other() else {
            continue;
        };
        let a = layout.connection_pose(conn.id).unwrap();
        let b = layout.connection_pose(other).unwrap();
        assert!(a.is_in_radius(&b, 1e-3));
        assert!(a.has_opposite_angle(&b, 1e-3));
    }
}

#[test]
fn test_place_piece_at_refuses_linked_target() {
    let mut layout = new_layout();
    let ids = chain(&mut layout, 2);
    let linked = layout
        .piece(ids[0])
        .unwrap()
        .connections()
        .iter()
        .find(|c| !c.is_open())
        .map(|c| c.id)
        .unwrap();

    let result = layout.place_piece_at("straight", linked);
    assert!(matches!(
        result,
        Err(Error::Connection(ConnectionError::AlreadyLinked(_)))
    ));
    assert_eq!(layout.piece_count(), 2);
}

#[test]
fn test_place_piece_at_needs_connectors() {
    let mut layout = new_layout();
    let first = layout.place_piece("straight").unwrap();
    let open = layout.piece(first).unwrap().connections()[0].id;

    assert!(layout.place_piece_at("baseplate", open).is_err());
    assert_eq!(layout.piece_count(), 1);
    assert!(layout.connection(open).unwrap().is_open());
}

#[test]
fn test_destroy_piece_reopens_partners() {
    let mut layout = new_layout();
    let ids = chain(&mut layout, 3);

    layout.destroy_piece(ids[1]).unwrap();

    assert_eq!(layout.piece_count(), 2);
    assert_eq!(layout.registry().len(), 4);
    assert_eq!(layout.open_connection_count(layout.active_layer()).unwrap(), 4);
    assert!(layout.piece(ids[1]).is_none());
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_rotate_piece_refused_with_two_links() {
    let mut layout = new_layout();
    let ids = chain(&mut layout, 3);
    let before = layout.piece(ids[1]).unwrap().pose();

    assert!(!layout.can_rotate_piece(ids[1]).unwrap());
    assert!(!layout.rotate_piece(ids[1]).unwrap());
    assert_eq!(layout.piece(ids[1]).unwrap().pose(), before);
    assert_eq!(layout.piece(ids[1]).unwrap().linked_count(), 2);
}

#[test]
fn test_rotate_end_piece_breaks_its_link() {
    let mut layout = new_layout();
    let ids = chain(&mut layout, 2);

    assert!(layout.rotate_piece(ids[0]).unwrap());

    let rotated = layout.piece(ids[0]).unwrap();
    assert!((rotated.pose().angle - std::f64::consts::FRAC_PI_4).abs() < 1e-6);
    assert_eq!(rotated.linked_count(), 0);
    assert_eq!(layout.piece(ids[1]).unwrap().linked_count(), 0);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_auto_connect_links_exactly_one_candidate() {
    let mut layout = new_layout();
    layout.set_settings(EditorSettings {
        auto_connect: false,
        ..EditorSettings::default()
    });
    let first = layout.add_piece("straight", Pose::origin()).unwrap();
    let second = layout.add_piece("straight", Pose::origin()).unwrap();
    layout.set_settings(EditorSettings::default());

    // its first connector lands on both stacked open connectors
    let third = layout
        .add_piece("straight", Pose::new(256.0, 0.0, std::f64::consts::PI))
        .unwrap();

    let first_end = layout.piece(first).unwrap().connections()[0].id;
    let second_end = layout.piece(second).unwrap().connections()[0].id;
    let docked = layout.piece(third).unwrap().connections()[0].other();
    assert_eq!(docked, Some(first_end));
    assert!(layout.connection(second_end).unwrap().is_open());
    assert_eq!(layout.piece(third).unwrap().linked_count(), 1);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_auto_connect_ignores_other_connector_types() {
    let json = r#"[{
        "alias": "monorail",
        "name": "Monorail",
        "kind": "track",
        "width": 256,
        "height": 64,
        "connectors": [
            {"offset": {"magnitude": 128, "angle": 0, "exitAngle": 0}, "type": "beam", "nextConnectionIndex": 1},
            {"offset": {"magnitude": 128, "angle": 3.141592653589793, "exitAngle": 3.141592653589793}, "type": "beam"}
        ]
    }]"#;
    let mut catalog = PieceCatalog::standard();
    catalog.extend_from_json(json).unwrap();
    let mut layout = Layout::new(Arc::new(catalog));

    let rail = layout.add_piece("straight", Pose::origin()).unwrap();
    let beam = layout
        .add_piece("monorail", Pose::new(256.0, 0.0, std::f64::consts::PI))
        .unwrap();

    assert_eq!(layout.piece(rail).unwrap().linked_count(), 0);
    assert_eq!(layout.piece(beam).unwrap().linked_count(), 0);
}
