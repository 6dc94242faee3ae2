use std::sync::Arc;

use trackplan_core::{ConnectionError, ConnectionId, Error, LayoutError, Pose};
use trackplan_layout::{ConnectorOffset, EditorSettings, Layout, PieceCatalog};

fn manual_layout() -> Layout {
    let mut layout = Layout::new(Arc::new(PieceCatalog::standard()));
    layout.set_settings(EditorSettings {
        auto_connect: false,
        ..EditorSettings::default()
    });
    layout
}

#[test]
fn test_connect_and_disconnect() {
    let mut layout = manual_layout();
    let a = layout.add_piece("straight", Pose::origin()).unwrap();
    let b = layout.add_piece("straight", Pose::new(0.0, 500.0, 0.0)).unwrap();
    let ca = layout.piece(a).unwrap().connections()[0].id;
    let cb = layout.piece(b).unwrap().connections()[1].id;

    layout.connect(ca, cb).unwrap();
    assert_eq!(layout.connection(ca).unwrap().other(), Some(cb));
    assert_eq!(layout.connection(cb).unwrap().other(), Some(ca));
    assert_eq!(layout.open_connection_count(layout.active_layer()).unwrap(), 2);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());

    assert!(layout.disconnect(cb).unwrap());
    assert!(!layout.disconnect(cb).unwrap());
    assert!(layout.connection(ca).unwrap().is_open());
    assert_eq!(layout.open_connection_count(layout.active_layer()).unwrap(), 4);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_connect_refusals_leave_state_unchanged() {
    let mut layout = manual_layout();
    let a = layout.add_piece("straight", Pose::origin()).unwrap();
    let b = layout.add_piece("straight", Pose::new(0.0, 500.0, 0.0)).unwrap();
    let c = layout.add_piece("straight", Pose::new(0.0, 900.0, 0.0)).unwrap();
    let a0 = layout.piece(a).unwrap().connections()[0].id;
    let a1 = layout.piece(a).unwrap().connections()[1].id;
    let b0 = layout.piece(b).unwrap().connections()[0].id;
    let c0 = layout.piece(c).unwrap().connections()[0].id;

    assert!(matches!(
        layout.connect(a0, a1),
        Err(Error::Connection(ConnectionError::SameOwner(owner))) if owner == a
    ));

    layout.connect(a0, b0).unwrap();
    assert!(matches!(
        layout.connect(c0, b0),
        Err(Error::Connection(ConnectionError::AlreadyLinked(id))) if id == b0
    ));
    assert!(layout.connection(c0).unwrap().is_open());
    assert_eq!(layout.connection(b0).unwrap().other(), Some(a0));

    let missing = ConnectionId::new();
    assert!(matches!(
        layout.connect(missing, c0),
        Err(Error::Layout(LayoutError::UnknownConnection(_)))
    ));
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_set_connection_id_keeps_links_and_index() {
    let mut layout = manual_layout();
    let a = layout.add_piece("straight", Pose::origin()).unwrap();
    let b = layout.add_piece("straight", Pose::new(0.0, 500.0, 0.0)).unwrap();
    let a0 = layout.piece(a).unwrap().connections()[0].id;
    let a1 = layout.piece(a).unwrap().connections()[1].id;
    let b0 = layout.piece(b).unwrap().connections()[0].id;
    layout.connect(a0, b0).unwrap();

    let linked = ConnectionId::new();
    layout.set_connection_id(a0, linked).unwrap();
    assert!(layout.connection(a0).is_none());
    assert_eq!(layout.connection(b0).unwrap().other(), Some(linked));

    let open = ConnectionId::new();
    layout.set_connection_id(a1, open).unwrap();
    let layer = layout.layer(layout.active_layer()).unwrap();
    assert!(layer.open_connections().contains(&open));
    assert!(!layer.open_connections().contains(&a1));

    assert!(matches!(
        layout.set_connection_id(open, b0),
        Err(Error::Connection(ConnectionError::DuplicateId(_)))
    ));
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_rekeyed_open_connector_keeps_its_place_in_the_index() {
    let mut layout = manual_layout();
    let a = layout.add_piece("straight", Pose::origin()).unwrap();
    let first = layout.piece(a).unwrap().connections()[0].id;
    let renamed = ConnectionId::new();
    layout.set_connection_id(first, renamed).unwrap();

    let layer = layout.layer(layout.active_layer()).unwrap();
    assert_eq!(layer.open_connections().iter().next(), Some(&renamed));
}

#[test]
fn test_custom_offset_moves_the_connector() {
    let mut layout = manual_layout();
    let a = layout.add_piece("straight", Pose::origin()).unwrap();
    let conn = layout.piece(a).unwrap().connections()[0].id;

    layout
        .set_connection_offset(conn, ConnectorOffset::new(200.0, 0.0, 0.0))
        .unwrap();

    let pose = layout.connection_pose(conn).unwrap();
    assert!(pose.near(&Pose::new(200.0, 0.0, 0.0)));
    assert!(layout.connection(conn).unwrap().has_custom_offset());
}
