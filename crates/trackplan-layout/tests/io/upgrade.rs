use std::sync::Arc;

use serde_json::json;
use trackplan_core::{Error, LengthUnit, UpgradeError};
use trackplan_layout::{
    is_valid_layout, upgrade_layout, Layout, LayoutDate, LayoutDocument, PieceCatalog,
};

#[test]
fn test_version_one_baseplate_gets_studs() {
    let catalog = PieceCatalog::standard();
    let mut value = json!({
        "version": 1,
        "layers": [{"components": [{
            "type": "baseplate",
            "pose": {"x": 0, "y": 0, "angle": 0},
            "connections": [],
            "width": 192,
            "height": 192
        }]}]
    });

    assert_eq!(upgrade_layout(&mut value), Ok(true));
    assert_eq!(value["layers"][0]["components"][0]["units"], "studs");
    assert!(is_valid_layout(&value, &catalog));

    let document = LayoutDocument::from_value(value, &catalog).unwrap();
    assert_eq!(document.version, 2);
    assert_eq!(
        document.layers[0].components[0].units,
        Some(LengthUnit::Studs)
    );
    assert!(document.date.to_datetime().is_some());

    let layout = Layout::from_document(&document, Arc::new(catalog)).unwrap();
    let plate = layout.pieces().next().unwrap();
    assert_eq!(plate.data().units, Some(LengthUnit::Studs));
    assert_eq!(plate.data().width, 192.0);
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_version_one_track_keeps_links() {
    let catalog = PieceCatalog::standard();
    let value = json!({
        "version": 1,
        "date": 1714564800000u64,
        "layers": [{"components": [
            {
                "type": "straight",
                "pose": {"x": 0, "y": 0, "angle": 0},
                "connections": [
                    {"uuid": "6f1c2a3e-1111-4c1d-9b1e-000000000001", "otherConnection": "6f1c2a3e-1111-4c1d-9b1e-000000000003"},
                    {"uuid": "6f1c2a3e-1111-4c1d-9b1e-000000000002", "otherConnection": ""}
                ]
            },
            {
                "type": "straight",
                "pose": {"x": 256, "y": 0, "angle": 3.141592653589793},
                "connections": [
                    {"uuid": "6f1c2a3e-1111-4c1d-9b1e-000000000003", "otherConnection": "6f1c2a3e-1111-4c1d-9b1e-000000000001"},
                    {"uuid": "6f1c2a3e-1111-4c1d-9b1e-000000000004", "otherConnection": ""}
                ]
            }
        ]}]
    });

    let document = LayoutDocument::from_value(value, &catalog).unwrap();
    assert!(matches!(document.date, LayoutDate::Millis(_)));
    assert!(document.date.to_datetime().is_some());

    let layout = Layout::from_document(&document, Arc::new(catalog)).unwrap();
    assert_eq!(layout.open_connection_count(layout.active_layer()).unwrap(), 2);
    let first = "6f1c2a3e-1111-4c1d-9b1e-000000000001".parse().unwrap();
    let second = "6f1c2a3e-1111-4c1d-9b1e-000000000003".parse().unwrap();
    assert_eq!(layout.connection(first).unwrap().other(), Some(second));
    assert!(layout.audit().is_empty(), "{:?}", layout.audit());
}

#[test]
fn test_future_version_is_rejected() {
    let value = json!({"version": 3, "date": "2024-05-01T12:00:00Z", "layers": [{}]});
    let err = LayoutDocument::from_value(value, &PieceCatalog::standard()).unwrap_err();
    assert!(matches!(
        err,
        Error::Upgrade(UpgradeError::UnsupportedVersion { found: 3, .. })
    ));
    assert!(err.is_rejected_import());
}
