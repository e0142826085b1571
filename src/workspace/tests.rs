//! Unit tests for the workspace module.

use serde_json::json;

use super::*;

#[test]
fn test_back_reference_serializes_compactly() {
    let record = ObjectRecord::Reference(BackReference {
        id: "s1".to_string(),
        index_of_reference: 3,
    });

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json, json!({ "id": "s1", "indexOfReference": 3 }));
}

#[test]
fn test_full_record_parses_as_full() {
    let record: ObjectRecord =
        serde_json::from_value(json!({ "id": "p1", "x": 10, "y": 20 })).unwrap();

    let data = record.as_full().expect("full record");
    assert_eq!(data.id, "p1");
    assert_eq!(data.fields.get("x"), Some(&json!(10)));
}

#[test]
fn test_reference_record_parses_as_reference() {
    let record: ObjectRecord =
        serde_json::from_value(json!({ "id": "p1", "indexOfReference": 0 })).unwrap();

    assert!(record.is_reference());
    assert_eq!(record.id(), "p1");
}

#[test]
fn test_snapshot_defaults_when_fields_missing() {
    let snapshot: WorkspaceSnapshot = serde_json::from_value(json!({})).unwrap();

    assert_eq!(snapshot.zoom_level, 1.0);
    assert_eq!(snapshot.translate_offset, Offset::default());
    assert!(snapshot.objects.is_empty());
}

#[test]
fn test_snapshot_uses_persisted_field_names() {
    let mut snapshot = WorkspaceSnapshot::default();
    snapshot
        .objects
        .shapes_data
        .push(ObjectData::new("s1").into());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json["objects"]["shapesData"].is_array());
    assert!(json["objects"]["segmentsData"].is_array());
    assert_eq!(json["zoomLevel"], json!(1.0));
}

#[test]
fn test_settings_keep_unknown_fields() {
    let settings: SettingsSnapshot = serde_json::from_value(json!({
        "gridShown": true,
        "gridType": "square",
        "gridSize": 2,
        "isSilhouetteShown": true
    }))
    .unwrap();

    assert!(settings.grid_shown);
    assert_eq!(settings.grid_type, "square");
    assert_eq!(settings.extra.get("isSilhouetteShown"), Some(&json!(true)));

    let back = serde_json::to_value(&settings).unwrap();
    assert_eq!(back["isSilhouetteShown"], json!(true));
}

#[test]
fn test_reference_count() {
    let mut objects = ObjectCollections::default();
    objects.points_data.push(ObjectData::new("p1").into());
    objects.points_data.push(ObjectRecord::Reference(BackReference {
        id: "p2".to_string(),
        index_of_reference: 0,
    }));

    assert_eq!(objects.len(), 2);
    assert_eq!(objects.reference_count(), 1);
}

#[test]
fn test_memory_workspace_upsert_replaces_by_id() {
    let mut workspace = MemoryWorkspace::new();
    workspace.upsert(ObjectKind::Shape, ObjectData::new("s1").with("color", json!("red")));
    workspace.upsert(ObjectKind::Shape, ObjectData::new("s1").with("color", json!("blue")));

    assert_eq!(workspace.object_ids(ObjectKind::Shape), vec!["s1"]);
    let shape = workspace.object(ObjectKind::Shape, "s1").unwrap();
    assert_eq!(shape.fields.get("color"), Some(&json!("blue")));
}

#[test]
fn test_memory_workspace_remove() {
    let mut workspace = MemoryWorkspace::new();
    workspace.upsert(ObjectKind::Point, ObjectData::new("p1"));

    assert!(workspace.remove(ObjectKind::Point, "p1"));
    assert!(!workspace.remove(ObjectKind::Point, "p1"));
}

#[test]
fn test_memory_workspace_tracks_applied_snapshots() {
    let mut workspace = MemoryWorkspace::tracking();
    let mut snapshot = WorkspaceSnapshot::default();
    snapshot.zoom_level = 2.0;

    workspace.apply_snapshot(&snapshot);
    workspace.apply_snapshot(&snapshot);

    assert_eq!(workspace.applied().len(), 2);
    assert_eq!(workspace.capture_snapshot().zoom_level, 2.0);
}
