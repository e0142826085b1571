//! Unit tests for the history module.

use serde_json::json;

use crate::workspace::{
    MemoryWorkspace, ObjectData, ObjectKind, ObjectRecord, SnapshotProducer, WorkspaceSnapshot,
};

use super::*;

fn square(id: &str, x: i64) -> ObjectData {
    ObjectData::new(id)
        .with("type", json!("square"))
        .with("x", json!(x))
        .with("color", json!("#ff0000"))
}

fn point(id: &str, x: i64, y: i64) -> ObjectData {
    ObjectData::new(id).with("x", json!(x)).with("y", json!(y))
}

/// Workspace with one shape made of two points
fn drawn_workspace() -> MemoryWorkspace {
    let mut workspace = MemoryWorkspace::new();
    workspace.upsert(ObjectKind::Shape, square("s1", 0));
    workspace.upsert(ObjectKind::Point, point("p1", 0, 0));
    workspace.upsert(ObjectKind::Point, point("p2", 10, 0));
    workspace
}

#[test]
fn test_new_history_cannot_undo_or_redo() {
    let history = History::default();
    assert_eq!(history.cursor(), -1);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn test_can_undo_redo_follow_cursor() {
    let mut workspace = MemoryWorkspace::new();
    let mut history = History::from_producer(&workspace);

    for i in 0..3 {
        workspace.upsert(ObjectKind::Shape, square(&format!("s{i}"), i));
        history.add_entry(&workspace);
        assert_eq!(history.cursor(), i as isize);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    history.undo(&mut workspace).unwrap();
    assert!(history.can_undo());
    assert!(history.can_redo());

    history.undo(&mut workspace).unwrap();
    history.undo(&mut workspace).unwrap();
    assert_eq!(history.cursor(), -1);
    assert!(!history.can_undo());
    assert!(history.can_redo());
}

#[test]
fn test_undo_at_start_is_reported() {
    let mut workspace = MemoryWorkspace::new();
    let mut history = History::from_producer(&workspace);

    assert_eq!(history.undo(&mut workspace), Err(HistoryError::NothingToUndo));
    assert_eq!(history.cursor(), -1);
}

#[test]
fn test_redo_at_end_is_reported() {
    let mut workspace = drawn_workspace();
    let mut history = History::default();
    history.add_entry(&workspace);

    assert_eq!(history.redo(&mut workspace), Err(HistoryError::NothingToRedo));
    assert_eq!(history.cursor(), 0);
}

#[test]
fn test_undo_to_start_restores_start_snapshot() {
    let mut workspace = MemoryWorkspace::new();
    workspace.set_zoom(1.5);
    let mut history = History::from_producer(&workspace);
    let start = workspace.capture_snapshot();

    workspace.upsert(ObjectKind::Shape, square("s1", 0));
    history.add_entry(&workspace);

    history.undo(&mut workspace).unwrap();
    assert_eq!(workspace.capture_snapshot(), start);
}

#[test]
fn test_undo_then_redo_round_trips() {
    let mut workspace = drawn_workspace();
    let mut history = History::from_producer(&MemoryWorkspace::new());
    history.add_entry(&workspace);

    workspace.upsert(ObjectKind::Point, point("p2", 20, 5));
    workspace.settings_mut().grid_shown = true;
    history.add_entry(&workspace);

    let before_snapshot = workspace.capture_snapshot();
    let before_settings = workspace.capture_settings();

    history.undo(&mut workspace).unwrap();
    assert_ne!(workspace.capture_snapshot(), before_snapshot);
    assert!(!workspace.capture_settings().grid_shown);

    history.redo(&mut workspace).unwrap();
    assert_eq!(workspace.capture_snapshot(), before_snapshot);
    assert_eq!(workspace.capture_settings(), before_settings);
}

#[test]
fn test_add_after_undo_truncates_redo_branch() {
    let mut workspace = MemoryWorkspace::new();
    let mut history = History::from_producer(&workspace);

    let mut snapshots = Vec::new();
    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        workspace.upsert(ObjectKind::Shape, square(id, i as i64));
        history.add_entry(&workspace);
        snapshots.push(workspace.capture_snapshot());
    }

    history.undo(&mut workspace).unwrap();
    history.undo(&mut workspace).unwrap();
    workspace.upsert(ObjectKind::Shape, square("d", 9));
    history.add_entry(&workspace);

    assert_eq!(history.len(), 2);
    assert_eq!(history.cursor(), 1);
    assert!(!history.can_redo());
    assert_eq!(history.resolve_entry(0).unwrap(), snapshots[0]);
    assert_eq!(history.resolve_entry(1).unwrap(), workspace.capture_snapshot());
}

#[test]
fn test_first_entry_is_never_compacted() {
    let workspace = drawn_workspace();
    let mut history = History::default();
    history.add_entry(&workspace);

    assert_eq!(history.entries()[0].snapshot.objects.reference_count(), 0);
}

#[test]
fn test_unchanged_objects_become_back_references() {
    let mut workspace = drawn_workspace();
    let mut history = History::default();
    history.add_entry(&workspace);

    workspace.upsert(ObjectKind::Point, point("p2", 30, 0));
    history.add_entry(&workspace);

    let objects = &history.entries()[1].snapshot.objects;
    assert!(objects.find(ObjectKind::Shape, "s1").unwrap().is_reference());
    assert!(objects.find(ObjectKind::Point, "p1").unwrap().is_reference());
    assert!(!objects.find(ObjectKind::Point, "p2").unwrap().is_reference());
}

#[test]
fn test_references_point_at_full_data_holder() {
    let mut workspace = drawn_workspace();
    let mut history = History::default();
    for x in [1, 2, 3] {
        workspace.upsert(ObjectKind::Point, point("p2", x, 0));
        history.add_entry(&workspace);
    }

    // s1 never changed: every later entry points straight at entry 0
    for entry in &history.entries()[1..] {
        match entry.snapshot.objects.find(ObjectKind::Shape, "s1").unwrap() {
            ObjectRecord::Reference(reference) => assert_eq!(reference.index_of_reference, 0),
            ObjectRecord::Full(_) => panic!("s1 should be shared"),
        }
    }
}

#[test]
fn test_compaction_is_transparent() {
    let mut workspace = drawn_workspace();
    let mut history = History::default();
    let mut captured = Vec::new();

    let edits: Vec<Box<dyn Fn(&mut MemoryWorkspace)>> = vec![
        Box::new(|_: &mut MemoryWorkspace| {}),
        Box::new(|w: &mut MemoryWorkspace| w.upsert(ObjectKind::Point, point("p1", 5, 5))),
        Box::new(|w: &mut MemoryWorkspace| w.upsert(ObjectKind::Shape, square("s2", 4))),
        Box::new(|w: &mut MemoryWorkspace| {
            w.remove(ObjectKind::Shape, "s1");
        }),
        Box::new(|w: &mut MemoryWorkspace| w.upsert(ObjectKind::Point, point("p1", 0, 0))),
        Box::new(|w: &mut MemoryWorkspace| w.upsert(ObjectKind::Segment, ObjectData::new("g1").with("len", json!(3)))),
        Box::new(|w: &mut MemoryWorkspace| w.set_zoom(2.0)),
    ];

    for edit in &edits {
        edit(&mut workspace);
        history.add_entry(&workspace);
        captured.push(workspace.capture_snapshot());
    }

    assert!(
        history
            .entries()
            .iter()
            .any(|e| e.snapshot.objects.reference_count() > 0)
    );
    for (index, expected) in captured.iter().enumerate() {
        assert_eq!(&history.resolve_entry(index).unwrap(), expected);
    }
    assert!(history.validate().is_ok());
}

#[test]
fn test_multi_hop_chain_resolves() {
    // Data written by older versions may chain through several references
    let history: History = serde_json::from_value(json!({
        "entries": [
            { "snapshot": { "objects": { "shapesData": [{ "id": "s1", "x": 1 }] } } },
            { "snapshot": { "objects": { "shapesData": [{ "id": "s1", "indexOfReference": 0 }] } } },
            { "snapshot": { "objects": { "shapesData": [{ "id": "s1", "indexOfReference": 1 }] } } }
        ],
        "cursor": 2
    }))
    .unwrap();

    let snapshot = history.resolve_entry(2).unwrap();
    let shape = snapshot.objects.find(ObjectKind::Shape, "s1").unwrap();
    assert_eq!(shape.as_full().unwrap().fields.get("x"), Some(&json!(1)));
}

#[test]
fn test_compaction_skips_over_legacy_chain() {
    let mut history: History = serde_json::from_value(json!({
        "entries": [
            { "snapshot": { "objects": { "shapesData": [{ "id": "s1", "x": 1 }] } } },
            { "snapshot": { "objects": { "shapesData": [{ "id": "s1", "indexOfReference": 0 }] } } }
        ],
        "cursor": 1
    }))
    .unwrap();

    let mut snapshot = WorkspaceSnapshot::default();
    snapshot
        .objects
        .shapes_data
        .push(ObjectData::new("s1").with("x", json!(1)).into());
    history.push_entry(HistoryEntry::new(snapshot, Default::default()));

    match history.entries()[2].snapshot.objects.find(ObjectKind::Shape, "s1").unwrap() {
        ObjectRecord::Reference(reference) => assert_eq!(reference.index_of_reference, 0),
        ObjectRecord::Full(_) => panic!("s1 should be shared"),
    }
}

#[test]
fn test_dangling_reference_falls_back_to_start() {
    let mut history: History = serde_json::from_value(json!({
        "entries": [
            { "snapshot": { "objects": { "shapesData": [{ "id": "s1", "x": 1 }] } } },
            { "snapshot": { "objects": { "shapesData": [{ "id": "ghost", "indexOfReference": 0 }] } } }
        ],
        "cursor": 0,
        "startSnapshot": { "zoomLevel": 3.0 }
    }))
    .unwrap();
    let mut workspace = MemoryWorkspace::new();

    let result = history.redo(&mut workspace);

    assert!(matches!(result, Err(HistoryError::DanglingReference { .. })));
    assert!(result.unwrap_err().is_integrity_fault());
    assert_eq!(history.cursor(), -1);
    assert_eq!(workspace.capture_snapshot().zoom_level, 3.0);
    assert!(workspace.capture_snapshot().objects.is_empty());
}

#[test]
fn test_validate_rejects_forward_reference() {
    let history: History = serde_json::from_value(json!({
        "entries": [
            { "snapshot": { "objects": { "pointsData": [{ "id": "p1", "indexOfReference": 1 }] } } },
            { "snapshot": { "objects": { "pointsData": [{ "id": "p1", "x": 0 }] } } }
        ],
        "cursor": 1
    }))
    .unwrap();

    assert!(matches!(
        history.validate(),
        Err(HistoryError::ForwardReference { target: 1, .. })
    ));
}

#[test]
fn test_validate_rejects_cursor_out_of_range() {
    let history: History = serde_json::from_value(json!({
        "entries": [],
        "cursor": 4
    }))
    .unwrap();

    assert_eq!(
        history.validate(),
        Err(HistoryError::CursorOutOfRange { cursor: 4, last: -1 })
    );
}

#[test]
fn test_history_serialization_layout() {
    let workspace = drawn_workspace();
    let mut history = History::default();
    history.add_entry(&workspace);

    let json = serde_json::to_value(&history).unwrap();
    assert!(json["entries"].is_array());
    assert_eq!(json["cursor"], json!(0));
    assert!(json.get("startSnapshot").is_some());
    assert!(json.get("startSettings").is_some());

    let parsed: History = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, history);
}
