//! Tests for the editor session and its plugin.

use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use serde_json::json;

use crate::bus::EventKind;
use crate::config::ReplayConfigData;
use crate::history::HistoryError;
use crate::replay::{PlaybackState, ReplayError};
use crate::workspace::{
    MemoryWorkspace, ObjectData, SettingsSnapshot, SnapshotProducer, WorkspaceSnapshot,
};

use super::*;

fn shape(id: &str) -> ObjectData {
    ObjectData::new(id).with("type", json!("triangle"))
}

fn add_shape(session: &mut EditorSession, id: &str) {
    let mut snapshot = session.producer().capture_snapshot();
    snapshot.objects.shapes_data.push(shape(id).into());
    session.producer_mut().apply_snapshot(&snapshot);
}

fn shape_count(session: &EditorSession) -> usize {
    session.producer().capture_snapshot().objects.shapes_data.len()
}

fn immediate_config() -> ReplayConfigData {
    ReplayConfigData {
        step_padding_ms: 0,
        settings_change_delay_ms: 0,
        action_delays_ms: Default::default(),
        ..ReplayConfigData::default()
    }
}

/// Session with two recorded actions: two shapes created one after the other
fn recorded_session() -> EditorSession {
    let mut session = EditorSession::new(Box::new(MemoryWorkspace::new()), &immediate_config());
    session.publish(EventKind::ToolChanged, json!({ "name": "create" }));
    add_shape(&mut session, "t1");
    session.complete_action("create");
    add_shape(&mut session, "t2");
    session.complete_action("create");
    session
}

#[test]
fn test_action_completed_commits_history_and_checkpoint() {
    let session = recorded_session();

    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().cursor(), 1);
    assert_eq!(session.log().total_actions, 2);
    assert!(session.is_dirty());
}

#[test]
fn test_undo_records_checkpoint() {
    let mut session = recorded_session();

    session.undo().unwrap();

    assert_eq!(shape_count(&session), 1);
    let last = session.log().steps.last().unwrap().as_checkpoint().unwrap();
    assert_eq!(last.name, "undo");
    assert_eq!(last.action_index, 3);
    assert!(
        session
            .log()
            .steps
            .iter()
            .any(|step| step.kind == EventKind::Undo)
    );

    session.redo().unwrap();
    assert_eq!(shape_count(&session), 2);
    assert_eq!(session.log().total_actions, 4);
}

#[test]
fn test_refused_undo_records_nothing() {
    let mut session = EditorSession::default();

    assert_eq!(session.undo(), Err(HistoryError::NothingToUndo));
    assert!(session.log().is_empty());
    assert!(!session.is_dirty());
}

#[test]
fn test_undo_is_refused_during_replay() {
    let mut session = recorded_session();
    session.start_replay().unwrap();

    assert!(!session.can_undo());
    assert_eq!(session.undo(), Err(HistoryError::PlaybackInProgress));
    assert_eq!(session.redo(), Err(HistoryError::PlaybackInProgress));
}

#[test]
fn test_replay_events_are_not_recorded() {
    let mut session = recorded_session();
    let steps_before = session.log().len();

    session.start_replay().unwrap();
    session.play().unwrap();
    for _ in 0..100 {
        session.tick(Duration::from_millis(16));
    }

    assert_eq!(session.replay_state(), PlaybackState::Finished);
    assert_eq!(session.log().len(), steps_before);
    assert_eq!(session.history().len(), 2);

    session.publish(EventKind::Click, json!({}));
    assert_eq!(session.log().len(), steps_before + 1);
}

#[test]
fn test_stop_restores_pre_playback_undo_state() {
    let mut session = recorded_session();
    session.undo().unwrap();
    let cursor_before = session.history().cursor();

    session.start_replay().unwrap();
    session.seek(1).unwrap();
    session.stop_replay().unwrap();

    assert_eq!(session.history().cursor(), cursor_before);
    assert!(session.can_undo());
    assert!(session.can_redo());
}

#[test]
fn test_start_replay_on_empty_log() {
    let mut session = EditorSession::default();
    assert_eq!(session.start_replay(), Err(ReplayError::EmptyLog));
}

#[test]
fn test_export_then_open_round_trips() {
    let mut session = recorded_session();
    session.publish(EventKind::PointerMove, json!({ "x": 1 }));
    session.publish(EventKind::Click, json!({}));

    let document = session.export_document();
    assert!(!session.is_dirty());
    assert!(document.history.is_some());
    let log = document.full_history.clone().unwrap();
    assert!(log.steps.iter().all(|step| step.kind != EventKind::PointerMove));

    let mut reopened = EditorSession::default();
    reopened.open_document(document).unwrap();

    assert_eq!(reopened.log().steps, log.steps);
    assert_eq!(reopened.history().cursor(), 1);
    assert_eq!(shape_count(&reopened), 2);
    assert!(!reopened.is_dirty());
}

#[test]
fn test_export_can_leave_out_history() {
    let mut session = recorded_session();
    session.apply_config(&ReplayConfigData {
        include_history_on_export: false,
        ..immediate_config()
    });

    assert!(session.export_document().history.is_none());
}

#[test]
fn test_open_without_history_starts_from_empty_workspace() {
    let mut recorded = recorded_session();
    recorded.apply_config(&ReplayConfigData {
        include_history_on_export: false,
        ..immediate_config()
    });
    let document = recorded.export_document();

    let mut session = EditorSession::new(Box::new(MemoryWorkspace::new()), &immediate_config());
    for id in ["stale1", "stale2", "stale3"] {
        add_shape(&mut session, id);
    }
    session.complete_action("create");

    session.open_document(document).unwrap();
    assert_eq!(shape_count(&session), 0);
    assert_eq!(session.history().start_snapshot(), &WorkspaceSnapshot::default());
    assert!(!session.can_undo());

    session.start_replay().unwrap();
    assert_eq!(shape_count(&session), 0);

    session.seek(2).unwrap();
    assert_eq!(shape_count(&session), 2);
    session.seek(0).unwrap();
    assert_eq!(shape_count(&session), 0);
}

#[test]
fn test_stop_after_finish_is_accepted() {
    let mut session = recorded_session();
    session.start_replay().unwrap();
    session.play().unwrap();
    for _ in 0..100 {
        session.tick(Duration::from_millis(16));
    }
    assert_eq!(session.replay_state(), PlaybackState::Finished);

    session.stop_replay().unwrap();

    assert_eq!(session.replay_state(), PlaybackState::Idle);
    assert!(session.can_undo());
    assert_eq!(session.history().cursor(), 1);
}

#[test]
fn test_reset_replaces_everything() {
    let mut session = recorded_session();
    let mut start = WorkspaceSnapshot::default();
    start.zoom_level = 2.0;

    session.reset(&start, &SettingsSnapshot::default());

    assert!(session.history().is_empty());
    assert!(session.log().is_empty());
    assert_eq!(session.producer().capture_snapshot(), start);
    assert_eq!(session.history().start_snapshot(), &start);
}

#[test]
fn test_timeline_of_session() {
    let session = recorded_session();
    let segments = session.timeline();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].name.as_deref(), Some("create"));
    assert_eq!(segments[0].actions.len(), 2);
}

fn test_app() -> App {
    let mut app = App::new();
    app.init_resource::<Time>();
    app.add_plugins(SessionPlugin);
    app
}

fn message_count<M: Message>(app: &App) -> usize {
    app.world().resource::<Messages<M>>().len()
}

#[test]
fn test_plugin_records_input_and_actions() {
    let mut app = test_app();

    app.world_mut().write_message(InputEvent {
        kind: EventKind::PointerDown,
        payload: json!({ "x": 2 }),
    });
    app.world_mut().write_message(ActionCompletedRequest {
        name: "create".to_string(),
    });
    app.update();

    let session = app.world().resource::<EditorSession>();
    assert_eq!(session.log().len(), 2);
    assert_eq!(session.log().total_actions, 1);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_plugin_reports_refused_undo() {
    let mut app = test_app();

    app.world_mut().write_message(UndoRequest);
    app.update();

    assert_eq!(message_count::<EngineNotification>(&app), 1);
}

#[test]
fn test_plugin_plays_to_the_end() {
    let mut app = test_app();
    app.insert_resource(recorded_session());
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_millis(16));

    app.world_mut().write_message(ReplayRequest::Start);
    app.world_mut().write_message(ReplayRequest::Play);
    for _ in 0..20 {
        app.update();
    }

    let session = app.world().resource::<EditorSession>();
    assert_eq!(session.replay_state(), PlaybackState::Finished);
    assert!(!session.is_replaying());
}
