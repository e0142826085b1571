//! Bevy systems bridging messages to the [`EditorSession`].

use bevy::prelude::*;

use crate::config::ReplayConfig;
use crate::document::{load_document, save_document};
use crate::replay::ReplayEvent;

use super::messages::{
    ActionCompletedRequest, EngineNotification, InputEvent, OpenDocumentRequest, RedoRequest,
    ReplayFinished, ReplayProgress, ReplayRequest, SaveDocumentRequest, UndoRequest,
};
use super::state::EditorSession;

fn notify(notifications: &mut MessageWriter<EngineNotification>, message: String) {
    warn!("{}", message);
    notifications.write(EngineNotification { message });
}

/// Push the loaded (or changed) config into the session
pub fn apply_config_system(config: Option<Res<ReplayConfig>>, mut session: ResMut<EditorSession>) {
    if let Some(config) = config
        && config.is_changed()
    {
        session.apply_config(&config.data);
        debug!("Applied replay config to the session");
    }
}

pub fn handle_input_events(mut events: MessageReader<InputEvent>, mut session: ResMut<EditorSession>) {
    for event in events.read() {
        session.publish(event.kind, event.payload.clone());
    }
}

pub fn handle_action_completed(
    mut events: MessageReader<ActionCompletedRequest>,
    mut session: ResMut<EditorSession>,
) {
    for event in events.read() {
        session.complete_action(&event.name);
    }
}

pub fn handle_undo(
    mut events: MessageReader<UndoRequest>,
    mut session: ResMut<EditorSession>,
    mut notifications: MessageWriter<EngineNotification>,
) {
    for _ in events.read() {
        if let Err(e) = session.undo() {
            notify(&mut notifications, format!("Undo failed: {}", e));
        }
    }
}

pub fn handle_redo(
    mut events: MessageReader<RedoRequest>,
    mut session: ResMut<EditorSession>,
    mut notifications: MessageWriter<EngineNotification>,
) {
    for _ in events.read() {
        if let Err(e) = session.redo() {
            notify(&mut notifications, format!("Redo failed: {}", e));
        }
    }
}

pub fn handle_replay_requests(
    mut events: MessageReader<ReplayRequest>,
    mut session: ResMut<EditorSession>,
    mut notifications: MessageWriter<EngineNotification>,
) {
    for request in events.read() {
        let result = match *request {
            ReplayRequest::Start => session.start_replay(),
            ReplayRequest::Play => session.play(),
            ReplayRequest::Pause => session.pause(),
            ReplayRequest::Resume => session.resume(),
            ReplayRequest::Step => session.step(),
            ReplayRequest::Seek(action_index) => session.seek(action_index),
            ReplayRequest::Stop => session.stop_replay(),
            ReplayRequest::PlayAction(action_index) => session.play_action(action_index),
            ReplayRequest::PreviousAction => session.previous_action(),
            ReplayRequest::NextAction => session.next_action(),
        };
        if let Err(e) = result {
            notify(&mut notifications, format!("{:?} refused: {}", request, e));
        }
    }
}

pub fn save_document_system(
    mut events: MessageReader<SaveDocumentRequest>,
    mut session: ResMut<EditorSession>,
    mut notifications: MessageWriter<EngineNotification>,
) {
    for event in events.read() {
        let document = session.export_document();
        if let Err(e) = save_document(&event.path, &document) {
            notify(&mut notifications, format!("Failed to save session: {}", e));
        }
    }
}

pub fn open_document_system(
    mut events: MessageReader<OpenDocumentRequest>,
    mut session: ResMut<EditorSession>,
    mut notifications: MessageWriter<EngineNotification>,
) {
    for event in events.read() {
        let result = load_document(&event.path).and_then(|document| session.open_document(document));
        if let Err(e) = result {
            notify(&mut notifications, format!("Failed to open session: {}", e));
        }
    }
}

/// Advance the session by the frame time and report playback progress
pub fn drive_session(
    time: Res<Time>,
    mut session: ResMut<EditorSession>,
    mut progress: MessageWriter<ReplayProgress>,
    mut finished: MessageWriter<ReplayFinished>,
) {
    session.tick(time.delta());

    let total_actions = session.log().total_actions;
    for event in session.drain_replay_events() {
        match event {
            ReplayEvent::CheckpointReached { action_index, name } => {
                progress.write(ReplayProgress {
                    action_index,
                    total_actions,
                    name,
                });
            }
            ReplayEvent::Finished => {
                finished.write(ReplayFinished);
            }
            ReplayEvent::Paused { .. } => {}
        }
    }
}
