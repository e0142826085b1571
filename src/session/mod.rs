//! The open workspace session and its Bevy surface.
//!
//! [`EditorSession`] owns the snapshot producer, event bus, history, action
//! log, recorder and replay scheduler of one workspace. The plugin exposes it
//! through request messages and drives playback from the frame clock.

mod messages;
pub mod state;
mod systems;

#[cfg(test)]
mod tests;

pub use messages::{
    ActionCompletedRequest, EngineNotification, InputEvent, OpenDocumentRequest, RedoRequest,
    ReplayFinished, ReplayProgress, ReplayRequest, SaveDocumentRequest, UndoRequest,
};
pub use state::EditorSession;

use bevy::prelude::*;

use crate::config::ConfigLoaded;

/// Ordering for everything that touches the session in `Update`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSystems;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EditorSession>()
            .add_message::<InputEvent>()
            .add_message::<ActionCompletedRequest>()
            .add_message::<UndoRequest>()
            .add_message::<RedoRequest>()
            .add_message::<ReplayRequest>()
            .add_message::<SaveDocumentRequest>()
            .add_message::<OpenDocumentRequest>()
            .add_message::<EngineNotification>()
            .add_message::<ReplayProgress>()
            .add_message::<ReplayFinished>()
            .add_systems(Startup, systems::apply_config_system.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    systems::apply_config_system,
                    systems::open_document_system.run_if(on_message::<OpenDocumentRequest>),
                    systems::handle_input_events.run_if(on_message::<InputEvent>),
                    systems::handle_action_completed.run_if(on_message::<ActionCompletedRequest>),
                    systems::handle_undo.run_if(on_message::<UndoRequest>),
                    systems::handle_redo.run_if(on_message::<RedoRequest>),
                    systems::handle_replay_requests.run_if(on_message::<ReplayRequest>),
                    systems::drive_session,
                    systems::save_document_system.run_if(on_message::<SaveDocumentRequest>),
                )
                    .chain()
                    .in_set(SessionSystems),
            );
    }
}
