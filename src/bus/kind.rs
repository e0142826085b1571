//! Event kinds carried by the session event bus.

use serde::{Deserialize, Serialize};

/// Every event the engine records, replays or reacts to.
///
/// The serialized names double as the `type` tag of recorded log steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Click,
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    /// Cursor position update emitted by animations and replay
    PositionUpdate,
    ObjectSelected,
    ToolChanged,
    ToolUpdated,
    SettingsChanged,
    /// An edit operation finished; commits history and produces a checkpoint
    ActionCompleted,
    Undo,
    Redo,
    ClosePopup,
    CreateSilhouette,
    SetNumberOfParts,
    /// Synthesized by the recorder, never published by the UI
    Checkpoint,
}

impl EventKind {
    /// Kinds the recorder subscribes to
    pub const RECORDED: [EventKind; 20] = [
        EventKind::PointerDown,
        EventKind::PointerMove,
        EventKind::PointerUp,
        EventKind::Click,
        EventKind::Wheel,
        EventKind::TouchStart,
        EventKind::TouchMove,
        EventKind::TouchEnd,
        EventKind::TouchCancel,
        EventKind::PositionUpdate,
        EventKind::ObjectSelected,
        EventKind::ToolChanged,
        EventKind::ToolUpdated,
        EventKind::SettingsChanged,
        EventKind::ActionCompleted,
        EventKind::Undo,
        EventKind::Redo,
        EventKind::ClosePopup,
        EventKind::CreateSilhouette,
        EventKind::SetNumberOfParts,
    ];

    /// Pointer motion that carries no decision unless a button is held
    pub fn is_pointer_motion(self) -> bool {
        matches!(self, EventKind::PointerMove | EventKind::PositionUpdate)
    }

    /// Starts a press (mouse button or finger down)
    pub fn is_press(self) -> bool {
        matches!(self, EventKind::PointerDown | EventKind::TouchStart)
    }

    /// Ends a press
    pub fn is_release(self) -> bool {
        matches!(
            self,
            EventKind::PointerUp | EventKind::TouchEnd | EventKind::TouchCancel
        )
    }

    pub fn is_tool_event(self) -> bool {
        matches!(self, EventKind::ToolChanged | EventKind::ToolUpdated)
    }
}
