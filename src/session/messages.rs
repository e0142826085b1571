use std::path::PathBuf;

use bevy::prelude::*;
use serde_json::Value;

use crate::bus::EventKind;

/// Raw input or UI event to publish on the session bus
#[derive(Message, Clone, Debug)]
pub struct InputEvent {
    pub kind: EventKind,
    pub payload: Value,
}

/// An edit operation finished
#[derive(Message, Clone, Debug)]
pub struct ActionCompletedRequest {
    pub name: String,
}

#[derive(Message)]
pub struct UndoRequest;

#[derive(Message)]
pub struct RedoRequest;

/// Playback controls
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayRequest {
    Start,
    Play,
    Pause,
    Resume,
    Step,
    Seek(u32),
    Stop,
    PlayAction(u32),
    PreviousAction,
    NextAction,
}

#[derive(Message)]
pub struct SaveDocumentRequest {
    pub path: PathBuf,
}

#[derive(Message)]
pub struct OpenDocumentRequest {
    pub path: PathBuf,
}

/// Transient, user-facing report of a refused or failed operation
#[derive(Message, Clone, Debug)]
pub struct EngineNotification {
    pub message: String,
}

/// Playback reached a checkpoint
#[derive(Message, Clone, Debug)]
pub struct ReplayProgress {
    pub action_index: u32,
    pub total_actions: u32,
    pub name: String,
}

/// Playback reached the end of the log on its own
#[derive(Message)]
pub struct ReplayFinished;
