//! The append-only action log and its playback cursors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bus::EventKind;
use crate::workspace::{SettingsSnapshot, WorkspaceSnapshot};

use super::step::{ActionLogStep, Checkpoint};

/// Ordered record of user input and checkpoints for one workspace session.
///
/// Only `steps` and `totalActions` are persisted (`fullHistory`); the cursors
/// and flags describe an ongoing playback and start from zero on load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLog {
    pub steps: Vec<ActionLogStep>,
    #[serde(default)]
    pub total_actions: u32,
    /// Index of the next step to play
    #[serde(skip)]
    pub cursor: usize,
    /// Last reached action index
    #[serde(skip)]
    pub action_cursor: u32,
    /// Playback in progress; recording is frozen
    #[serde(skip)]
    pub is_running: bool,
    /// Playback advancing on its own (as opposed to paused)
    #[serde(skip)]
    pub is_playing: bool,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push_event(&mut self, kind: EventKind, payload: Value, timestamp: u64) {
        self.steps.push(ActionLogStep::event(kind, payload, timestamp));
    }

    /// Append a checkpoint and return its action index
    pub fn push_checkpoint(
        &mut self,
        name: impl Into<String>,
        snapshot: WorkspaceSnapshot,
        settings: SettingsSnapshot,
        timestamp: u64,
    ) -> u32 {
        let action_index = self.checkpoint_count() + 1;
        self.steps.push(ActionLogStep::checkpoint(
            Checkpoint {
                name: name.into(),
                action_index,
                snapshot,
                settings,
            },
            timestamp,
        ));
        self.total_actions = action_index;
        action_index
    }

    pub fn checkpoints(&self) -> impl Iterator<Item = (usize, &Checkpoint)> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(position, step)| step.as_checkpoint().map(|c| (position, c)))
    }

    pub fn checkpoint_count(&self) -> u32 {
        self.checkpoints().count() as u32
    }

    /// Step position and payload of the checkpoint with exactly `action_index`
    pub fn find_checkpoint(&self, action_index: u32) -> Option<(usize, &Checkpoint)> {
        self.checkpoints()
            .find(|(_, checkpoint)| checkpoint.action_index == action_index)
    }

    /// Timestamp of the last recorded step
    pub fn duration(&self) -> u64 {
        self.steps.last().map_or(0, |step| step.timestamp)
    }

    /// Back to the not-playing state, keeping the recorded steps
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.action_cursor = 0;
        self.is_running = false;
        self.is_playing = false;
    }

    /// `total_actions` and checkpoint indices are `1..=n` in step order.
    ///
    /// Returns a description of the first mismatch found.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut expected = 1;
        for (position, checkpoint) in self.checkpoints() {
            if checkpoint.action_index != expected {
                return Err(format!(
                    "checkpoint at step {} has action index {}, expected {}",
                    position, checkpoint.action_index, expected
                ));
            }
            expected += 1;
        }

        let count = expected - 1;
        if count != self.total_actions {
            return Err(format!(
                "totalActions is {} but the log holds {} checkpoints",
                self.total_actions, count
            ));
        }
        Ok(())
    }
}
