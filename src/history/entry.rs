//! A single undo/redo history entry.

use serde::{Deserialize, Serialize};

use crate::workspace::{SettingsSnapshot, SnapshotProducer, WorkspaceSnapshot};

/// Workspace state committed after one completed edit.
///
/// Once stored, `snapshot` may contain back-references to earlier entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub snapshot: WorkspaceSnapshot,
    #[serde(default)]
    pub settings: SettingsSnapshot,
}

impl HistoryEntry {
    pub fn new(snapshot: WorkspaceSnapshot, settings: SettingsSnapshot) -> Self {
        Self { snapshot, settings }
    }

    /// Capture the live workspace
    pub fn capture(producer: &dyn SnapshotProducer) -> Self {
        Self {
            snapshot: producer.capture_snapshot(),
            settings: producer.capture_settings(),
        }
    }
}
