//! Indexed, truncatable undo/redo history with a cursor.

use bevy::log::{error, info};
use serde::{Deserialize, Serialize};

use crate::workspace::{SettingsSnapshot, SnapshotProducer, WorkspaceSnapshot};

use super::compaction::{compact_entry, resolve_snapshot};
use super::entry::HistoryEntry;
use super::error::HistoryError;

/// Undo/redo history of one workspace session.
///
/// `cursor` is in `[-1, entries.len() - 1]`; `-1` means the start snapshot
/// is the current state. The serialized form is the persisted `history`
/// document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: isize,
    #[serde(default)]
    start_snapshot: WorkspaceSnapshot,
    #[serde(default)]
    start_settings: SettingsSnapshot,
}

impl Default for History {
    fn default() -> Self {
        Self::new(WorkspaceSnapshot::default(), SettingsSnapshot::default())
    }
}

impl History {
    pub fn new(start_snapshot: WorkspaceSnapshot, start_settings: SettingsSnapshot) -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
            start_snapshot,
            start_settings,
        }
    }

    /// Empty history whose start state is the live workspace
    pub fn from_producer(producer: &dyn SnapshotProducer) -> Self {
        Self::new(producer.capture_snapshot(), producer.capture_settings())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor != -1
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.last_index()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn start_snapshot(&self) -> &WorkspaceSnapshot {
        &self.start_snapshot
    }

    pub fn start_settings(&self) -> &SettingsSnapshot {
        &self.start_settings
    }

    fn last_index(&self) -> isize {
        self.entries.len() as isize - 1
    }

    /// Commit the live workspace as a new entry
    pub fn add_entry(&mut self, producer: &dyn SnapshotProducer) -> usize {
        self.push_entry(HistoryEntry::capture(producer))
    }

    /// Append an entry after the cursor, discarding the redo branch
    pub fn push_entry(&mut self, entry: HistoryEntry) -> usize {
        let keep = (self.cursor + 1) as usize;
        let discarded = self.entries.len().saturating_sub(keep);
        self.entries.truncate(keep);
        if discarded > 0 {
            info!("Discarded {} redo entries", discarded);
        }

        self.entries.push(entry);
        let index = self.entries.len() - 1;
        compact_entry(&mut self.entries, index);
        self.cursor = index as isize;
        index
    }

    pub fn undo(&mut self, producer: &mut dyn SnapshotProducer) -> Result<(), HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        self.move_cursor(self.cursor - 1, producer)
    }

    pub fn redo(&mut self, producer: &mut dyn SnapshotProducer) -> Result<(), HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        self.move_cursor(self.cursor + 1, producer)
    }

    /// Move to `target` and rebuild the workspace from it.
    ///
    /// If the target cannot be resolved the workspace falls back to the
    /// start snapshot and the cursor to -1, so it never shows a partial state.
    fn move_cursor(
        &mut self,
        target: isize,
        producer: &mut dyn SnapshotProducer,
    ) -> Result<(), HistoryError> {
        self.cursor = target;
        match self.resolve_current() {
            Ok((snapshot, settings)) => {
                producer.apply_snapshot(&snapshot);
                producer.apply_settings(&settings);
                Ok(())
            }
            Err(e) => {
                error!("Failed to rebuild history entry {}: {}", target, e);
                self.cursor = -1;
                producer.apply_snapshot(&self.start_snapshot);
                producer.apply_settings(&self.start_settings);
                Err(e)
            }
        }
    }

    /// Resolved snapshot and settings at the cursor
    pub fn resolve_current(&self) -> Result<(WorkspaceSnapshot, SettingsSnapshot), HistoryError> {
        if self.cursor == -1 {
            return Ok((self.start_snapshot.clone(), self.start_settings.clone()));
        }

        let index = self.cursor as usize;
        let snapshot = resolve_snapshot(&self.entries, index)?;
        let settings = self.entries[index].settings.clone();
        Ok((snapshot, settings))
    }

    /// Snapshot of entry `index` with every back-reference resolved
    pub fn resolve_entry(&self, index: usize) -> Result<WorkspaceSnapshot, HistoryError> {
        resolve_snapshot(&self.entries, index)
    }

    /// Check the cursor range and that every entry resolves
    pub fn validate(&self) -> Result<(), HistoryError> {
        if self.cursor < -1 || self.cursor > self.last_index() {
            return Err(HistoryError::CursorOutOfRange {
                cursor: self.cursor,
                last: self.last_index(),
            });
        }
        for index in 0..self.entries.len() {
            resolve_snapshot(&self.entries, index)?;
        }
        Ok(())
    }
}
