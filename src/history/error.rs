//! Errors reported by the undo/redo history.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("History is locked while a replay is running")]
    PlaybackInProgress,
    #[error("No history entry at index {0}")]
    MissingEntry(usize),
    #[error("History cursor {cursor} is outside [-1, {last}]")]
    CursorOutOfRange { cursor: isize, last: isize },
    #[error("Dangling {kind} reference to '{id}' from history entry {position}")]
    DanglingReference {
        kind: &'static str,
        id: String,
        position: usize,
    },
    #[error("{kind} '{id}' in history entry {position} points forward to entry {target}")]
    ForwardReference {
        kind: &'static str,
        id: String,
        position: usize,
        target: usize,
    },
}

impl HistoryError {
    /// True for errors caused by corrupt stored data rather than misuse
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            HistoryError::DanglingReference { .. }
                | HistoryError::ForwardReference { .. }
                | HistoryError::MissingEntry(_)
                | HistoryError::CursorOutOfRange { .. }
        )
    }
}
