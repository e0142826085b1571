//! The narrow interface through which the engine reads and rebuilds the live
//! drawing state.

use super::snapshot::{SettingsSnapshot, WorkspaceSnapshot};

/// Produces snapshots of the live workspace and rebuilds it from them.
///
/// Applying the same snapshot twice must leave the same visible state.
pub trait SnapshotProducer: Send + Sync {
    /// Capture the live figures, groups and view transform
    fn capture_snapshot(&self) -> WorkspaceSnapshot;

    /// Replace the live figures, groups and view transform
    fn apply_snapshot(&mut self, snapshot: &WorkspaceSnapshot);

    fn capture_settings(&self) -> SettingsSnapshot;

    fn apply_settings(&mut self, settings: &SettingsSnapshot);
}
