//! In-memory workspace used by the headless replay runner and by tests.

use super::producer::SnapshotProducer;
use super::snapshot::{ObjectData, ObjectKind, ObjectRecord, SettingsSnapshot, WorkspaceSnapshot};

/// A workspace that simply holds the last applied snapshot and settings
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    snapshot: WorkspaceSnapshot,
    settings: SettingsSnapshot,
    /// Every snapshot passed to `apply_snapshot`, when tracking is enabled
    applied: Option<Vec<WorkspaceSnapshot>>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A workspace that remembers every snapshot applied to it
    pub fn tracking() -> Self {
        Self {
            applied: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> &WorkspaceSnapshot {
        &self.snapshot
    }

    pub fn settings(&self) -> &SettingsSnapshot {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsSnapshot {
        &mut self.settings
    }

    /// Insert an object, or replace the one with the same id
    pub fn upsert(&mut self, kind: ObjectKind, data: ObjectData) {
        let records = self.snapshot.objects.records_mut(kind);
        match records.iter_mut().find(|record| record.id() == data.id) {
            Some(existing) => *existing = ObjectRecord::Full(data),
            None => records.push(ObjectRecord::Full(data)),
        }
    }

    /// Remove an object, returning whether it existed
    pub fn remove(&mut self, kind: ObjectKind, id: &str) -> bool {
        let records = self.snapshot.objects.records_mut(kind);
        let before = records.len();
        records.retain(|record| record.id() != id);
        records.len() != before
    }

    pub fn object(&self, kind: ObjectKind, id: &str) -> Option<&ObjectData> {
        self.snapshot
            .objects
            .find(kind, id)
            .and_then(ObjectRecord::as_full)
    }

    pub fn object_ids(&self, kind: ObjectKind) -> Vec<&str> {
        self.snapshot
            .objects
            .records(kind)
            .iter()
            .map(ObjectRecord::id)
            .collect()
    }

    pub fn set_zoom(&mut self, zoom_level: f64) {
        self.snapshot.zoom_level = zoom_level;
    }

    /// Snapshots applied so far (empty unless created with [`Self::tracking`])
    pub fn applied(&self) -> &[WorkspaceSnapshot] {
        self.applied.as_deref().unwrap_or(&[])
    }
}

impl SnapshotProducer for MemoryWorkspace {
    fn capture_snapshot(&self) -> WorkspaceSnapshot {
        self.snapshot.clone()
    }

    fn apply_snapshot(&mut self, snapshot: &WorkspaceSnapshot) {
        self.snapshot = snapshot.clone();
        if let Some(applied) = self.applied.as_mut() {
            applied.push(snapshot.clone());
        }
    }

    fn capture_settings(&self) -> SettingsSnapshot {
        self.settings.clone()
    }

    fn apply_settings(&mut self, settings: &SettingsSnapshot) {
        self.settings = settings.clone();
    }
}
