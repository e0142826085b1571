use std::time::Duration;

use bevy::prelude::*;
use serde_json::{Map, Value, json};

use crate::action_log::{ActionLog, Recorder, TimelineSegment, compact, timeline};
use crate::bus::{EventBus, EventKind};
use crate::config::ReplayConfigData;
use crate::constants::{REDO_ACTION_NAME, UNDO_ACTION_NAME};
use crate::document::{DocumentError, SessionDocument};
use crate::history::{History, HistoryError};
use crate::replay::{
    Pacing, PlaybackState, ReplayContext, ReplayError, ReplayEvent, ReplayScheduler,
};
use crate::workspace::{MemoryWorkspace, SettingsSnapshot, SnapshotProducer, WorkspaceSnapshot};

/// Everything the engine owns for the open workspace.
///
/// History, action log and scheduler are replaced wholesale when a new
/// workspace is started or a document is opened, never merged.
#[derive(Resource)]
pub struct EditorSession {
    producer: Box<dyn SnapshotProducer>,
    bus: EventBus,
    history: History,
    log: ActionLog,
    recorder: Recorder,
    scheduler: ReplayScheduler,
    /// Document fields owned by the rest of the editor, written back on export
    document_fields: Map<String, Value>,
    include_history_on_export: bool,
    /// A checkpoint was recorded since the last export or open
    dirty: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Box::new(MemoryWorkspace::new()), &ReplayConfigData::default())
    }
}

impl EditorSession {
    pub fn new(producer: Box<dyn SnapshotProducer>, config: &ReplayConfigData) -> Self {
        let mut bus = EventBus::new();
        let mut recorder = Recorder::new(config.ignored_tools.clone());
        recorder.attach(&mut bus);

        Self {
            history: History::from_producer(producer.as_ref()),
            producer,
            bus,
            log: ActionLog::new(),
            recorder,
            scheduler: ReplayScheduler::new(Pacing::from(config)),
            document_fields: Map::new(),
            include_history_on_export: config.include_history_on_export,
            dirty: false,
        }
    }

    pub fn apply_config(&mut self, config: &ReplayConfigData) {
        self.recorder.set_ignored_tools(config.ignored_tools.clone());
        self.scheduler.set_pacing(Pacing::from(config));
        self.include_history_on_export = config.include_history_on_export;
    }

    pub fn producer(&self) -> &dyn SnapshotProducer {
        self.producer.as_ref()
    }

    pub fn producer_mut(&mut self) -> &mut dyn SnapshotProducer {
        self.producer.as_mut()
    }

    /// The session bus, for outside subscribers
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_replaying(&self) -> bool {
        self.log.is_running
    }

    pub fn can_undo(&self) -> bool {
        !self.log.is_running && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.log.is_running && self.history.can_redo()
    }

    pub fn timeline(&self) -> Vec<TimelineSegment> {
        timeline(&self.log.steps)
    }

    /// Publish an event and record it.
    ///
    /// An `action-completed` event also commits a history entry, unless it
    /// comes from a running replay.
    pub fn publish(&mut self, kind: EventKind, payload: Value) -> usize {
        if kind == EventKind::ActionCompleted && !self.log.is_running {
            self.history.add_entry(self.producer.as_ref());
        }
        let delivered = self.bus.publish(kind, payload);
        self.pump();
        delivered
    }

    /// Signal that an edit operation finished
    pub fn complete_action(&mut self, name: &str) -> usize {
        self.publish(EventKind::ActionCompleted, json!({ "name": name }))
    }

    pub fn undo(&mut self) -> Result<(), HistoryError> {
        if self.log.is_running {
            return Err(HistoryError::PlaybackInProgress);
        }
        let result = self.history.undo(self.producer.as_mut());
        self.after_history_move(EventKind::Undo, UNDO_ACTION_NAME, &result);
        result
    }

    pub fn redo(&mut self) -> Result<(), HistoryError> {
        if self.log.is_running {
            return Err(HistoryError::PlaybackInProgress);
        }
        let result = self.history.redo(self.producer.as_mut());
        self.after_history_move(EventKind::Redo, REDO_ACTION_NAME, &result);
        result
    }

    /// Record the move as an event plus a checkpoint whenever the workspace
    /// changed, including the fallback to the start state
    fn after_history_move(
        &mut self,
        kind: EventKind,
        name: &str,
        result: &Result<(), HistoryError>,
    ) {
        let changed = match result {
            Ok(()) => true,
            Err(e) => e.is_integrity_fault(),
        };
        if !changed {
            return;
        }

        self.bus.publish(kind, Value::Null);
        self.pump();
        self.recorder
            .record_checkpoint(name, &mut self.log, self.producer.as_ref());
        self.dirty = true;
    }

    /// Start over from `start`, dropping history, log and any playback
    pub fn reset(&mut self, start: &WorkspaceSnapshot, settings: &SettingsSnapshot) {
        self.producer.apply_snapshot(start);
        self.producer.apply_settings(settings);
        self.replace_state(History::new(start.clone(), settings.clone()), ActionLog::new());
        self.recorder.restart_clock();
        self.document_fields.clear();
        self.dirty = false;
        info!("Started a new workspace session");
    }

    /// Persisted form of the session, with the action log compacted first
    pub fn export_document(&mut self) -> SessionDocument {
        if !self.log.is_running {
            compact(&mut self.log.steps);
        }
        self.dirty = false;

        SessionDocument {
            history: self
                .include_history_on_export
                .then(|| self.history.clone()),
            full_history: Some(self.log.clone()),
            other: self.document_fields.clone(),
        }
    }

    /// Replace the session with an opened document
    pub fn open_document(&mut self, document: SessionDocument) -> Result<(), DocumentError> {
        document.check()?;

        // Without a stored history the log starts from an empty workspace,
        // not from whatever the previous session left on screen
        let history = document
            .history
            .unwrap_or_else(|| History::new(WorkspaceSnapshot::default(), SettingsSnapshot::default()));
        match history.resolve_current() {
            Ok((snapshot, settings)) => {
                self.producer.apply_snapshot(&snapshot);
                self.producer.apply_settings(&settings);
            }
            Err(e) => {
                warn!("Opened history cannot be rebuilt, showing its start state: {}", e);
                self.producer.apply_snapshot(history.start_snapshot());
                self.producer.apply_settings(history.start_settings());
            }
        }

        let log = document.full_history.unwrap_or_default();
        self.recorder.restart_clock();
        self.recorder.tick(Duration::from_millis(log.duration()));
        info!(
            "Opened session: {} history entries, {} recorded actions",
            history.len(),
            log.total_actions
        );

        self.replace_state(history, log);
        self.document_fields = document.other;
        self.dirty = false;
        Ok(())
    }

    fn replace_state(&mut self, history: History, mut log: ActionLog) {
        log.rewind();
        self.history = history;
        self.log = log;
        self.scheduler.reset();
        self.recorder.discard_pending(&mut self.bus);
    }

    /// Advance the recording clock and any running playback
    pub fn tick(&mut self, delta: Duration) {
        self.recorder.tick(delta);
        self.pump();
        self.with_replay(|scheduler, ctx| scheduler.tick(ctx, delta));
    }

    fn pump(&mut self) {
        let before = self.log.total_actions;
        self.recorder
            .pump(&mut self.bus, &mut self.log, self.producer.as_ref());
        if self.log.total_actions != before {
            self.dirty = true;
        }
    }

    /// Run a scheduler operation against this session.
    ///
    /// Events the replay put on the bus are never recorded, so the
    /// recorder's mailbox is emptied whenever playback was involved.
    fn with_replay<R>(
        &mut self,
        operation: impl FnOnce(&mut ReplayScheduler, &mut ReplayContext) -> R,
    ) -> R {
        let was_running = self.log.is_running;
        let mut ctx = ReplayContext {
            producer: self.producer.as_mut(),
            bus: &mut self.bus,
            log: &mut self.log,
            history: &mut self.history,
        };
        let result = operation(&mut self.scheduler, &mut ctx);

        if was_running || self.log.is_running {
            self.recorder.discard_pending(&mut self.bus);
        }
        result
    }

    pub fn replay_state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    pub fn drain_replay_events(&mut self) -> Vec<ReplayEvent> {
        self.scheduler.drain_events()
    }

    pub fn start_replay(&mut self) -> Result<(), ReplayError> {
        self.pump();
        self.with_replay(|scheduler, ctx| scheduler.start(ctx))
    }

    pub fn step(&mut self) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.step(ctx))
    }

    pub fn play(&mut self) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.play(ctx))
    }

    pub fn pause(&mut self) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.pause(ctx))
    }

    pub fn resume(&mut self) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.resume(ctx))
    }

    pub fn seek(&mut self, action_index: u32) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.seek(ctx, action_index))
    }

    pub fn stop_replay(&mut self) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.stop(ctx))
    }

    pub fn play_action(&mut self, action_index: u32) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.play_action(ctx, action_index))
    }

    pub fn previous_action(&mut self) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.previous_action(ctx))
    }

    pub fn next_action(&mut self) -> Result<(), ReplayError> {
        self.with_replay(|scheduler, ctx| scheduler.next_action(ctx))
    }
}
