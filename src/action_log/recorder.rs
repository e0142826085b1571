//! Records bus events into the action log.

use std::time::Duration;

use bevy::log::{debug, warn};
use bevy::time::Stopwatch;
use serde_json::Value;

use crate::bus::{BusEvent, EventBus, EventKind, SubscriptionId};
use crate::workspace::SnapshotProducer;

use super::log::ActionLog;

/// What became of one event handed to the recorder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recorded {
    Event,
    Checkpoint(u32),
    Skipped,
}

/// Owns the recording subscription and the clock that timestamps steps
#[derive(Debug)]
pub struct Recorder {
    subscription: Option<SubscriptionId>,
    clock: Stopwatch,
    ignored_tools: Vec<String>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Recorder {
    pub fn new(ignored_tools: Vec<String>) -> Self {
        Self {
            subscription: None,
            clock: Stopwatch::new(),
            ignored_tools,
        }
    }

    pub fn set_ignored_tools(&mut self, ignored_tools: Vec<String>) {
        self.ignored_tools = ignored_tools;
    }

    pub fn attach(&mut self, bus: &mut EventBus) {
        if self.subscription.is_none() {
            self.subscription = Some(bus.subscribe_many(&EventKind::RECORDED));
        }
    }

    pub fn detach(&mut self, bus: &mut EventBus) {
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn tick(&mut self, delta: Duration) {
        self.clock.tick(delta);
    }

    pub fn restart_clock(&mut self) {
        self.clock.reset();
    }

    /// Milliseconds since recording started
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    /// Drop everything waiting in the subscription mailbox
    pub fn discard_pending(&mut self, bus: &mut EventBus) -> usize {
        match self.subscription {
            Some(id) => bus.drain(id).len(),
            None => 0,
        }
    }

    /// Record everything waiting in the subscription mailbox.
    ///
    /// Returns how many steps were appended.
    pub fn pump(
        &mut self,
        bus: &mut EventBus,
        log: &mut ActionLog,
        producer: &dyn SnapshotProducer,
    ) -> usize {
        let Some(id) = self.subscription else {
            return 0;
        };

        bus.drain(id)
            .into_iter()
            .filter(|event| self.record(event, log, producer) != Recorded::Skipped)
            .count()
    }

    pub fn record(
        &self,
        event: &BusEvent,
        log: &mut ActionLog,
        producer: &dyn SnapshotProducer,
    ) -> Recorded {
        if log.is_running {
            return Recorded::Skipped;
        }

        match event.kind {
            EventKind::Checkpoint => {
                warn!("Ignoring checkpoint published on the bus");
                Recorded::Skipped
            }
            EventKind::ActionCompleted => {
                let name = event
                    .payload
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("action");
                Recorded::Checkpoint(self.record_checkpoint(name, log, producer))
            }
            kind if kind.is_tool_event() && !self.records_tool(&event.payload) => {
                debug!("Skipping {:?} without a recordable tool name", kind);
                Recorded::Skipped
            }
            EventKind::ObjectSelected => {
                let mut payload = event.payload.clone();
                if let Value::Object(fields) = &mut payload {
                    fields.remove("object");
                }
                log.push_event(event.kind, payload, self.elapsed_ms());
                Recorded::Event
            }
            kind => {
                log.push_event(kind, event.payload.clone(), self.elapsed_ms());
                Recorded::Event
            }
        }
    }

    /// Append a checkpoint holding the full live workspace
    pub fn record_checkpoint(
        &self,
        name: &str,
        log: &mut ActionLog,
        producer: &dyn SnapshotProducer,
    ) -> u32 {
        let action_index = log.push_checkpoint(
            name,
            producer.capture_snapshot(),
            producer.capture_settings(),
            self.elapsed_ms(),
        );
        debug!("Recorded checkpoint {} ({})", action_index, name);
        action_index
    }

    fn records_tool(&self, payload: &Value) -> bool {
        match payload.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => !self.ignored_tools.iter().any(|t| t == name),
            _ => false,
        }
    }
}
