//! Recorded log steps and checkpoint payloads.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::bus::EventKind;
use crate::workspace::{SettingsSnapshot, WorkspaceSnapshot};

/// Full, self-sufficient workspace state recorded after an edit completed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Name of the completed action ("divide", "undo", ...)
    pub name: String,
    /// 1-based, incremented once per checkpoint
    pub action_index: u32,
    /// Never compacted: checkpoints are seek targets
    pub snapshot: WorkspaceSnapshot,
    pub settings: SettingsSnapshot,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepDetail {
    Checkpoint(Box<Checkpoint>),
    Event(Value),
}

/// One entry of the action log: `{ type, detail, timestamp }`
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawStep")]
pub struct ActionLogStep {
    pub kind: EventKind,
    pub detail: StepDetail,
    /// Milliseconds since recording started
    pub timestamp: u64,
}

impl ActionLogStep {
    pub fn event(kind: EventKind, payload: Value, timestamp: u64) -> Self {
        Self {
            kind,
            detail: StepDetail::Event(payload),
            timestamp,
        }
    }

    pub fn checkpoint(checkpoint: Checkpoint, timestamp: u64) -> Self {
        Self {
            kind: EventKind::Checkpoint,
            detail: StepDetail::Checkpoint(Box::new(checkpoint)),
            timestamp,
        }
    }

    pub fn as_checkpoint(&self) -> Option<&Checkpoint> {
        match &self.detail {
            StepDetail::Checkpoint(checkpoint) => Some(checkpoint),
            StepDetail::Event(_) => None,
        }
    }

    pub fn is_checkpoint(&self) -> bool {
        matches!(self.detail, StepDetail::Checkpoint(_))
    }

    /// Event payload, `Null` for checkpoints
    pub fn payload(&self) -> &Value {
        match &self.detail {
            StepDetail::Event(payload) => payload,
            StepDetail::Checkpoint(_) => &Value::Null,
        }
    }

    /// String field of the event payload
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload().get(key).and_then(Value::as_str)
    }
}

impl Serialize for ActionLogStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ActionLogStep", 3)?;
        state.serialize_field("type", &self.kind)?;
        match &self.detail {
            StepDetail::Checkpoint(checkpoint) => state.serialize_field("detail", checkpoint)?,
            StepDetail::Event(payload) => state.serialize_field("detail", payload)?,
        }
        state.serialize_field("timestamp", &self.timestamp)?;
        state.end()
    }
}

/// Wire shape used to pick the detail type from the step kind
#[derive(Deserialize)]
struct RawStep {
    #[serde(rename = "type")]
    kind: EventKind,
    #[serde(default)]
    detail: Value,
    #[serde(alias = "timeStamp")]
    timestamp: u64,
}

impl TryFrom<RawStep> for ActionLogStep {
    type Error = String;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let detail = if raw.kind == EventKind::Checkpoint {
            let checkpoint: Checkpoint = serde_json::from_value(raw.detail)
                .map_err(|e| format!("invalid checkpoint at {} ms: {}", raw.timestamp, e))?;
            StepDetail::Checkpoint(Box::new(checkpoint))
        } else {
            StepDetail::Event(raw.detail)
        };

        Ok(Self {
            kind: raw.kind,
            detail,
            timestamp: raw.timestamp,
        })
    }
}
