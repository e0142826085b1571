//! Human-readable summary of a recorded log.

use serde::Serialize;

use crate::bus::EventKind;

use super::step::ActionLogStep;

/// One checkpoint within a timeline segment
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAction {
    pub name: String,
    pub action_index: u32,
    pub timestamp: u64,
    /// Time since the previous action, or since the segment started
    pub duration: u64,
}

/// Checkpoints grouped under the tool change, undo or redo that led to them
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSegment {
    /// `None` for checkpoints recorded before any tool was picked
    pub name: Option<String>,
    pub timestamp: u64,
    pub duration: u64,
    pub actions: Vec<TimelineAction>,
}

impl TimelineSegment {
    fn open(name: Option<String>, timestamp: u64) -> Self {
        Self {
            name,
            timestamp,
            duration: 0,
            actions: Vec::new(),
        }
    }
}

/// Group the checkpoints of `steps` into segments
pub fn timeline(steps: &[ActionLogStep]) -> Vec<TimelineSegment> {
    let mut segments: Vec<TimelineSegment> = Vec::new();
    let mut current: Option<TimelineSegment> = None;
    let mut last_mark = 0;

    for step in steps {
        let opener = match step.kind {
            EventKind::ToolChanged => Some(step.payload_str("name").unwrap_or("tool").to_string()),
            EventKind::Undo => Some("undo".to_string()),
            EventKind::Redo => Some("redo".to_string()),
            _ => None,
        };

        if let Some(name) = opener {
            segments.extend(current.take().filter(|s| !s.actions.is_empty()));
            current = Some(TimelineSegment::open(Some(name), step.timestamp));
            last_mark = step.timestamp;
            continue;
        }

        let Some(checkpoint) = step.as_checkpoint() else {
            continue;
        };
        let segment = current.get_or_insert_with(|| TimelineSegment::open(None, 0));
        let duration = step.timestamp.saturating_sub(last_mark);
        segment.duration += duration;
        segment.actions.push(TimelineAction {
            name: checkpoint.name.clone(),
            action_index: checkpoint.action_index,
            timestamp: step.timestamp,
            duration,
        });
        last_mark = step.timestamp;
    }

    segments.extend(current.filter(|s| !s.actions.is_empty()));
    segments
}

/// `"1m 3.4s"` or `"3.4s"`
pub fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let rest = ms % 60_000;
    let seconds = format!("{}.{}s", rest / 1000, (rest % 1000) / 100);
    if minutes > 0 {
        format!("{}m {}", minutes, seconds)
    } else {
        seconds
    }
}
