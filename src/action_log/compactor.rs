//! Removes noise from a recorded log before export or playback.
//!
//! Both passes only drop event steps; checkpoints are never touched, so the
//! sequence of checkpoint snapshots (and therefore the replayed result) is
//! unchanged.

use bevy::log::debug;

use crate::bus::EventKind;
use crate::constants::LISTENING_TOOL_STEP;

use super::step::ActionLogStep;

/// Steps removed by one [`compact`] run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompactionReport {
    pub pointer_steps: usize,
    pub listening_steps: usize,
}

impl CompactionReport {
    pub fn total(&self) -> usize {
        self.pointer_steps + self.listening_steps
    }
}

/// Run both passes. Running it again on its own output removes nothing.
pub fn compact(steps: &mut Vec<ActionLogStep>) -> CompactionReport {
    let report = CompactionReport {
        pointer_steps: remove_idle_pointer_motion(steps),
        listening_steps: collapse_listening_echoes(steps),
    };
    if report.total() > 0 {
        debug!(
            "Compacted action log: {} pointer steps, {} listening steps removed",
            report.pointer_steps, report.listening_steps
        );
    }
    report
}

/// Drop pointer motion made with no button held, unless it leads straight
/// into an object selection. The final step is always kept.
pub fn remove_idle_pointer_motion(steps: &mut Vec<ActionLogStep>) -> usize {
    let count = steps.len();
    let selects_next: Vec<bool> = steps
        .iter()
        .skip(1)
        .map(|step| step.kind == EventKind::ObjectSelected)
        .chain(std::iter::once(false))
        .collect();

    let mut pressed = false;
    let mut kept = Vec::with_capacity(count);
    for (position, step) in steps.drain(..).enumerate() {
        if step.kind.is_press() {
            pressed = true;
        } else if step.kind.is_release() {
            pressed = false;
        }

        let idle = step.kind.is_pointer_motion() && !pressed && !selects_next[position];
        if idle && position + 1 < count {
            continue;
        }
        kept.push(step);
    }

    *steps = kept;
    count - steps.len()
}

/// Drop `tool listening -> settings changed -> same tool listening` triples
/// emitted by a single colour pick. Collapses cascade, so triples exposed by
/// an earlier collapse are removed as well.
pub fn collapse_listening_echoes(steps: &mut Vec<ActionLogStep>) -> usize {
    let count = steps.len();
    let mut kept: Vec<ActionLogStep> = Vec::with_capacity(count);

    for step in steps.drain(..) {
        kept.push(step);
        let len = kept.len();
        if len >= 3 && is_listening_echo(&kept[len - 3], &kept[len - 2], &kept[len - 1]) {
            kept.truncate(len - 3);
        }
    }

    *steps = kept;
    count - steps.len()
}

fn is_listening_echo(first: &ActionLogStep, middle: &ActionLogStep, last: &ActionLogStep) -> bool {
    is_listening(first)
        && middle.kind == EventKind::SettingsChanged
        && is_listening(last)
        && first.payload_str("name") == last.payload_str("name")
}

fn is_listening(step: &ActionLogStep) -> bool {
    step.kind == EventKind::ToolUpdated && step.payload_str("currentStep") == Some(LISTENING_TOOL_STEP)
}
