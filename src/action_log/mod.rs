//! Action log: the recorded input of a session and its checkpoints.
//!
//! ## Module Structure
//!
//! - [`step`] - `ActionLogStep` and `Checkpoint`
//! - [`log`] - `ActionLog` with its playback cursors
//! - [`recorder`] - `Recorder`, turning bus events into steps
//! - [`compactor`] - Pointer and colour-picker noise removal
//! - [`timeline`] - Segment summary and duration formatting

mod compactor;
mod log;
mod recorder;
mod step;
mod timeline;


pub use compactor::{
    CompactionReport, collapse_listening_echoes, compact, remove_idle_pointer_motion,
};
pub use log::ActionLog;
pub use recorder::{Recorded, Recorder};
pub use step::{ActionLogStep, Checkpoint, StepDetail};
pub use timeline::{TimelineAction, TimelineSegment, format_duration, timeline};
