//! Replay of a recorded action log.
//!
//! ## Module Structure
//!
//! - [`scheduler`] - `ReplayScheduler` state machine and `ReplayContext`
//! - [`pacing`] - Delays between replayed steps
//! - [`error`] - `ReplayError`

mod error;
mod pacing;
mod scheduler;


pub use error::ReplayError;
pub use pacing::Pacing;
pub use scheduler::{PlaybackState, ReplayContext, ReplayEvent, ReplayScheduler};
