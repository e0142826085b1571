use thiserror::Error;

/// Caller errors reported by the replay scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("The action log has no checkpoints to replay")]
    EmptyLog,

    #[error("Playback is not running")]
    NotRunning,

    #[error("Action {action_index} is not in the log (1..={total})")]
    UnknownAction { action_index: u32, total: u32 },
}
