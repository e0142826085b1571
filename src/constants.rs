//! Centralized constants used across the engine.
//!
//! Timing values are defaults; most of them can be overridden through
//! [`crate::config::ReplayConfig`].

/// Fixed padding added after every replayed step, in milliseconds
pub const DEFAULT_STEP_PADDING_MS: u64 = 50;

/// Pause after a replayed settings change so the audience can see it
pub const DEFAULT_SETTINGS_CHANGE_DELAY_MS: u64 = 1000;

/// Pacing for the "flip" animation
pub const FLIP_ACTION_DELAY_MS: u64 = 2000;

/// Pacing for the "divide" animation
pub const DIVIDE_ACTION_DELAY_MS: u64 = 500;

/// Pacing for the "cut" animation
pub const CUT_ACTION_DELAY_MS: u64 = 500;

/// Tool that is internal to the checker and never worth recording
pub const SOLVE_CHECKER_TOOL: &str = "solveChecker";

/// `currentStep` value a tool reports while it is waiting for input
pub const LISTENING_TOOL_STEP: &str = "listen";

/// Checkpoint names used for undo and redo
pub const UNDO_ACTION_NAME: &str = "undo";
pub const REDO_ACTION_NAME: &str = "redo";

/// Frame rate of the headless replay runner
pub const HEADLESS_FRAMES_PER_SECOND: f64 = 60.0;
