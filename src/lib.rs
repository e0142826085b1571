//! Undo/redo history and session replay for a geometry editor.
//!
//! ## Module Structure
//!
//! - [`workspace`] - Snapshot model and the `SnapshotProducer` interface
//! - [`bus`] - Session event bus
//! - [`history`] - Cursor-based undo/redo store with back-reference compaction
//! - [`action_log`] - Recorded input, checkpoints, log compaction and timeline
//! - [`replay`] - Timer-driven replay scheduler
//! - [`document`] - Persisted session document
//! - [`session`] - `EditorSession` resource and `SessionPlugin`
//! - [`config`] - `ReplayConfig` resource and `ConfigPlugin`

pub mod action_log;
pub mod bus;
pub mod config;
pub mod constants;
pub mod document;
pub mod history;
pub mod paths;
pub mod replay;
pub mod session;
pub mod workspace;
