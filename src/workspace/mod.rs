//! Workspace snapshot model and the producer interface.
//!
//! ## Module Structure
//!
//! - [`snapshot`] - Serializable snapshot, object record and settings types
//! - [`producer`] - The `SnapshotProducer` trait the engine reads/rebuilds through
//! - [`memory`] - An in-memory producer for headless replay and tests

mod memory;
mod producer;
mod snapshot;

#[cfg(test)]
mod tests;

pub use memory::MemoryWorkspace;
pub use producer::SnapshotProducer;
pub use snapshot::{
    BackReference, CanvasSize, ObjectCollections, ObjectData, ObjectKind, ObjectRecord, Offset,
    SettingsSnapshot, WorkspaceSnapshot,
};
