//! Undo/Redo history for workspace edits.
//!
//! Every completed edit commits a full workspace snapshot. Undo and redo move
//! a cursor over those entries and rebuild the workspace from the target
//! snapshot, so they work for any edit without per-operation inverse logic.
//!
//! ## Structural sharing
//!
//! Consecutive edits usually touch a handful of objects. When an entry is
//! committed, every shape, segment and point identical to the previous
//! entry's copy is replaced by a back-reference to the entry holding the full
//! data. Resolving an entry walks those references backwards.
//!
//! ## Module Structure
//!
//! - [`entry`] - `HistoryEntry` (snapshot + settings)
//! - [`store`] - `History`, the cursor-based store
//! - [`compaction`] - Back-reference compaction and resolution
//! - [`error`] - `HistoryError`

mod compaction;
mod entry;
mod error;
mod store;

#[cfg(test)]
mod tests;

pub use compaction::{compact_entry, resolve_snapshot};
pub use entry::HistoryEntry;
pub use error::HistoryError;
pub use store::History;
