//! Structural sharing between consecutive history entries.
//!
//! An object that did not change since the previous entry is stored as a
//! [`BackReference`] to the entry holding its full data. References always
//! point strictly backwards, so resolution is an iterative walk whose
//! position decreases on every hop.

use bevy::log::{debug, warn};

use crate::workspace::{BackReference, ObjectData, ObjectKind, ObjectRecord, WorkspaceSnapshot};

use super::entry::HistoryEntry;
use super::error::HistoryError;

/// Find the full data of `id` starting at entry `position`.
///
/// Returns `Ok(None)` when the object does not exist in that entry. Once a
/// back-reference has been followed, a missing object is a dangling chain.
pub(crate) fn locate_full<'a>(
    entries: &'a [HistoryEntry],
    position: usize,
    kind: ObjectKind,
    id: &str,
) -> Result<Option<(usize, &'a ObjectData)>, HistoryError> {
    let mut position = position;
    let mut followed = false;

    loop {
        let entry = entries.get(position).ok_or(HistoryError::MissingEntry(position))?;
        match entry.snapshot.objects.find(kind, id) {
            None if followed => {
                return Err(HistoryError::DanglingReference {
                    kind: kind.label(),
                    id: id.to_string(),
                    position,
                });
            }
            None => return Ok(None),
            Some(ObjectRecord::Full(data)) => return Ok(Some((position, data))),
            Some(ObjectRecord::Reference(reference)) => {
                if reference.index_of_reference >= position {
                    return Err(HistoryError::ForwardReference {
                        kind: kind.label(),
                        id: id.to_string(),
                        position,
                        target: reference.index_of_reference,
                    });
                }
                position = reference.index_of_reference;
                followed = true;
            }
        }
    }
}

/// Follow a back-reference stored in entry `position` to its full data
fn follow<'a>(
    entries: &'a [HistoryEntry],
    position: usize,
    kind: ObjectKind,
    reference: &BackReference,
) -> Result<&'a ObjectData, HistoryError> {
    if reference.index_of_reference >= position {
        return Err(HistoryError::ForwardReference {
            kind: kind.label(),
            id: reference.id.clone(),
            position,
            target: reference.index_of_reference,
        });
    }

    match locate_full(entries, reference.index_of_reference, kind, &reference.id)? {
        Some((_, data)) => Ok(data),
        None => Err(HistoryError::DanglingReference {
            kind: kind.label(),
            id: reference.id.clone(),
            position,
        }),
    }
}

/// Replace unchanged objects of entry `index` with back-references.
///
/// Each new reference targets the entry that holds full data, never another
/// reference, so reads of freshly compacted entries take a single hop.
pub fn compact_entry(entries: &mut [HistoryEntry], index: usize) {
    if index == 0 || index >= entries.len() {
        return;
    }

    let (earlier, rest) = entries.split_at_mut(index);
    let current = &mut rest[0];
    let previous = index - 1;
    let mut shared = 0;

    for kind in ObjectKind::ALL {
        for record in current.snapshot.objects.records_mut(kind).iter_mut() {
            let replacement = match record {
                ObjectRecord::Full(data) => match locate_full(earlier, previous, kind, &data.id) {
                    Ok(Some((holder, referent))) if *referent == *data => Some(BackReference {
                        id: data.id.clone(),
                        index_of_reference: holder,
                    }),
                    Ok(_) => None,
                    Err(e) => {
                        warn!("Keeping full copy of {} '{}': {}", kind.label(), data.id, e);
                        None
                    }
                },
                ObjectRecord::Reference(_) => None,
            };

            if let Some(reference) = replacement {
                *record = ObjectRecord::Reference(reference);
                shared += 1;
            }
        }
    }

    debug!(
        "Compacted history entry {}: {} of {} objects shared",
        index,
        shared,
        current.snapshot.objects.len()
    );
}

/// Rebuild the snapshot of entry `index` with every back-reference resolved
pub fn resolve_snapshot(
    entries: &[HistoryEntry],
    index: usize,
) -> Result<WorkspaceSnapshot, HistoryError> {
    let entry = entries.get(index).ok_or(HistoryError::MissingEntry(index))?;
    let mut snapshot = entry.snapshot.clone();

    for kind in ObjectKind::ALL {
        for record in snapshot.objects.records_mut(kind).iter_mut() {
            let resolved = match record {
                ObjectRecord::Reference(reference) => follow(entries, index, kind, reference)?.clone(),
                ObjectRecord::Full(_) => continue,
            };
            *record = ObjectRecord::Full(resolved);
        }
    }

    Ok(snapshot)
}
