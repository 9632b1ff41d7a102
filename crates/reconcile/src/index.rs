//! Last-transition index: one entry per revision.

use std::collections::HashMap;

use modhist_core::RevisionId;
use serde::Serialize;

use crate::entry::HistoryEntry;
use crate::timeline::Timeline;

/// A history entry together with its position in the raw timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedEntry {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    /// Position of `entry` in the unreduced timeline.
    pub position: usize,
}

/// The last known entry of every revision, in the order revisions first
/// appear in the timeline.
///
/// Built from a sorted timeline: a later entry for a revision replaces the
/// earlier one in place, so a revision keeps the slot it was first seen in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastTransitionIndex {
    entries: Vec<IndexedEntry>,
    slots: HashMap<RevisionId, usize>,
}

impl LastTransitionIndex {
    pub fn build(timeline: &Timeline) -> Self {
        let mut index = LastTransitionIndex::default();
        for (position, entry) in timeline.entries().iter().enumerate() {
            let indexed = IndexedEntry {
                entry: entry.clone(),
                position,
            };
            match index.slots.get(&entry.revision_id) {
                Some(&slot) => index.entries[slot] = indexed,
                None => {
                    index.slots.insert(entry.revision_id, index.entries.len());
                    index.entries.push(indexed);
                }
            }
        }
        index
    }

    /// Indexed entries in first-seen order.
    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, revision_id: RevisionId) -> bool {
        self.slots.contains_key(&revision_id)
    }

    /// Slot of `revision_id` in first-seen order.
    pub fn slot_of(&self, revision_id: RevisionId) -> Option<usize> {
        self.slots.get(&revision_id).copied()
    }

    /// The entry for `revision_id`, or `None` when it was never indexed.
    pub fn lookup(&self, revision_id: RevisionId) -> Option<&IndexedEntry> {
        self.slot_of(revision_id).map(|slot| &self.entries[slot])
    }

    /// Every entry indexed before `revision_id`.
    pub fn before(&self, revision_id: RevisionId) -> Option<&[IndexedEntry]> {
        self.slot_of(revision_id).map(|slot| &self.entries[..slot])
    }

    /// Revision ids in ascending order.
    pub fn revision_ids(&self) -> Vec<RevisionId> {
        let mut ids: Vec<RevisionId> = self.slots.keys().copied().collect();
        ids.sort();
        ids
    }
}
