//! Neighbor lookups over a [`LastTransitionIndex`].

use std::fmt;

use modhist_core::RevisionId;

use crate::index::{IndexedEntry, LastTransitionIndex};

/// Which entry to fetch relative to a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Current,
    Previous,
    Next,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Current => write!(f, "current"),
            Relation::Previous => write!(f, "previous"),
            Relation::Next => write!(f, "next"),
        }
    }
}

/// O(1) neighbor lookups in the index's first-seen order.
#[derive(Debug, Clone, Copy)]
pub struct RevisionRelationNavigator<'a> {
    index: &'a LastTransitionIndex,
}

impl<'a> RevisionRelationNavigator<'a> {
    pub fn new(index: &'a LastTransitionIndex) -> Self {
        RevisionRelationNavigator { index }
    }

    /// The entry related to `revision_id`. `None` means the history ends
    /// there (no previous entry for the first revision, no next entry for
    /// the last).
    ///
    /// # Panics
    ///
    /// Panics if `revision_id` was never indexed. Callers that may hold an
    /// unknown id must check [`LastTransitionIndex::contains`] first.
    pub fn navigate(&self, revision_id: RevisionId, relation: Relation) -> Option<&'a IndexedEntry> {
        let Some(slot) = self.index.slot_of(revision_id) else {
            panic!("revision {revision_id} is not in the history index (asked for {relation})");
        };
        let target = match relation {
            Relation::Current => Some(slot),
            Relation::Previous => slot.checked_sub(1),
            Relation::Next => Some(slot + 1),
        };
        target.and_then(|t| self.index.entries().get(t))
    }

    pub fn current(&self, revision_id: RevisionId) -> Option<&'a IndexedEntry> {
        self.navigate(revision_id, Relation::Current)
    }

    pub fn previous(&self, revision_id: RevisionId) -> Option<&'a IndexedEntry> {
        self.navigate(revision_id, Relation::Previous)
    }

    pub fn next(&self, revision_id: RevisionId) -> Option<&'a IndexedEntry> {
        self.navigate(revision_id, Relation::Next)
    }
}
