//! Deterministic total order over one item's raw history.
//!
//! Entries are ordered by:
//! 1. timestamp, ascending;
//! 2. on a tie between two logged entries, log id ascending;
//! 3. otherwise a non-published entry before a published one;
//! 4. otherwise revision id ascending.
//!
//! Rules 2-4 taken pairwise are not transitive once logged and synthesized
//! entries share a timestamp (two logged drafts may be ordered by log id
//! while a synthesized draft between them is ordered by revision id). Each
//! tie group is therefore split into a logged chain and a synthesized
//! chain, each sorted on its own, and the chains are merged with the
//! pairwise rules. Every adjacent pair of the result satisfies the rules,
//! and the result depends only on the set of entries, so sorting is
//! idempotent.

use std::cmp::Ordering;

use serde::Serialize;

use crate::entry::HistoryEntry;
use crate::workflow_cache::ResolvedWorkflow;

/// One item's raw history in timeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    entries: Vec<HistoryEntry>,
    relabeled: bool,
}

impl Timeline {
    /// Sort `entries` into timeline order.
    pub fn sorted(entries: Vec<HistoryEntry>, workflow: &ResolvedWorkflow) -> Self {
        Timeline {
            entries: sort_entries(entries, workflow),
            relabeled: false,
        }
    }

    /// Wrap entries that are already in timeline order, such as the entries
    /// of a previously reconciled timeline. The relabel pass has not run on
    /// the result.
    pub fn from_ordered(entries: Vec<HistoryEntry>) -> Self {
        Timeline {
            entries,
            relabeled: false,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&HistoryEntry> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the clone relabel pass has already run over this timeline.
    pub fn is_relabeled(&self) -> bool {
        self.relabeled
    }

    pub(crate) fn mark_relabeled(&mut self) {
        self.relabeled = true;
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [HistoryEntry] {
        &mut self.entries
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }
}

/// The pairwise timeline rules.
///
/// Returns `Equal` only for entries that no rule separates.
pub fn compare_entries(
    a: &HistoryEntry,
    b: &HistoryEntry,
    workflow: &ResolvedWorkflow,
) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| match (a.log_id, b.log_id) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        })
        .then_with(|| {
            workflow
                .is_published(&a.state)
                .cmp(&workflow.is_published(&b.state))
        })
        .then_with(|| a.revision_id.cmp(&b.revision_id))
}

/// Sort entries into timeline order.
pub fn sort_entries(
    mut entries: Vec<HistoryEntry>,
    workflow: &ResolvedWorkflow,
) -> Vec<HistoryEntry> {
    entries.sort_by_key(|e| e.timestamp);

    let mut sorted = Vec::with_capacity(entries.len());
    let mut rest = entries.into_iter().peekable();
    while let Some(first) = rest.next() {
        let timestamp = first.timestamp;
        let mut group = vec![first];
        while let Some(e) = rest.next_if(|e| e.timestamp == timestamp) {
            group.push(e);
        }
        if group.len() == 1 {
            sorted.append(&mut group);
        } else {
            sorted.extend(order_tie_group(group, workflow));
        }
    }
    sorted
}

/// Order entries sharing one timestamp.
fn order_tie_group(group: Vec<HistoryEntry>, workflow: &ResolvedWorkflow) -> Vec<HistoryEntry> {
    // The state tie-break only matters for malformed input (one revision
    // synthesized twice at the same instant); it keeps the order total.
    let chain_order = |a: &HistoryEntry, b: &HistoryEntry| {
        compare_entries(a, b, workflow).then_with(|| a.state.cmp(&b.state))
    };

    let (mut logged, mut synthesized): (Vec<_>, Vec<_>) =
        group.into_iter().partition(|e| e.log_id.is_some());
    logged.sort_by(chain_order);
    synthesized.sort_by(chain_order);

    let mut merged = Vec::with_capacity(logged.len() + synthesized.len());
    let mut logged = logged.into_iter().peekable();
    let mut synthesized = synthesized.into_iter().peekable();
    loop {
        let take_synthesized = match (logged.peek(), synthesized.peek()) {
            (Some(l), Some(s)) => chain_order(s, l) == Ordering::Less,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (None, None) => break,
        };
        let next = if take_synthesized {
            synthesized.next()
        } else {
            logged.next()
        };
        merged.extend(next);
    }
    merged
}
