//! Shared fixtures for unit tests.

use modhist_core::{ContentId, LogId, RevisionId, State, StateId, Timestamp, Workflow};

use crate::config::EngineConfig;
use crate::entry::HistoryEntry;
use crate::workflow_cache::ResolvedWorkflow;

fn resolved(id: &str, published: &str, archived: &str) -> ResolvedWorkflow {
    let state = |id: &str, published: bool, default_revision: bool| State {
        id: StateId::new(id),
        label: id.to_string(),
        published,
        default_revision,
    };
    let workflow = Workflow::new(
        id,
        vec![
            state("draft", false, false),
            state(published, true, true),
            state(archived, false, true),
        ],
        vec![],
    );
    ResolvedWorkflow::new(workflow, StateId::new("draft"), &EngineConfig::default())
        .expect("workflow has every state")
}

/// A draft / published / archived workflow with `draft` as fallback.
pub(crate) fn editorial() -> ResolvedWorkflow {
    resolved("editorial", "published", "archived")
}

/// A draft / live / gone workflow with `draft` as fallback.
pub(crate) fn events() -> ResolvedWorkflow {
    resolved("events", "live", "gone")
}

/// Build an entry of item `n1` from a `(log, revision, timestamp, state)` tuple.
pub(crate) fn entry(log: Option<u64>, revision: u64, timestamp: i64, state: &str) -> HistoryEntry {
    HistoryEntry {
        content_id: ContentId::new("n1"),
        revision_id: RevisionId(revision),
        log_id: log.map(LogId),
        state: StateId::new(state),
        from_state: None,
        timestamp: Timestamp(timestamp),
    }
}

/// The twelve-entry timeline used by the clone and navigation examples,
/// already in timeline order.
pub(crate) fn twelve_entry_timeline() -> Vec<HistoryEntry> {
    vec![
        entry(None, 1, 10, "draft"),
        entry(None, 2, 20, "published"),
        entry(None, 3, 30, "published"),
        entry(None, 4, 40, "published"),
        entry(Some(1), 5, 50, "draft"),
        entry(Some(2), 6, 60, "published"),
        entry(Some(3), 7, 70, "published"),
        entry(None, 8, 80, "draft"),
        entry(None, 9, 80, "published"),
        entry(None, 8, 90, "draft"),
        entry(None, 10, 90, "published"),
        entry(Some(4), 11, 100, "published"),
    ]
}
