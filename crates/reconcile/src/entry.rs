//! Raw history entries.

use modhist_core::{ContentId, LogId, RevisionId, StateId, Timestamp};
use serde::Serialize;

/// One fact about a revision's workflow state, either logged by the source
/// or synthesized from the revision's publish flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub content_id: ContentId,
    pub revision_id: RevisionId,
    /// The log row this entry came from. `None` for synthesized entries.
    pub log_id: Option<LogId>,
    pub state: StateId,
    /// The state the logged transition left, when recorded.
    pub from_state: Option<StateId>,
    /// The log's timestamp, or the revision's save time when synthesized.
    pub timestamp: Timestamp,
}

impl HistoryEntry {
    /// True when no log row backs this entry.
    pub fn is_synthesized(&self) -> bool {
        self.log_id.is_none()
    }
}
