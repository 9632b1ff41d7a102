//! History loading: joins revision facts with log facts.

use modhist_core::{ContentId, StateId};
use modhist_storage::{HistorySource, RawFact, SourceError};

use crate::entry::HistoryEntry;

/// Convert one joined row into a history entry.
///
/// A logged row keeps the log's state and timestamp. A silent row takes the
/// revision's save time and a state synthesized from its publish flag:
/// `published` when set, otherwise `fallback`.
pub fn entry_from_fact(fact: RawFact, published: &StateId, fallback: &StateId) -> HistoryEntry {
    match fact.log {
        Some(log) => HistoryEntry {
            content_id: fact.content_id,
            revision_id: fact.revision_id,
            log_id: Some(log.log_id),
            state: log.state,
            from_state: log.from_state,
            timestamp: log.stamp,
        },
        None => HistoryEntry {
            content_id: fact.content_id,
            revision_id: fact.revision_id,
            log_id: None,
            state: if fact.published {
                published.clone()
            } else {
                fallback.clone()
            },
            from_state: None,
            timestamp: fact.saved_at,
        },
    }
}

/// Load the unsorted raw history of one content item.
///
/// Produces one entry per log row referencing a revision, or exactly one
/// synthesized entry for a revision no log row references.
pub fn load_history<S: HistorySource + ?Sized>(
    source: &S,
    content_id: &ContentId,
    published: &StateId,
    fallback: &StateId,
) -> Result<Vec<HistoryEntry>, SourceError> {
    let facts = source.fetch_revisions_and_log(content_id)?;
    Ok(facts
        .into_iter()
        .map(|fact| entry_from_fact(fact, published, fallback))
        .collect())
}
