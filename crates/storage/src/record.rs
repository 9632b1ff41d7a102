use modhist_core::{ContentId, LogId, RevisionId, StateId, Timestamp};
use serde::{Deserialize, Serialize};

/// One row of the revision/log left outer join.
///
/// A revision referenced by N log rows appears N times, each carrying one
/// [`LogFact`]; a revision with no log rows appears once with `log: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFact {
    pub content_id: ContentId,
    pub revision_id: RevisionId,
    /// The source's own publish flag for the revision.
    pub published: bool,
    pub saved_at: Timestamp,
    pub log: Option<LogFact>,
}

/// The moderation log columns of a [`RawFact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFact {
    pub log_id: LogId,
    /// Destination state recorded by the log.
    pub state: StateId,
    /// State the transition left, when the source recorded it.
    pub from_state: Option<StateId>,
    pub stamp: Timestamp,
}

/// A revision as stored in a snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub content_id: ContentId,
    pub revision_id: RevisionId,
    #[serde(default)]
    pub published: bool,
    pub saved_at: Timestamp,
}

/// A moderation log row as stored in a snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub log_id: LogId,
    pub content_id: ContentId,
    pub revision_id: RevisionId,
    pub state: StateId,
    #[serde(default)]
    pub from_state: Option<StateId>,
    pub stamp: Timestamp,
}
