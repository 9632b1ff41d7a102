use modhist_core::{ContentId, ContentTypeId, StateId, Workflow};

use crate::error::SourceError;
use crate::record::RawFact;

/// Read access to the legacy revision table and its moderation log.
///
/// ## Join Semantics
///
/// `fetch_revisions_and_log` is a left outer join of revisions onto log
/// rows for one content item:
///
/// - every revision of the item appears at least once;
/// - a revision referenced by N log rows appears N times, once per row;
/// - a revision with no log rows appears exactly once with `log: None`.
///
/// Row order is not significant; the engine imposes its own total order.
///
/// ## Snapshot Data
///
/// Sources serve frozen snapshot data. Calls never block on writers and a
/// repeated call returns the same rows.
pub trait HistorySource {
    /// Fetch every revision of `content_id` joined with its log rows.
    ///
    /// An unknown content id yields an empty list, not an error.
    fn fetch_revisions_and_log(&self, content_id: &ContentId)
        -> Result<Vec<RawFact>, SourceError>;
}

/// Resolves the target workflow assigned to a content type.
pub trait WorkflowSource {
    /// The workflow assigned to `content_type`.
    ///
    /// Returns `Err(SourceError::WorkflowNotFound)` when no workflow is
    /// assigned. Implementations must not substitute a default workflow.
    fn resolve_workflow(&self, content_type: &ContentTypeId) -> Result<Workflow, SourceError>;

    /// The state used for revisions the source log is silent about.
    ///
    /// Defaults to [`Workflow::fallback_state`] of the resolved workflow.
    fn resolve_fallback_state(&self, content_type: &ContentTypeId) -> Result<StateId, SourceError> {
        let workflow = self.resolve_workflow(content_type)?;
        workflow
            .fallback_state()
            .ok_or(SourceError::NoFallbackState {
                workflow: workflow.id,
            })
    }
}
