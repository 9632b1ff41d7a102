//! Clone detection for published revisions.

use crate::config::EngineConfig;
use crate::index::IndexedEntry;
use crate::timeline::Timeline;
use crate::workflow_cache::ResolvedWorkflow;

/// Decides whether an entry is a storage artifact of the entries just
/// before it in the raw timeline.
#[derive(Debug, Clone, Copy)]
pub struct CloneDetector<'a> {
    config: &'a EngineConfig,
    workflow: &'a ResolvedWorkflow,
}

impl<'a> CloneDetector<'a> {
    pub fn new(config: &'a EngineConfig, workflow: &'a ResolvedWorkflow) -> Self {
        CloneDetector { config, workflow }
    }

    /// Whether `candidate` duplicates an adjacent entry.
    ///
    /// Looks at the two entries preceding `candidate.position` in the
    /// unreduced timeline:
    /// - no predecessor: not a clone;
    /// - predecessor within the clone window: clone;
    /// - otherwise, with a second predecessor: clone when an unpublished
    ///   entry is sandwiched between a published one and the candidate.
    pub fn is_clone(&self, timeline: &Timeline, candidate: &IndexedEntry) -> bool {
        let preceding = |back: usize| {
            candidate
                .position
                .checked_sub(back)
                .and_then(|p| timeline.get(p))
        };

        let Some(prev) = preceding(1) else {
            return false;
        };
        if self
            .config
            .within_clone_window(prev.timestamp, candidate.entry.timestamp)
        {
            return true;
        }
        let Some(prev_prev) = preceding(2) else {
            return false;
        };
        !self.workflow.is_published(&prev.state) && self.workflow.is_published(&prev_prev.state)
    }
}
