//! Clone relabeling.
//!
//! Publishing in the source system sometimes saves an extra revision that
//! carries the publish flag but no log row, immediately before the revision
//! that was actually published. Read naively it looks like an independent
//! publish. This pass downgrades such synthesized entries to the fallback
//! state.

use crate::config::EngineConfig;
use crate::timeline::Timeline;
use crate::workflow_cache::ResolvedWorkflow;

/// Downgrades synthesized entries that sit directly before a later publish.
#[derive(Debug, Clone, Copy)]
pub struct CloneRelabeler<'a> {
    config: &'a EngineConfig,
    workflow: &'a ResolvedWorkflow,
}

impl<'a> CloneRelabeler<'a> {
    pub fn new(config: &'a EngineConfig, workflow: &'a ResolvedWorkflow) -> Self {
        CloneRelabeler { config, workflow }
    }

    /// Run the pass over `timeline` and return how many entries changed
    /// state.
    ///
    /// For every synthesized entry `e` followed by `n`, `e` takes the
    /// fallback state when `n` is published, belongs to a later revision,
    /// and was recorded within the clone window after `e`. Entries backed by
    /// a log row are never touched.
    ///
    /// The pass runs at most once per timeline; later calls return 0.
    pub fn relabel(&self, timeline: &mut Timeline) -> usize {
        if timeline.is_relabeled() {
            tracing::debug!("timeline already relabeled, skipping pass");
            return 0;
        }

        let fallback = &self.workflow.fallback;
        let entries = timeline.entries_mut();
        let mut changed = 0;
        for i in 1..entries.len() {
            let next = &entries[i];
            let current = &entries[i - 1];
            let artifact = current.is_synthesized()
                && self.workflow.is_published(&next.state)
                && next.revision_id > current.revision_id
                && self
                    .config
                    .within_clone_window(current.timestamp, next.timestamp);
            if !artifact || current.state == *fallback {
                continue;
            }

            tracing::debug!(
                content_id = %current.content_id,
                revision_id = %current.revision_id,
                publish_revision_id = %next.revision_id,
                from = %current.state,
                to = %fallback,
                "relabeling publish artifact"
            );
            entries[i - 1].state = fallback.clone();
            changed += 1;
        }

        timeline.mark_relabeled();
        changed
    }
}
