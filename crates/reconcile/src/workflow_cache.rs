//! Per-run memoization of workflow resolution.
//!
//! Resolving a workflow is the same answer for every revision of every
//! item of a content type, so the engine asks the source once per type.
//! The cache is an explicit object owned by the caller: build one per run
//! and drop it (or [`clear`](WorkflowCache::clear) it) before running
//! against a different workflow definition.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use modhist_core::{ContentTypeId, StateId, Workflow};
use modhist_storage::{SourceError, WorkflowSource};

use crate::config::EngineConfig;
use crate::error::ReconcileError;

/// The workflow of a content type together with the states the engine
/// assigns on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkflow {
    pub workflow: Workflow,
    /// Given to silent revisions that carry the publish flag.
    pub published: StateId,
    /// Given to the last revision of an item that is no longer published.
    pub archived: StateId,
    /// Given to silent revisions without the publish flag.
    pub fallback: StateId,
}

impl ResolvedWorkflow {
    /// Pick the published and archive states of `workflow`, unless
    /// `config` overrides them.
    pub fn new(
        workflow: Workflow,
        fallback: StateId,
        config: &EngineConfig,
    ) -> Result<Self, SourceError> {
        let published = config
            .published_state
            .clone()
            .or_else(|| workflow.published_state())
            .ok_or_else(|| SourceError::NoPublishedState {
                workflow: workflow.id.clone(),
            })?;
        let archived = config
            .archived_state
            .clone()
            .or_else(|| workflow.archived_state())
            .ok_or_else(|| SourceError::NoArchivedState {
                workflow: workflow.id.clone(),
            })?;
        Ok(ResolvedWorkflow {
            workflow,
            published,
            archived,
            fallback,
        })
    }

    /// Whether `state` is published: flagged so by the workflow, or the
    /// configured published state.
    pub fn is_published(&self, state: &StateId) -> bool {
        *state == self.published || self.workflow.is_published(state)
    }

    /// Whether a revision in `state` becomes the item's default revision
    /// once the item has been published.
    pub fn is_default_bearing(&self, state: &StateId) -> bool {
        self.is_published(state) || *state == self.archived
    }
}

/// Memoizes [`ResolvedWorkflow`] per content type for one run.
#[derive(Debug, Default)]
pub struct WorkflowCache {
    resolved: HashMap<ContentTypeId, ResolvedWorkflow>,
}

impl WorkflowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the workflow and engine-assigned states of `content_type`,
    /// asking `source` only on the first request for that type.
    ///
    /// A content type without a workflow is an error and is not cached, so
    /// every item of that type reports it.
    pub fn resolve<W: WorkflowSource + ?Sized>(
        &mut self,
        source: &W,
        config: &EngineConfig,
        content_type: &ContentTypeId,
    ) -> Result<&ResolvedWorkflow, ReconcileError> {
        match self.resolved.entry(content_type.clone()) {
            Entry::Occupied(hit) => Ok(hit.into_mut()),
            Entry::Vacant(slot) => {
                let workflow = source.resolve_workflow(content_type)?;
                let fallback = source.resolve_fallback_state(content_type)?;
                let resolved = ResolvedWorkflow::new(workflow, fallback, config)?;
                tracing::debug!(
                    content_type = %content_type,
                    workflow = %resolved.workflow.id,
                    published = %resolved.published,
                    archived = %resolved.archived,
                    fallback = %resolved.fallback,
                    "workflow resolved"
                );
                Ok(slot.insert(resolved))
            }
        }
    }

    /// Number of content types resolved so far.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Forget every resolved workflow.
    pub fn clear(&mut self) {
        self.resolved.clear();
    }
}
