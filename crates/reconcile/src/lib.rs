//! Moderation-history reconciliation engine.
//!
//! Reconstructs, for every saved revision of a legacy content item, the
//! target workflow state of that revision, whether it is the item's default
//! revision, and whether it should be skipped as a storage artifact.
//!
//! The pipeline, per content item:
//! 1. [`history`] joins revisions with log rows and synthesizes states for
//!    silent revisions;
//! 2. [`timeline`] imposes a deterministic total order;
//! 3. [`relabel`] downgrades synthesized publish artifacts;
//! 4. [`index`] reduces the timeline to one entry per revision;
//! 5. [`engine`] applies the skip, archive and default-revision rules using
//!    [`navigator`] and [`clone`].

pub mod clone;
pub mod config;
pub mod decision;
pub mod engine;
pub mod entry;
pub mod error;
pub mod history;
pub mod index;
pub mod navigator;
pub mod relabel;
pub mod row;
pub mod timeline;
pub mod workflow_cache;

#[cfg(test)]
mod testing;

pub use clone::CloneDetector;
pub use config::{ConfigError, EngineConfig};
pub use decision::{Decision, SkipReason};
pub use engine::{
    decide_revision, ItemHistory, ItemReport, RevisionDecision, RevisionDecisionEngine,
};
pub use entry::HistoryEntry;
pub use error::ReconcileError;
pub use index::{IndexedEntry, LastTransitionIndex};
pub use navigator::{Relation, RevisionRelationNavigator};
pub use relabel::CloneRelabeler;
pub use row::{MigrationRow, RowOutcome};
pub use timeline::Timeline;
pub use workflow_cache::{ResolvedWorkflow, WorkflowCache};

use modhist_core::{ContentId, ContentTypeId};
use modhist_storage::{HistorySource, WorkflowSource};

/// Reconcile every listed item with a fresh workflow cache.
///
/// This is the top-level API for batch runs. A content type without a
/// workflow aborts the run.
pub fn reconcile_items<'i, H, W, I>(
    history: &H,
    workflows: &W,
    config: EngineConfig,
    items: I,
) -> Result<Vec<ItemReport>, ReconcileError>
where
    H: HistorySource + ?Sized,
    W: WorkflowSource + ?Sized,
    I: IntoIterator<Item = (&'i ContentId, &'i ContentTypeId)>,
{
    let mut cache = WorkflowCache::new();
    let mut engine = RevisionDecisionEngine::new(history, workflows, config);
    items
        .into_iter()
        .map(|(content_id, content_type)| {
            engine.reconcile_item(&mut cache, content_id, content_type)
        })
        .collect()
}
