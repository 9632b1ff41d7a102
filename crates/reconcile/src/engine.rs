//! Revision decision engine.
//!
//! For each revision being migrated the engine:
//! 1. loads the item's raw history, sorts it, relabels publish artifacts and
//!    reduces it to one entry per revision;
//! 2. skips published duplicates (rule A) and orphaned drafts (rule B);
//! 3. archives the last revision of an item that was published once but no
//!    longer is;
//! 4. derives the default-revision flag from the item's publication history.
//!
//! "Published" and "archived" are read from the item's resolved workflow, so
//! one run can cover content types whose workflows name states differently.
//!
//! The reconciled history of the most recent item is kept between calls, so
//! presenting an item's revisions consecutively loads its history once. The
//! kept history is only reused while the caller's [`WorkflowCache`] still
//! resolves the same workflow for the item's content type.

use modhist_core::{ContentId, ContentTypeId, RevisionId};
use modhist_storage::{HistorySource, SourceError, WorkflowSource};
use serde::Serialize;

use crate::clone::CloneDetector;
use crate::config::EngineConfig;
use crate::decision::{Decision, SkipReason};
use crate::error::ReconcileError;
use crate::history::load_history;
use crate::index::LastTransitionIndex;
use crate::navigator::RevisionRelationNavigator;
use crate::relabel::CloneRelabeler;
use crate::row::{MigrationRow, RowOutcome};
use crate::timeline::Timeline;
use crate::workflow_cache::{ResolvedWorkflow, WorkflowCache};

// ──────────────────────────────────────────────
// Item history
// ──────────────────────────────────────────────

/// One content item's reconciled history.
#[derive(Debug, Clone)]
pub struct ItemHistory {
    pub content_id: ContentId,
    pub content_type: ContentTypeId,
    /// The workflow the history was reconciled against.
    pub workflow: ResolvedWorkflow,
    /// Sorted, relabeled raw timeline.
    pub timeline: Timeline,
    pub index: LastTransitionIndex,
    /// Number of entries the relabel pass downgraded.
    pub relabeled: usize,
}

impl ItemHistory {
    /// Load, sort, relabel and index the history of `content_id`.
    pub fn build<H: HistorySource + ?Sized>(
        source: &H,
        config: &EngineConfig,
        content_id: &ContentId,
        content_type: &ContentTypeId,
        workflow: &ResolvedWorkflow,
    ) -> Result<Self, SourceError> {
        let entries = load_history(source, content_id, &workflow.published, &workflow.fallback)?;
        let mut timeline = Timeline::sorted(entries, workflow);
        let relabeled = CloneRelabeler::new(config, workflow).relabel(&mut timeline);
        let index = LastTransitionIndex::build(&timeline);

        tracing::debug!(
            content_id = %content_id,
            entries = timeline.len(),
            revisions = index.len(),
            relabeled,
            "history reconciled"
        );

        Ok(ItemHistory {
            content_id: content_id.clone(),
            content_type: content_type.clone(),
            workflow: workflow.clone(),
            timeline,
            index,
            relabeled,
        })
    }

    pub fn navigator(&self) -> RevisionRelationNavigator<'_> {
        RevisionRelationNavigator::new(&self.index)
    }

    fn is_for(
        &self,
        content_id: &ContentId,
        content_type: &ContentTypeId,
        workflow: &ResolvedWorkflow,
    ) -> bool {
        self.content_id == *content_id
            && self.content_type == *content_type
            && self.workflow == *workflow
    }
}

// ──────────────────────────────────────────────
// Decision rules
// ──────────────────────────────────────────────

/// Decide the fate of one revision of a reconciled item.
///
/// A revision absent from the history yields [`Decision::NoOp`].
pub fn decide_revision(
    config: &EngineConfig,
    item: &ItemHistory,
    revision_id: RevisionId,
) -> Decision {
    let (Some(actual), Some(earlier)) = (
        item.index.lookup(revision_id),
        item.index.before(revision_id),
    ) else {
        tracing::debug!(
            content_id = %item.content_id,
            revision_id = %revision_id,
            "revision not in history, leaving row untouched"
        );
        return Decision::NoOp;
    };

    let workflow = &item.workflow;
    let next = item.navigator().next(revision_id);
    let has_prior_publish = earlier
        .iter()
        .any(|e| workflow.is_published(&e.entry.state));
    let actual_published = workflow.is_published(&actual.entry.state);

    // Rule A: a publish that merely repeats the previous publish.
    if actual_published
        && has_prior_publish
        && CloneDetector::new(config, workflow).is_clone(&item.timeline, actual)
    {
        return skip(item, revision_id, SkipReason::DuplicatePublished);
    }

    // Rule B: a draft whose successor was published straight from a
    // published state, before the item had ever been published.
    if let Some(next) = next {
        let next_from_published = next
            .entry
            .from_state
            .as_ref()
            .is_some_and(|s| workflow.is_published(s));
        if !actual_published
            && next_from_published
            && !has_prior_publish
            && workflow.is_published(&next.entry.state)
        {
            return skip(item, revision_id, SkipReason::OrphanedDraft);
        }
    }

    let state = if next.is_none() && !actual_published && has_prior_publish {
        workflow.archived.clone()
    } else {
        actual.entry.state.clone()
    };
    let is_default_revision = workflow.is_default_bearing(&state) || !has_prior_publish;
    let annotate = actual.entry.is_synthesized();

    tracing::debug!(
        content_id = %item.content_id,
        revision_id = %revision_id,
        state = %state,
        is_default_revision,
        annotate,
        "revision decided"
    );

    Decision::Process {
        state,
        is_default_revision,
        annotate,
    }
}

fn skip(item: &ItemHistory, revision_id: RevisionId, reason: SkipReason) -> Decision {
    tracing::info!(
        content_id = %item.content_id,
        revision_id = %revision_id,
        reason = %reason,
        "skipping revision"
    );
    Decision::skip(reason)
}

// ──────────────────────────────────────────────
// Reports
// ──────────────────────────────────────────────

/// The decision for one revision of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionDecision {
    pub revision_id: RevisionId,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Decisions for every revision of one item, in revision order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub content_id: ContentId,
    pub content_type: ContentTypeId,
    pub relabeled: usize,
    pub decisions: Vec<RevisionDecision>,
}

// ──────────────────────────────────────────────
// Engine
// ──────────────────────────────────────────────

/// Runs the reconciliation pipeline against a history source and a
/// workflow source.
pub struct RevisionDecisionEngine<'s, H: ?Sized, W: ?Sized> {
    history: &'s H,
    workflows: &'s W,
    config: EngineConfig,
    memo: Option<ItemHistory>,
}

impl<'s, H, W> RevisionDecisionEngine<'s, H, W>
where
    H: HistorySource + ?Sized,
    W: WorkflowSource + ?Sized,
{
    pub fn new(history: &'s H, workflows: &'s W, config: EngineConfig) -> Self {
        RevisionDecisionEngine {
            history,
            workflows,
            config,
            memo: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The reconciled history of an item, reusing the previous call's
    /// history when it was for the same item and workflow.
    pub fn item_history(
        &mut self,
        cache: &mut WorkflowCache,
        content_id: &ContentId,
        content_type: &ContentTypeId,
    ) -> Result<&ItemHistory, ReconcileError> {
        Self::refresh(
            &mut self.memo,
            self.history,
            self.workflows,
            &self.config,
            cache,
            content_id,
            content_type,
        )
    }

    /// Decide the fate of one revision.
    ///
    /// Fails only when the item's history or workflow cannot be loaded.
    pub fn decide(
        &mut self,
        cache: &mut WorkflowCache,
        content_id: &ContentId,
        revision_id: RevisionId,
        content_type: &ContentTypeId,
    ) -> Result<Decision, ReconcileError> {
        let item = Self::refresh(
            &mut self.memo,
            self.history,
            self.workflows,
            &self.config,
            cache,
            content_id,
            content_type,
        )?;
        Ok(decide_revision(&self.config, item, revision_id))
    }

    /// Decide every revision of one item.
    pub fn reconcile_item(
        &mut self,
        cache: &mut WorkflowCache,
        content_id: &ContentId,
        content_type: &ContentTypeId,
    ) -> Result<ItemReport, ReconcileError> {
        let item = Self::refresh(
            &mut self.memo,
            self.history,
            self.workflows,
            &self.config,
            cache,
            content_id,
            content_type,
        )?;
        let decisions = item
            .index
            .revision_ids()
            .into_iter()
            .map(|revision_id| RevisionDecision {
                revision_id,
                decision: decide_revision(&self.config, item, revision_id),
            })
            .collect();
        Ok(ItemReport {
            content_id: content_id.clone(),
            content_type: content_type.clone(),
            relabeled: item.relabeled,
            decisions,
        })
    }

    /// Decide the row's revision and write the result back onto it.
    ///
    /// Rows without a content id or revision id are left untouched.
    pub fn process_row(
        &mut self,
        cache: &mut WorkflowCache,
        row: &mut MigrationRow,
    ) -> Result<RowOutcome, ReconcileError> {
        let (Some(content_id), Some(revision_id)) = (row.content_id.clone(), row.revision_id)
        else {
            tracing::debug!("row lacks a content or revision id, leaving it untouched");
            return Ok(RowOutcome::Untouched);
        };
        let content_type = row.content_type.clone();
        let decision = self.decide(cache, &content_id, revision_id, &content_type)?;
        Ok(row.apply(&decision, &self.config.annotation))
    }

    fn refresh<'m>(
        memo: &'m mut Option<ItemHistory>,
        history: &H,
        workflows: &W,
        config: &EngineConfig,
        cache: &mut WorkflowCache,
        content_id: &ContentId,
        content_type: &ContentTypeId,
    ) -> Result<&'m ItemHistory, ReconcileError> {
        let workflow = cache.resolve(workflows, config, content_type)?;
        let item = match memo.take() {
            Some(item) if item.is_for(content_id, content_type, workflow) => item,
            _ => ItemHistory::build(history, config, content_id, content_type, workflow)?,
        };
        Ok(memo.insert(item))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use modhist_core::{LogId, State, StateId, Timestamp, Workflow};
    use modhist_storage::{LogFact, RawFact};

    use super::*;

    /// Rows of `(log, revision, timestamp, state, from_state, published)`.
    type Row<'a> = (Option<u64>, u64, i64, &'a str, Option<&'a str>, bool);

    struct FakeSource {
        facts: Vec<RawFact>,
        fetches: Cell<usize>,
        /// Ids of the workflow's draft and published states.
        draft: Cell<&'static str>,
        published: Cell<&'static str>,
    }

    impl FakeSource {
        fn new(rows: &[Row<'_>]) -> Self {
            let facts = rows
                .iter()
                .map(|&(log, revision, ts, state, from, published)| RawFact {
                    content_id: ContentId::new("n1"),
                    revision_id: RevisionId(revision),
                    published,
                    saved_at: Timestamp(ts),
                    log: log.map(|id| LogFact {
                        log_id: LogId(id),
                        state: StateId::new(state),
                        from_state: from.map(StateId::new),
                        stamp: Timestamp(ts),
                    }),
                })
                .collect();
            FakeSource {
                facts,
                fetches: Cell::new(0),
                draft: Cell::new("draft"),
                published: Cell::new("published"),
            }
        }

        fn with_published(self, published: &'static str) -> Self {
            self.published.set(published);
            self
        }
    }

    impl HistorySource for FakeSource {
        fn fetch_revisions_and_log(
            &self,
            content_id: &ContentId,
        ) -> Result<Vec<RawFact>, SourceError> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self
                .facts
                .iter()
                .filter(|f| f.content_id == *content_id)
                .cloned()
                .collect())
        }
    }

    impl WorkflowSource for FakeSource {
        fn resolve_workflow(&self, content_type: &ContentTypeId) -> Result<Workflow, SourceError> {
            if content_type.as_str() != "article" {
                return Err(SourceError::WorkflowNotFound {
                    content_type: content_type.clone(),
                });
            }
            let state = |id: &str, published: bool, default_revision: bool| State {
                id: StateId::new(id),
                label: id.to_string(),
                published,
                default_revision,
            };
            Ok(Workflow::new(
                "editorial",
                vec![
                    state(self.draft.get(), false, false),
                    state(self.published.get(), true, true),
                    state("archived", false, true),
                ],
                vec![],
            ))
        }
    }

    fn decide_all(source: &FakeSource) -> Vec<(u64, Decision)> {
        let mut engine = RevisionDecisionEngine::new(source, source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        engine
            .reconcile_item(&mut cache, &ContentId::new("n1"), &ContentTypeId::new("article"))
            .unwrap()
            .decisions
            .into_iter()
            .map(|d| (d.revision_id.0, d.decision))
            .collect()
    }

    fn process(state: &str, is_default_revision: bool, annotate: bool) -> Decision {
        Decision::Process {
            state: StateId::new(state),
            is_default_revision,
            annotate,
        }
    }

    #[test]
    fn every_revision_is_default_until_first_publish() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "draft", None, false),
            (Some(2), 2, 20, "draft", Some("draft"), false),
            (Some(3), 3, 30, "published", Some("draft"), true),
        ]);
        assert_eq!(
            decide_all(&source),
            vec![
                (1, process("draft", true, false)),
                (2, process("draft", true, false)),
                (3, process("published", true, false)),
            ]
        );
    }

    #[test]
    fn drafts_after_a_publish_are_not_default_and_last_one_is_archived() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "published", Some("draft"), true),
            (Some(2), 2, 20, "draft", Some("published"), false),
            (Some(3), 3, 30, "draft", Some("draft"), false),
        ]);
        assert_eq!(
            decide_all(&source),
            vec![
                (1, process("published", true, false)),
                (2, process("draft", false, false)),
                (3, process("archived", true, false)),
            ]
        );
    }

    #[test]
    fn publish_right_after_a_draft_is_a_duplicate() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "published", Some("draft"), true),
            (Some(2), 2, 20, "draft", Some("published"), false),
            (Some(3), 3, 21, "published", Some("draft"), true),
        ]);
        assert_eq!(
            decide_all(&source)[2],
            (3, Decision::skip(SkipReason::DuplicatePublished))
        );
    }

    #[test]
    fn first_publish_is_never_a_duplicate() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "draft", None, false),
            (Some(2), 2, 10, "published", Some("draft"), true),
        ]);
        assert_eq!(decide_all(&source)[1], (2, process("published", true, false)));
    }

    #[test]
    fn draft_before_a_republish_without_prior_publish_is_orphaned() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "draft", None, false),
            (Some(2), 2, 20, "published", Some("published"), true),
        ]);
        assert_eq!(
            decide_all(&source),
            vec![
                (1, Decision::skip(SkipReason::OrphanedDraft)),
                (2, process("published", true, false)),
            ]
        );
    }

    #[test]
    fn synthesized_states_ask_for_annotation() {
        let source = FakeSource::new(&[
            (None, 1, 10, "", None, false),
            (None, 2, 20, "", None, true),
        ]);
        assert_eq!(
            decide_all(&source),
            vec![
                (1, process("draft", true, true)),
                (2, process("published", true, true)),
            ]
        );
    }

    #[test]
    fn unknown_revision_is_a_no_op() {
        let source = FakeSource::new(&[(Some(1), 1, 10, "draft", None, false)]);
        let mut engine = RevisionDecisionEngine::new(&source, &source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        let decision = engine
            .decide(
                &mut cache,
                &ContentId::new("n1"),
                RevisionId(99),
                &ContentTypeId::new("article"),
            )
            .unwrap();
        assert_eq!(decision, Decision::NoOp);
    }

    #[test]
    fn missing_workflow_is_fatal() {
        let source = FakeSource::new(&[(Some(1), 1, 10, "draft", None, false)]);
        let mut engine = RevisionDecisionEngine::new(&source, &source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        let err = engine
            .decide(
                &mut cache,
                &ContentId::new("n1"),
                RevisionId(1),
                &ContentTypeId::new("page"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Source(SourceError::WorkflowNotFound { .. })
        ));
    }

    #[test]
    fn consecutive_revisions_of_one_item_load_history_once() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "draft", None, false),
            (Some(2), 2, 20, "published", Some("draft"), true),
        ]);
        let mut engine = RevisionDecisionEngine::new(&source, &source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        let (n1, article) = (ContentId::new("n1"), ContentTypeId::new("article"));

        engine.decide(&mut cache, &n1, RevisionId(1), &article).unwrap();
        engine.decide(&mut cache, &n1, RevisionId(2), &article).unwrap();
        assert_eq!(source.fetches.get(), 1);

        engine
            .decide(&mut cache, &ContentId::new("n2"), RevisionId(1), &article)
            .unwrap();
        engine.decide(&mut cache, &n1, RevisionId(1), &article).unwrap();
        assert_eq!(source.fetches.get(), 3);
    }

    #[test]
    fn rows_are_written_back() {
        let source = FakeSource::new(&[(None, 1, 10, "", None, false)]);
        let mut engine = RevisionDecisionEngine::new(&source, &source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        let mut row = MigrationRow {
            content_id: Some(ContentId::new("n1")),
            revision_id: Some(RevisionId(1)),
            content_type: ContentTypeId::new("article"),
            log: "Initial import".to_string(),
            moderation_state: None,
            is_default_revision: None,
        };

        let outcome = engine.process_row(&mut cache, &mut row).unwrap();

        assert_eq!(outcome, RowOutcome::Written);
        assert_eq!(row.moderation_state, Some(StateId::new("draft")));
        assert_eq!(row.is_default_revision, Some(true));
        assert_eq!(
            row.log,
            format!("Initial import\n{}", crate::config::DEFAULT_ANNOTATION)
        );
    }

    #[test]
    fn malformed_rows_are_untouched() {
        let source = FakeSource::new(&[(None, 1, 10, "", None, false)]);
        let mut engine = RevisionDecisionEngine::new(&source, &source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        let mut row = MigrationRow {
            content_id: Some(ContentId::new("n1")),
            revision_id: None,
            content_type: ContentTypeId::new("page"),
            log: String::new(),
            moderation_state: None,
            is_default_revision: None,
        };
        let before = row.clone();

        assert_eq!(
            engine.process_row(&mut cache, &mut row).unwrap(),
            RowOutcome::Untouched
        );
        assert_eq!(row, before);
        assert_eq!(source.fetches.get(), 0);
    }

    #[test]
    fn published_states_come_from_the_workflow() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "live", Some("draft"), true),
            (None, 2, 20, "", None, false),
        ])
        .with_published("live");
        assert_eq!(
            decide_all(&source),
            vec![
                (1, process("live", true, false)),
                (2, process("archived", true, true)),
            ]
        );
    }

    #[test]
    fn silent_publish_takes_the_workflow_published_state() {
        let source = FakeSource::new(&[
            (None, 1, 10, "", None, false),
            (None, 2, 20, "", None, true),
            (None, 3, 30, "", None, false),
        ])
        .with_published("live");
        assert_eq!(
            decide_all(&source),
            vec![
                (1, process("draft", true, true)),
                (2, process("live", true, true)),
                (3, process("archived", true, true)),
            ]
        );
    }

    #[test]
    fn draft_after_a_publish_is_not_orphaned() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "published", Some("draft"), true),
            (Some(2), 2, 20, "draft", Some("published"), false),
            (Some(3), 3, 30, "published", Some("published"), true),
        ]);
        assert_eq!(decide_all(&source)[1], (2, process("draft", false, false)));
    }

    #[test]
    fn draft_before_a_silent_publish_is_not_orphaned() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "draft", None, false),
            (None, 2, 20, "", None, true),
        ]);
        assert_eq!(decide_all(&source)[0], (1, process("draft", true, false)));
    }

    #[test]
    fn draft_before_an_unpublished_successor_is_not_orphaned() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "draft", None, false),
            (Some(2), 2, 20, "draft", Some("published"), false),
        ]);
        assert_eq!(decide_all(&source)[0], (1, process("draft", true, false)));
    }

    #[test]
    fn published_revision_is_never_orphaned() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "published", Some("draft"), true),
            (Some(2), 2, 20, "published", Some("published"), true),
        ]);
        assert_eq!(decide_all(&source)[0], (1, process("published", true, false)));
    }

    #[test]
    fn distant_republish_is_not_a_duplicate() {
        let source = FakeSource::new(&[
            (Some(1), 1, 10, "published", Some("draft"), true),
            (Some(2), 2, 20, "published", Some("published"), true),
        ]);
        assert_eq!(decide_all(&source)[1], (2, process("published", true, false)));
    }

    #[test]
    fn cleared_cache_rebuilds_the_kept_history() {
        let source = FakeSource::new(&[(None, 1, 10, "", None, false)]);
        let mut engine = RevisionDecisionEngine::new(&source, &source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        let (n1, article) = (ContentId::new("n1"), ContentTypeId::new("article"));

        let before = engine.decide(&mut cache, &n1, RevisionId(1), &article).unwrap();
        assert_eq!(before, process("draft", true, true));

        source.draft.set("review");
        let cached = engine.decide(&mut cache, &n1, RevisionId(1), &article).unwrap();
        assert_eq!(cached, before);
        assert_eq!(source.fetches.get(), 1);

        cache.clear();
        let after = engine.decide(&mut cache, &n1, RevisionId(1), &article).unwrap();
        assert_eq!(after, process("review", true, true));
        assert_eq!(source.fetches.get(), 2);
    }

    #[test]
    fn cleared_cache_with_same_workflow_keeps_the_history() {
        let source = FakeSource::new(&[(None, 1, 10, "", None, false)]);
        let mut engine = RevisionDecisionEngine::new(&source, &source, EngineConfig::default());
        let mut cache = WorkflowCache::new();
        let (n1, article) = (ContentId::new("n1"), ContentTypeId::new("article"));

        engine.decide(&mut cache, &n1, RevisionId(1), &article).unwrap();
        cache.clear();
        engine.decide(&mut cache, &n1, RevisionId(1), &article).unwrap();

        assert_eq!(source.fetches.get(), 1);
    }
}
