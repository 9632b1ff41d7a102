//! Target workflow model.
//!
//! A workflow is read-only for the duration of a run. The reconciliation
//! engine only consumes it to label historical data; it never validates
//! the definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::StateId;

// ──────────────────────────────────────────────
// Workflow sub-types
// ──────────────────────────────────────────────

/// A moderation state of the target workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    #[serde(default)]
    pub label: String,
    /// Content in this state is publicly visible.
    #[serde(default)]
    pub published: bool,
    /// A revision entering this state becomes the item's default revision.
    #[serde(default)]
    pub default_revision: bool,
}

/// A transition between workflow states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub from: Vec<StateId>,
    pub to: StateId,
}

/// Serialized shape of a workflow, before indexes are built.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkflowDef {
    id: String,
    states: Vec<State>,
    #[serde(default)]
    transitions: Vec<Transition>,
}

// ──────────────────────────────────────────────
// Workflow
// ──────────────────────────────────────────────

/// A workflow assigned to one or more content types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WorkflowDef", into = "WorkflowDef")]
pub struct Workflow {
    pub id: String,
    pub states: Vec<State>,
    pub transitions: Vec<Transition>,
    state_index: HashMap<StateId, usize>,
}

impl From<WorkflowDef> for Workflow {
    fn from(def: WorkflowDef) -> Self {
        Workflow::new(def.id, def.states, def.transitions)
    }
}

impl From<Workflow> for WorkflowDef {
    fn from(wf: Workflow) -> Self {
        WorkflowDef {
            id: wf.id,
            states: wf.states,
            transitions: wf.transitions,
        }
    }
}

impl Workflow {
    /// Construct a Workflow, building the state index.
    ///
    /// When a state id is declared twice the first declaration wins.
    pub fn new(id: impl Into<String>, states: Vec<State>, transitions: Vec<Transition>) -> Self {
        let mut state_index = HashMap::with_capacity(states.len());
        for (i, state) in states.iter().enumerate() {
            state_index.entry(state.id.clone()).or_insert(i);
        }
        Workflow {
            id: id.into(),
            states,
            transitions,
            state_index,
        }
    }

    /// Look up a state by ID in O(1) via the index.
    pub fn state(&self, id: &StateId) -> Option<&State> {
        self.state_index.get(id).map(|&i| &self.states[i])
    }

    /// Whether `id` names a published state of this workflow. Unknown
    /// states are not published.
    pub fn is_published(&self, id: &StateId) -> bool {
        self.state(id).is_some_and(|s| s.published)
    }

    /// The first declared published state, given to silent revisions that
    /// carry the publish flag.
    pub fn published_state(&self) -> Option<StateId> {
        self.states
            .iter()
            .find(|s| s.published)
            .map(|s| s.id.clone())
    }

    /// The state that retires an item: the target of the first transition
    /// leaving a published state into a non-published default-revision
    /// state, else the first declared such state.
    pub fn archived_state(&self) -> Option<StateId> {
        let is_retired = |s: &State| !s.published && s.default_revision;

        self.transitions
            .iter()
            .find_map(|t| {
                let leaves_published = t.from.iter().any(|f| self.is_published(f));
                let target = self.state(&t.to)?;
                (leaves_published && is_retired(target)).then(|| target.id.clone())
            })
            .or_else(|| {
                self.states
                    .iter()
                    .find(|s| is_retired(s))
                    .map(|s| s.id.clone())
            })
    }

    /// The representative non-published state used when the source log is
    /// silent about a revision.
    ///
    /// Preference order:
    /// 1. the target of the first transition leaving a published state into a
    ///    state that is neither published nor default-revision (the "new
    ///    draft" transition);
    /// 2. the first declared state that is neither published nor
    ///    default-revision;
    /// 3. the first declared non-published state.
    ///
    /// Returns `None` when every state is published.
    pub fn fallback_state(&self) -> Option<StateId> {
        let is_draft_like = |s: &State| !s.published && !s.default_revision;

        let from_transition = self.transitions.iter().find_map(|t| {
            let leaves_published = t.from.iter().any(|f| self.is_published(f));
            let target = self.state(&t.to)?;
            (leaves_published && is_draft_like(target)).then(|| target.id.clone())
        });

        from_transition
            .or_else(|| {
                self.states
                    .iter()
                    .find(|s| is_draft_like(s))
                    .map(|s| s.id.clone())
            })
            .or_else(|| {
                self.states
                    .iter()
                    .find(|s| !s.published)
                    .map(|s| s.id.clone())
            })
    }
}
