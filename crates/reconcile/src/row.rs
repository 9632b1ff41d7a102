//! Write-back of decisions onto migration rows.

use modhist_core::{ContentId, ContentTypeId, RevisionId, StateId};
use serde::{Deserialize, Serialize};

use crate::decision::{Decision, SkipReason};

/// The slice of a migration row the engine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRow {
    pub content_id: Option<ContentId>,
    pub revision_id: Option<RevisionId>,
    pub content_type: ContentTypeId,
    /// Free-text revision log.
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub moderation_state: Option<StateId>,
    #[serde(default)]
    pub is_default_revision: Option<bool>,
}

/// What happened to a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// State and default-revision flag were written.
    Written,
    /// The row must not be migrated.
    Skipped {
        reason: SkipReason,
        record_in_map: bool,
    },
    /// The row was left unmodified.
    Untouched,
}

impl MigrationRow {
    /// Apply `decision` to the row. `annotation` is appended to the log
    /// when the decision asks for it.
    pub fn apply(&mut self, decision: &Decision, annotation: &str) -> RowOutcome {
        match decision {
            Decision::Process {
                state,
                is_default_revision,
                annotate,
            } => {
                self.moderation_state = Some(state.clone());
                self.is_default_revision = Some(*is_default_revision);
                if *annotate {
                    self.append_log(annotation);
                }
                RowOutcome::Written
            }
            Decision::Skip {
                reason,
                record_in_map,
            } => RowOutcome::Skipped {
                reason: *reason,
                record_in_map: *record_in_map,
            },
            Decision::NoOp => RowOutcome::Untouched,
        }
    }

    fn append_log(&mut self, note: &str) {
        if !self.log.is_empty() {
            self.log.push('\n');
        }
        self.log.push_str(note);
    }
}
