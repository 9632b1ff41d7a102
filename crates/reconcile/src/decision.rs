//! Per-revision reconciliation outcomes.

use std::fmt;

use modhist_core::StateId;
use serde::Serialize;

/// Why a revision is left out of the migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A published revision that duplicates the last published one.
    DuplicatePublished,
    /// A draft whose predecessor revision is missing from the history.
    OrphanedDraft,
}

impl SkipReason {
    pub fn message(self) -> &'static str {
        match self {
            SkipReason::DuplicatePublished => "duplicate of the last published revision",
            SkipReason::OrphanedDraft => "draft lacks its predecessor revision",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The engine's verdict for one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    /// Migrate the revision with this state and default-revision flag.
    /// `annotate` asks the caller to note on the revision that the state
    /// was computed rather than logged.
    Process {
        state: StateId,
        is_default_revision: bool,
        annotate: bool,
    },
    /// Leave the revision out. `record_in_map` keeps the row counted as
    /// processed rather than failed.
    Skip {
        reason: SkipReason,
        record_in_map: bool,
    },
    /// The revision is not part of the item's history; leave the row as is.
    NoOp,
}

impl Decision {
    pub(crate) fn skip(reason: SkipReason) -> Self {
        Decision::Skip {
            reason,
            record_in_map: true,
        }
    }

    /// The state to write back, for revisions that are processed.
    pub fn state(&self) -> Option<&StateId> {
        match self {
            Decision::Process { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Process {
                state,
                is_default_revision,
                annotate,
            } => {
                write!(f, "process as '{}'", state)?;
                if *is_default_revision {
                    write!(f, " (default revision)")?;
                }
                if *annotate {
                    write!(f, " [computed]")?;
                }
                Ok(())
            }
            Decision::Skip { reason, .. } => write!(f, "skip: {}", reason),
            Decision::NoOp => write!(f, "no-op"),
        }
    }
}
