//! modhist-core: shared vocabulary for moderation-history reconciliation.
//!
//! # Public API
//!
//! - Identifier newtypes: [`ContentId`], [`RevisionId`], [`LogId`],
//!   [`StateId`], [`ContentTypeId`]
//! - [`Timestamp`] -- source timestamps at one-second resolution
//! - [`Workflow`], [`State`], [`Transition`] -- the target workflow a
//!   content type is assigned to

pub mod ids;
pub mod workflow;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ids::{ContentId, ContentTypeId, LogId, RevisionId, StateId, Timestamp};
pub use workflow::{State, Transition, Workflow};
