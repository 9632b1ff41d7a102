//! modhist-storage: the sources the reconciliation engine reads from.
//!
//! # Public API
//!
//! - [`HistorySource`] -- revisions of an item left-joined with its
//!   moderation log rows, as [`RawFact`]s
//! - [`WorkflowSource`] -- the workflow assigned to a content type and its
//!   fallback state
//! - [`SnapshotSource`] -- both sources served from a JSON
//!   [`SnapshotDocument`] held in memory
//! - [`SourceError`] -- every failure a source can report

mod error;
mod record;
pub mod snapshot;
mod traits;

pub use error::SourceError;
pub use record::{LogFact, LogRecord, RawFact, RevisionRecord};
pub use snapshot::{ItemRecord, SnapshotDocument, SnapshotSource};
pub use traits::{HistorySource, WorkflowSource};
