use modhist_storage::SourceError;

use crate::config::ConfigError;

/// Errors that abort reconciliation of a content item.
///
/// Skipped revisions are not errors; they are reported through
/// [`Decision::Skip`](crate::Decision::Skip).
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The history or workflow source failed, including a content type with
    /// no assigned workflow.
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
