use modhist_core::ContentTypeId;

/// All errors that can be returned by a history or workflow source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No workflow is assigned to the content type. Every downstream
    /// decision depends on the workflow, so callers must not guess one.
    #[error("no workflow assigned to content type '{content_type}'")]
    WorkflowNotFound { content_type: ContentTypeId },

    /// The workflow has no state usable as a fallback for silent revisions.
    #[error("workflow '{workflow}' has no non-published state to fall back to")]
    NoFallbackState { workflow: String },

    /// The workflow has no published state for revisions that carry the
    /// publish flag.
    #[error("workflow '{workflow}' has no published state")]
    NoPublishedState { workflow: String },

    /// The workflow has no non-published default-revision state to retire
    /// items into.
    #[error("workflow '{workflow}' has no archive state")]
    NoArchivedState { workflow: String },

    /// The snapshot document could not be read or parsed.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// A backend-specific error (DB connection, serialization, etc.).
    #[error("source backend error: {0}")]
    Backend(String),
}
