//! Engine configuration.
//!
//! Loaded from the `[reconcile]` table of a TOML file. Every field has a
//! default, so an empty file (or no file) yields a working configuration.
//! The published and archive states are read from each content type's
//! workflow; the two state fields only override that choice.
//!
//! # Example
//!
//! ```toml
//! [reconcile]
//! published_state = "published"
//! archived_state = "archived"
//! clone_window = 1
//! annotation = "Moderation state computed during migration."
//! ```

use std::path::{Path, PathBuf};

use modhist_core::{StateId, Timestamp};
use serde::{Deserialize, Serialize};

/// Default clone-detection window in seconds.
///
/// Tuned to the source system's save-timing artifact: a publish action
/// writes its revision within one second of the revision it duplicates.
pub const DEFAULT_CLONE_WINDOW: i64 = 1;

/// Default note appended to a revision's log when its state was computed.
pub const DEFAULT_ANNOTATION: &str = "Moderation state computed during migration.";

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("clone_window must not be negative, got {0}")]
    NegativeCloneWindow(i64),
}

/// Settings shared by every stage of the reconciliation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Overrides the workflow's published state, the state given to silent
    /// revisions that carry the publish flag.
    pub published_state: Option<StateId>,
    /// Overrides the workflow's archive state, used to retire an item that
    /// was published once but whose latest revision is not published.
    pub archived_state: Option<StateId>,
    /// Maximum distance in seconds between two entries for the later one to
    /// count as a storage artifact of the earlier.
    pub clone_window: i64,
    /// Note appended to the revision log when the state was synthesized.
    pub annotation: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            published_state: None,
            archived_state: None,
            clone_window: DEFAULT_CLONE_WINDOW,
            annotation: DEFAULT_ANNOTATION.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    reconcile: EngineConfig,
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.reconcile.validated()
    }

    /// Read and parse a configuration file from `path`.
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Override the clone-detection window.
    pub fn with_clone_window(mut self, seconds: i64) -> Self {
        self.clone_window = seconds;
        self
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.clone_window < 0 {
            return Err(ConfigError::NegativeCloneWindow(self.clone_window));
        }
        Ok(self)
    }

    /// Whether `later` falls within the clone window after `earlier`.
    /// Entries out of chronological order never qualify.
    pub fn within_clone_window(&self, earlier: Timestamp, later: Timestamp) -> bool {
        (0..=self.clone_window).contains(&later.seconds_since(earlier))
    }
}
