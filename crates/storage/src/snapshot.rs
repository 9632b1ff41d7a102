//! In-memory source backed by a JSON snapshot document.
//!
//! A snapshot freezes everything the engine reads from the legacy system:
//! the revision table, the moderation log, the content type of every item,
//! and the workflow assigned to every content type.
//!
//! # Example
//!
//! ```json
//! {
//!   "items": [{ "content_id": "12", "content_type": "article" }],
//!   "revisions": [
//!     { "content_id": "12", "revision_id": 1, "published": false, "saved_at": 10 }
//!   ],
//!   "log": [
//!     { "log_id": 1, "content_id": "12", "revision_id": 1,
//!       "state": "draft", "from_state": null, "stamp": 10 }
//!   ],
//!   "workflows": {
//!     "article": { "id": "editorial", "states": [{ "id": "draft" }] }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use modhist_core::{ContentId, ContentTypeId, Workflow};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::record::{LogFact, LogRecord, RawFact, RevisionRecord};
use crate::traits::{HistorySource, WorkflowSource};

/// Content type assignment of one content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub content_id: ContentId,
    pub content_type: ContentTypeId,
}

/// Serialized snapshot document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub revisions: Vec<RevisionRecord>,
    #[serde(default)]
    pub log: Vec<LogRecord>,
    #[serde(default)]
    pub workflows: BTreeMap<ContentTypeId, Workflow>,
}

/// A source that serves a frozen snapshot from memory.
///
/// Revisions and log rows are grouped per content item at construction so
/// that each fetch only touches one item's rows.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    items: BTreeMap<ContentId, ContentTypeId>,
    revisions: HashMap<ContentId, Vec<RevisionRecord>>,
    log: HashMap<ContentId, Vec<LogRecord>>,
    workflows: BTreeMap<ContentTypeId, Workflow>,
}

impl SnapshotSource {
    /// Build a source from a parsed snapshot document.
    pub fn new(doc: SnapshotDocument) -> Self {
        let items = doc
            .items
            .into_iter()
            .map(|i| (i.content_id, i.content_type))
            .collect();

        let mut revisions: HashMap<ContentId, Vec<RevisionRecord>> = HashMap::new();
        for rev in doc.revisions {
            revisions.entry(rev.content_id.clone()).or_default().push(rev);
        }
        for revs in revisions.values_mut() {
            revs.sort_by_key(|r| r.revision_id);
        }

        let mut log: HashMap<ContentId, Vec<LogRecord>> = HashMap::new();
        for row in doc.log {
            log.entry(row.content_id.clone()).or_default().push(row);
        }
        for rows in log.values_mut() {
            rows.sort_by_key(|r| r.log_id);
        }

        SnapshotSource {
            items,
            revisions,
            log,
            workflows: doc.workflows,
        }
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let doc: SnapshotDocument =
            serde_json::from_str(json).map_err(|e| SourceError::Snapshot(e.to_string()))?;
        Ok(Self::new(doc))
    }

    /// Read and parse a snapshot file from `path`.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SourceError::Snapshot(format!("could not read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            SourceError::Snapshot(msg) => {
                SourceError::Snapshot(format!("could not parse '{}': {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Content ids of every item in the snapshot, in ascending order.
    pub fn content_ids(&self) -> impl Iterator<Item = &ContentId> {
        self.items.keys()
    }

    /// The content type of an item, if the snapshot knows the item.
    pub fn content_type_of(&self, content_id: &ContentId) -> Option<&ContentTypeId> {
        self.items.get(content_id)
    }
}

impl HistorySource for SnapshotSource {
    fn fetch_revisions_and_log(
        &self,
        content_id: &ContentId,
    ) -> Result<Vec<RawFact>, SourceError> {
        let Some(revisions) = self.revisions.get(content_id) else {
            return Ok(Vec::new());
        };
        let log_rows = self.log.get(content_id).map(Vec::as_slice).unwrap_or(&[]);

        let mut facts = Vec::with_capacity(revisions.len().max(log_rows.len()));
        for rev in revisions {
            let mut matched = false;
            for row in log_rows.iter().filter(|l| l.revision_id == rev.revision_id) {
                matched = true;
                facts.push(RawFact {
                    content_id: rev.content_id.clone(),
                    revision_id: rev.revision_id,
                    published: rev.published,
                    saved_at: rev.saved_at,
                    log: Some(LogFact {
                        log_id: row.log_id,
                        state: row.state.clone(),
                        from_state: row.from_state.clone(),
                        stamp: row.stamp,
                    }),
                });
            }
            if !matched {
                facts.push(RawFact {
                    content_id: rev.content_id.clone(),
                    revision_id: rev.revision_id,
                    published: rev.published,
                    saved_at: rev.saved_at,
                    log: None,
                });
            }
        }
        Ok(facts)
    }
}

impl WorkflowSource for SnapshotSource {
    fn resolve_workflow(&self, content_type: &ContentTypeId) -> Result<Workflow, SourceError> {
        self.workflows
            .get(content_type)
            .cloned()
            .ok_or_else(|| SourceError::WorkflowNotFound {
                content_type: content_type.clone(),
            })
    }
}
