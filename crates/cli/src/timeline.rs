//! `modhist timeline`: the reconciled history of one content item.
//!
//! Each entry is printed in timeline order. Entries that are the last
//! transition of their revision are marked as indexed, and indexed entries
//! the clone detector flags are marked as clones.

use std::path::Path;
use std::process;

use modhist_core::ContentId;
use modhist_reconcile::{
    CloneDetector, HistoryEntry, ItemHistory, RevisionDecisionEngine, WorkflowCache,
};

use crate::render;
use crate::{load_config, load_snapshot, report_error, OutputFormat};

/// One timeline entry with its index and clone markers.
struct Row<'a> {
    position: usize,
    entry: &'a HistoryEntry,
    indexed: bool,
    clone: bool,
}

pub(crate) fn cmd_timeline(
    snapshot_path: &Path,
    content_id: &str,
    config_path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let config = load_config(config_path, output, quiet);
    let source = load_snapshot(snapshot_path, output, quiet);

    let content_id = ContentId::new(content_id);
    let Some(content_type) = source.content_type_of(&content_id).cloned() else {
        let msg = format!("content item '{}' is not in the snapshot", content_id);
        report_error(&msg, output, quiet);
        process::exit(1);
    };

    let mut engine = RevisionDecisionEngine::new(&source, &source, config);
    let mut cache = WorkflowCache::new();
    let item = match engine.item_history(&mut cache, &content_id, &content_type) {
        Ok(item) => item.clone(),
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    let detector = CloneDetector::new(engine.config(), &item.workflow);
    let rows = rows(&item, &detector);

    match output {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = rows
                .iter()
                .map(|row| {
                    serde_json::json!({
                        "position": row.position,
                        "revision_id": row.entry.revision_id,
                        "log_id": row.entry.log_id,
                        "state": row.entry.state,
                        "from_state": row.entry.from_state,
                        "timestamp": row.entry.timestamp,
                        "synthesized": row.entry.is_synthesized(),
                        "indexed": row.indexed,
                        "clone": row.clone,
                    })
                })
                .collect();
            let doc = serde_json::json!({
                "content_id": item.content_id,
                "content_type": item.content_type,
                "relabeled": item.relabeled,
                "entries": entries,
            });
            let pretty = serde_json::to_string_pretty(&doc)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "item {} ({}), {} entries, {} revisions",
                    item.content_id,
                    item.content_type,
                    item.timeline.len(),
                    item.index.len()
                );
            }
            for row in &rows {
                let log = row
                    .entry
                    .log_id
                    .map(|id| format!("log {}", id))
                    .unwrap_or_else(|| "synthesized".to_string());
                let mut markers = Vec::new();
                if row.indexed {
                    markers.push("indexed");
                }
                if row.clone {
                    markers.push("clone");
                }
                println!(
                    "  {:>3}  {}  revision {}  {}  {}  {}",
                    row.position,
                    render::timestamp(row.entry.timestamp),
                    row.entry.revision_id,
                    row.entry.state,
                    log,
                    markers.join(",")
                );
            }
        }
    }
}

fn rows<'a>(item: &'a ItemHistory, detector: &CloneDetector<'_>) -> Vec<Row<'a>> {
    item.timeline
        .entries()
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let indexed = item
                .index
                .lookup(entry.revision_id)
                .filter(|indexed| indexed.position == position);
            Row {
                position,
                entry,
                indexed: indexed.is_some(),
                clone: indexed.is_some_and(|indexed| detector.is_clone(&item.timeline, indexed)),
            }
        })
        .collect()
}
