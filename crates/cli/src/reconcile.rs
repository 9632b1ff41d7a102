//! `modhist reconcile`: decisions for every revision of a snapshot.

use std::path::Path;
use std::process;

use modhist_core::{ContentId, ContentTypeId};
use modhist_reconcile::{reconcile_items, ItemReport};

use crate::{load_config, load_snapshot, report_error, OutputFormat};

pub(crate) fn cmd_reconcile(
    snapshot_path: &Path,
    config_path: Option<&Path>,
    content_id: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let config = load_config(config_path, output, quiet);
    let source = load_snapshot(snapshot_path, output, quiet);

    let items: Vec<(ContentId, ContentTypeId)> = match content_id {
        Some(id) => {
            let id = ContentId::new(id);
            match source.content_type_of(&id) {
                Some(content_type) => vec![(id, content_type.clone())],
                None => {
                    let msg = format!("content item '{}' is not in the snapshot", id);
                    report_error(&msg, output, quiet);
                    process::exit(1);
                }
            }
        }
        None => source
            .content_ids()
            .filter_map(|id| {
                source
                    .content_type_of(id)
                    .map(|content_type| (id.clone(), content_type.clone()))
            })
            .collect(),
    };

    let reports = match reconcile_items(
        &source,
        &source,
        config,
        items.iter().map(|(id, content_type)| (id, content_type)),
    ) {
        Ok(reports) => reports,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&reports)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for report in &reports {
                print_report(report, quiet);
            }
        }
    }
}

fn print_report(report: &ItemReport, quiet: bool) {
    if !quiet {
        let relabeled = match report.relabeled {
            0 => String::new(),
            1 => ", 1 entry relabeled".to_string(),
            n => format!(", {} entries relabeled", n),
        };
        println!(
            "item {} ({}){}",
            report.content_id, report.content_type, relabeled
        );
    }
    for d in &report.decisions {
        println!("  revision {}: {}", d.revision_id, d.decision);
    }
}
