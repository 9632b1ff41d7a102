mod reconcile;
mod render;
mod timeline;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use modhist_reconcile::EngineConfig;
use modhist_storage::SnapshotSource;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Moderation history reconciliation tool.
#[derive(Parser)]
#[command(
    name = "modhist",
    version,
    about = "Moderation history reconciliation tool"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide the target state of every revision in a snapshot
    Reconcile {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,
        /// Path to a TOML file with a [reconcile] table
        #[arg(long)]
        config: Option<PathBuf>,
        /// Only reconcile this content item
        #[arg(long)]
        content_id: Option<String>,
    },

    /// Show the sorted, relabeled history of one content item
    Timeline {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,
        /// Content item to show
        #[arg(long)]
        content_id: String,
        /// Path to a TOML file with a [reconcile] table
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Reconcile {
            snapshot,
            config,
            content_id,
        } => {
            reconcile::cmd_reconcile(
                &snapshot,
                config.as_deref(),
                content_id.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Timeline {
            snapshot,
            content_id,
            config,
        } => {
            timeline::cmd_timeline(
                &snapshot,
                &content_id,
                config.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
    }
}

/// Engine logs go to stderr, filtered by `MODHIST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("MODHIST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the engine configuration, or the defaults when no file is given.
pub(crate) fn load_config(
    path: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) -> EngineConfig {
    let Some(path) = path else {
        return EngineConfig::default();
    };
    match EngineConfig::from_toml_path(path) {
        Ok(config) => config,
        Err(e) => {
            let msg = format!("error loading config '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn load_snapshot(path: &Path, output: OutputFormat, quiet: bool) -> SnapshotSource {
    match SnapshotSource::from_path(path) {
        Ok(source) => source,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
