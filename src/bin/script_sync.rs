use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use script_sync::pipeline::defaults::LoggingSink;
use script_sync::script::{find_script, load_documents, segment_documents, segmented_view};
use script_sync::{SessionRegistry, SyncConfig, SyncEngineBuilder};
use tracing_subscriber::EnvFilter;

#[path = "script_sync/json_output.rs"]
mod json_output;

#[derive(Debug, Parser)]
#[command(name = "script_sync")]
#[command(about = "Segment presentation scripts and replay recognized speech against them")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the segmented form of every script document.
    Segment {
        #[arg(long, env = "SCRIPT_SYNC_SCRIPTS", default_value = "db/script.json")]
        scripts: PathBuf,
        /// Write to this file instead of stdout.
        #[arg(long, env = "SCRIPT_SYNC_OUT")]
        out: Option<PathBuf>,
    },
    /// Feed finalized utterances (one per line) through a session and print
    /// each round outcome as a JSON line.
    Replay {
        #[arg(long, env = "SCRIPT_SYNC_SCRIPTS", default_value = "db/script.json")]
        scripts: PathBuf,
        #[arg(long)]
        id: String,
        #[arg(long)]
        utterances: PathBuf,
        #[arg(long, env = "SCRIPT_SYNC_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()).await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), String> {
    match args.command {
        Command::Segment { scripts, out } => {
            let documents = load_documents(&scripts).map_err(|e| e.to_string())?;
            let segmented = segment_documents(&documents).map_err(|e| e.to_string())?;
            let view = segmented_view(&segmented);
            match out {
                Some(path) => json_output::write_pretty(&path, &view)?,
                None => json_output::print_pretty(&view)?,
            }
            Ok(())
        }
        Command::Replay {
            scripts,
            id,
            utterances,
            config,
        } => replay(scripts, id, utterances, config).await,
    }
}

async fn replay(
    scripts: PathBuf,
    id: String,
    utterances: PathBuf,
    config: Option<PathBuf>,
) -> Result<(), String> {
    let config = match config {
        Some(path) => SyncConfig::load(&path).map_err(|e| e.to_string())?,
        None => SyncConfig::default(),
    };
    let documents = load_documents(&scripts).map_err(|e| e.to_string())?;
    let segmented = segment_documents(&documents).map_err(|e| e.to_string())?;
    let script = find_script(&segmented, &id).map_err(|e| e.to_string())?;

    let lines = std::fs::read_to_string(&utterances).map_err(|err| {
        format!(
            "Failed to read utterances '{}': {err}",
            utterances.display()
        )
    })?;

    let engine = SyncEngineBuilder::new(config)
        .with_sink(Arc::new(LoggingSink))
        .build()
        .map_err(|e| e.to_string())?;
    let registry = SessionRegistry::new(Arc::new(engine));
    let session_id = format!("replay-{id}");
    let handle = registry
        .open(session_id.clone(), Arc::new(script.clone()))
        .map_err(|e| e.to_string())?;

    for heard in lines.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match handle.submit(heard).await {
            Ok(outcome) => json_output::print_line(&outcome)?,
            Err(err) => json_output::print_line(&json_output::RoundFailure {
                heard,
                error: err.to_string(),
                retryable: err.is_retryable(),
            })?,
        }
    }

    registry.close(&session_id).await.map_err(|e| e.to_string())?;
    Ok(())
}
