//! Word frequency pipeline - main entry point
//!
//! Thin presentation collaborator around the engine library: parses the
//! CLI, prints the sort selector labels, feeds the initial selection into
//! the pipeline, and renders each emitted ordered view to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordfreq_common::events::EventBus;
use wordfreq_common::{ListRow, SortMethod, WordCount};
use wordfreq_engine::config::EngineConfig;
use wordfreq_engine::counter::{EmissionMode, ReadPolicy};
use wordfreq_engine::{reader, Pipeline};

/// Command-line arguments for wordfreq-engine
#[derive(Parser, Debug)]
#[command(name = "wordfreq-engine")]
#[command(about = "Streamed word-frequency tally with selectable sorting")]
#[command(version)]
struct Args {
    /// Text file to ingest
    #[arg(env = "WORDFREQ_FILE")]
    file: PathBuf,

    /// Initial sort selection (0-based index into the selector)
    #[arg(short, long)]
    sort: Option<usize>,

    /// Policy for source-read failures
    #[arg(long, value_enum)]
    policy: Option<ReadPolicy>,

    /// Render an ordered view after every chunk instead of once at completion
    #[arg(long)]
    interactive: bool,

    /// Path to TOML configuration file
    #[arg(short, long, env = "WORDFREQ_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = EngineConfig::load_or_default(args.config.as_deref());
    if let Some(policy) = args.policy {
        config.read_policy = policy;
    }
    if args.interactive {
        config.emission_mode = EmissionMode::Interactive;
    }

    // Initialize tracing
    let default_filter = format!("wordfreq_engine={}", config.logging.level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Ingesting {}", args.file.display());

    // Selector labels are static; populate the "selector" up front
    for (index, label) in Pipeline::labels().iter().enumerate() {
        println!("[{index}] {label}");
    }
    println!();

    let events = EventBus::new(100);
    let chunks = reader::read_lines(args.file.clone(), events.clone(), config.channel_capacity);

    let (selection_tx, selection_rx) = mpsc::channel(8);

    let pipeline = Pipeline::new(config, events);
    let handle = pipeline.spawn(chunks, selection_rx);

    // Index 0 is implied; only an explicit selection needs sending
    if let Some(index) = args.sort {
        SortMethod::try_from(index).context("invalid --sort selection")?;
        selection_tx
            .send(index)
            .await
            .context("pipeline stopped before the selection was applied")?;
    }
    drop(selection_tx);

    let mut results = ReceiverStream::new(handle.results);
    let mut first = true;
    while let Some(rows) = results.next().await {
        if !first {
            println!();
        }
        first = false;
        render(&rows);
    }

    handle
        .task
        .await
        .context("pipeline task panicked")?
        .context("pipeline failed")?;

    Ok(())
}

/// Render one ordered view, word as primary label and count as decimal text
fn render(rows: &[WordCount]) {
    for row in rows.iter().map(ListRow::from) {
        println!("{:<24}{}", row.title, row.value);
    }
}
