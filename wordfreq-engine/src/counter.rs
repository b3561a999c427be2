//! Incremental word-frequency aggregation
//!
//! One aggregation task owns the mutable [`FrequencyTable`] for the
//! duration of an ingestion run. Chunks are folded strictly in arrival
//! order; everything handed downstream is an immutable snapshot copy, so
//! in-flight sorts never observe partial mutation.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use wordfreq_common::events::{EventBus, PipelineEvent};
use wordfreq_common::{FrequencyTable, Result, Snapshot};

use crate::tokenizer;

/// Snapshot emission mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionMode {
    /// Emit exactly one snapshot when the chunk stream completes
    #[default]
    FinalOnly,
    /// Emit a snapshot after every folded chunk, plus the final snapshot
    Interactive,
}

/// Policy for source-read failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReadPolicy {
    /// Surface the failure as the terminal outcome of the run
    #[default]
    Strict,
    /// Absorb the failure (logged and emitted on the event bus) and
    /// complete with the input seen so far
    Lenient,
}

/// Spawn the aggregation task.
///
/// Consumes a stream of text chunks (each possibly a read failure) and
/// produces a stream of frequency snapshots per `mode`. Under
/// [`ReadPolicy::Strict`] a failed chunk terminates the output stream
/// with that error; under [`ReadPolicy::Lenient`] the failure is logged,
/// surfaced on the event bus, and the run completes normally.
pub fn spawn(
    mut chunks: mpsc::Receiver<Result<String>>,
    mode: EmissionMode,
    policy: ReadPolicy,
    events: EventBus,
    capacity: usize,
) -> mpsc::Receiver<Result<Snapshot>> {
    let (tx, rx) = mpsc::channel(capacity);

    tokio::spawn(async move {
        let mut table = FrequencyTable::new();
        let mut chunks_folded: u64 = 0;

        while let Some(chunk) = chunks.recv().await {
            match chunk {
                Ok(line) => {
                    for word in tokenizer::tokenize(&line) {
                        table.record(word);
                    }
                    chunks_folded += 1;

                    events.emit_lossy(PipelineEvent::SnapshotUpdated {
                        distinct_words: table.len(),
                        total_occurrences: table.total_occurrences(),
                        timestamp: chrono::Utc::now(),
                    });

                    if mode == EmissionMode::Interactive
                        && tx.send(Ok(table.snapshot())).await.is_err()
                    {
                        // Downstream gone; nothing left to aggregate for
                        return;
                    }
                }
                Err(err) => match policy {
                    ReadPolicy::Strict => {
                        warn!("source read failed, terminating run: {err}");
                        events.emit_lossy(PipelineEvent::SourceReadFailed {
                            error: err.to_string(),
                            absorbed: false,
                            timestamp: chrono::Utc::now(),
                        });
                        let _ = tx.send(Err(err)).await;
                        return;
                    }
                    ReadPolicy::Lenient => {
                        warn!("source read failed, continuing with {chunks_folded} chunks: {err}");
                        events.emit_lossy(PipelineEvent::SourceReadFailed {
                            error: err.to_string(),
                            absorbed: true,
                            timestamp: chrono::Utc::now(),
                        });
                        break;
                    }
                },
            }
        }

        debug!(
            chunks = chunks_folded,
            distinct_words = table.len(),
            "chunk stream complete"
        );
        events.emit_lossy(PipelineEvent::IngestCompleted {
            chunks: chunks_folded,
            distinct_words: table.len(),
            timestamp: chrono::Utc::now(),
        });

        // Final snapshot: always emitted, even for an empty run
        let _ = tx.send(Ok(table.snapshot())).await;
    });

    rx
}
