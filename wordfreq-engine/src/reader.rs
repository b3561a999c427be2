//! Text source collaborator
//!
//! Streams a text source into the chunk channel one line at a time. The
//! concrete form of the source (local file or in-memory text) is a detail
//! of this module; read failures are forwarded as `Err` chunks for the
//! aggregator to handle per its read policy.

use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use wordfreq_common::events::{EventBus, PipelineEvent};
use wordfreq_common::{Error, Result};

/// Spawn a reader task streaming `path` line-by-line.
///
/// The returned channel yields one `Ok(line)` per line read; a failure to
/// open or read the file yields a single `Err` and ends the stream.
pub fn read_lines(path: PathBuf, events: EventBus, capacity: usize) -> mpsc::Receiver<Result<String>> {
    let (tx, rx) = mpsc::channel(capacity);

    tokio::spawn(async move {
        events.emit_lossy(PipelineEvent::IngestStarted {
            source: path.display().to_string(),
            timestamp: chrono::Utc::now(),
        });

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(err) => {
                let _ = tx
                    .send(Err(Error::SourceRead(format!(
                        "{}: {err}",
                        path.display()
                    ))))
                    .await;
                return;
            }
        };

        let mut lines = BufReader::new(file).lines();
        let mut sent: u64 = 0;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(Ok(line)).await.is_err() {
                        return;
                    }
                    sent += 1;
                }
                Ok(None) => break,
                Err(err) => {
                    let _ = tx
                        .send(Err(Error::SourceRead(format!(
                            "{}: {err}",
                            path.display()
                        ))))
                        .await;
                    return;
                }
            }
        }

        debug!(lines = sent, "source {} fully read", path.display());
    });

    rx
}

/// Spawn a reader task streaming an in-memory text line-by-line.
///
/// Used by tests and collaborators that already hold the document.
pub fn from_text(text: impl Into<String>, events: EventBus, capacity: usize) -> mpsc::Receiver<Result<String>> {
    let text = text.into();
    let (tx, rx) = mpsc::channel(capacity);

    tokio::spawn(async move {
        events.emit_lossy(PipelineEvent::IngestStarted {
            source: "<memory>".to_string(),
            timestamp: chrono::Utc::now(),
        });

        for line in text.lines() {
            if tx.send(Ok(line.to_string())).await.is_err() {
                return;
            }
        }
    });

    rx
}
