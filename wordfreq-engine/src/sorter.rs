//! Asynchronous sorting off the caller's task
//!
//! Sort comparisons run on blocking workers so the coordinator is never
//! blocked by a large table. Sorts are not cancelled in flight: each
//! launch is tagged with a generation, and the coordinator drops any
//! completion whose generation is no longer the latest.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task;
use tracing::error;
use wordfreq_common::events::{EventBus, PipelineEvent};
use wordfreq_common::{Error, OrderedResult, Result, Snapshot, SortMethod, WordCount};

/// One sort request: a frozen snapshot paired with a method, tagged with
/// the coordinator's request generation.
#[derive(Debug, Clone)]
pub struct SortRequest {
    pub generation: u64,
    pub snapshot: Snapshot,
    pub method: SortMethod,
}

/// Completion of a launched sort
#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub generation: u64,
    pub method: SortMethod,
    pub rows: OrderedResult,
}

/// Sort items under `method` on a blocking worker.
pub async fn sort(items: Vec<WordCount>, method: SortMethod) -> Result<OrderedResult> {
    task::spawn_blocking(move || {
        let mut items = items;
        method.sort(&mut items);
        items
    })
    .await
    .map_err(|err| Error::Internal(format!("sort worker failed: {err}")))
}

/// Seam between the coordinator and the sort workers.
///
/// The production backend offloads to blocking workers; tests substitute
/// a backend that holds completions until released.
pub trait SortBackend: Send + Sync + 'static {
    /// Launch sort work for `request`, delivering its outcome on `done_tx`.
    ///
    /// Must not block the caller; the outcome may arrive in any order
    /// relative to other launches.
    fn launch(&self, request: SortRequest, done_tx: mpsc::Sender<SortOutcome>);
}

/// Production backend: one `spawn_blocking` worker per launch
#[derive(Debug, Default)]
pub struct BlockingSortBackend;

impl SortBackend for BlockingSortBackend {
    fn launch(&self, request: SortRequest, done_tx: mpsc::Sender<SortOutcome>) {
        let SortRequest {
            generation,
            snapshot,
            method,
        } = request;

        tokio::spawn(async move {
            let items = snapshot.to_items();
            match sort(items, method).await {
                Ok(rows) => {
                    let _ = done_tx
                        .send(SortOutcome {
                            generation,
                            method,
                            rows,
                        })
                        .await;
                }
                Err(err) => error!(generation, "dropping failed sort: {err}"),
            }
        });
    }
}

/// Shared handle to a sort backend
pub type SharedSortBackend = Arc<dyn SortBackend>;

/// Emit the launch event for a request (shared by all backends' callers)
pub(crate) fn announce_launch(events: &EventBus, request: &SortRequest) {
    events.emit_lossy(PipelineEvent::SortStarted {
        method: request.method,
        generation: request.generation,
        items: request.snapshot.len(),
        timestamp: chrono::Utc::now(),
    });
}
