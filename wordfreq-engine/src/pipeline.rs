//! Pipeline coordinator
//!
//! Wires text source → aggregator → combine-with-selection → sorter →
//! ordered-result stream. The coordinator task is the single writer of
//! the latest-snapshot / latest-method / generation state: whenever
//! either input changes it pairs the new value with the latest value of
//! the other and launches a fresh generation-tagged sort. Only the
//! completion carrying the current maximum generation is ever delivered
//! downstream; stale completions are dropped.
//!
//! The `select!` loop is biased toward the input channels, so pending
//! snapshot and selection arrivals are folded in before any completion
//! is applied. A result for a superseded pair can therefore never be
//! emitted after a result for a newer pair.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wordfreq_common::events::{EventBus, PipelineEvent};
use wordfreq_common::{OrderedResult, Result, Snapshot, SortMethod};

use crate::config::EngineConfig;
use crate::counter;
use crate::sorter::{self, SharedSortBackend, SortOutcome, SortRequest};

/// Running pipeline: the ordered-result stream plus the coordinator task
pub struct PipelineHandle {
    /// Ordered results, one per delivered (snapshot, method) pair.
    /// Closes with zero emissions on a strict-policy source failure.
    pub results: mpsc::Receiver<OrderedResult>,
    /// Resolves when the run ends; `Err` carries the terminal failure
    /// under the strict read policy.
    pub task: JoinHandle<Result<()>>,
}

/// Word-frequency pipeline: ingestion, aggregation and re-sorting
pub struct Pipeline {
    config: EngineConfig,
    events: EventBus,
    backend: SharedSortBackend,
}

impl Pipeline {
    /// Create a pipeline with the production sort backend
    pub fn new(config: EngineConfig, events: EventBus) -> Self {
        Self::with_backend(config, events, Arc::new(sorter::BlockingSortBackend))
    }

    /// Create a pipeline with a custom sort backend
    pub fn with_backend(config: EngineConfig, events: EventBus, backend: SharedSortBackend) -> Self {
        Self {
            config,
            events,
            backend,
        }
    }

    /// Static selector labels, in enumeration order.
    ///
    /// Available synchronously; the list never changes during a session.
    pub fn labels() -> Vec<&'static str> {
        SortMethod::labels()
    }

    /// Spawn the pipeline over a chunk stream and a selection stream.
    ///
    /// Behaves as if selection index 0 was received before any explicit
    /// selection. Out-of-range indices are rejected with a warning.
    pub fn spawn(
        self,
        chunks: mpsc::Receiver<Result<String>>,
        selections: mpsc::Receiver<usize>,
    ) -> PipelineHandle {
        let capacity = self.config.channel_capacity;
        let snapshots = counter::spawn(
            chunks,
            self.config.emission_mode,
            self.config.read_policy,
            self.events.clone(),
            capacity,
        );

        let (results_tx, results_rx) = mpsc::channel(capacity);
        let (done_tx, done_rx) = mpsc::channel(capacity);

        let coordinator = Coordinator {
            latest_snapshot: None,
            latest_method: SortMethod::ALL[0],
            generation: 0,
            pending: 0,
            events: self.events,
            backend: self.backend,
            done_tx,
            results_tx,
        };

        let task = tokio::spawn(coordinator.run(snapshots, selections, done_rx));

        PipelineHandle {
            results: results_rx,
            task,
        }
    }
}

/// Single-writer coordinator state
struct Coordinator {
    latest_snapshot: Option<Snapshot>,
    latest_method: SortMethod,
    /// Generation of the most recently launched sort (0 = none yet)
    generation: u64,
    /// Launched sorts whose completion has not been applied yet
    pending: usize,
    events: EventBus,
    backend: SharedSortBackend,
    done_tx: mpsc::Sender<SortOutcome>,
    results_tx: mpsc::Sender<OrderedResult>,
}

impl Coordinator {
    async fn run(
        mut self,
        mut snapshots: mpsc::Receiver<Result<Snapshot>>,
        mut selections: mpsc::Receiver<usize>,
        mut done_rx: mpsc::Receiver<SortOutcome>,
    ) -> Result<()> {
        let mut snapshots_open = true;
        let mut selections_open = true;

        loop {
            if !snapshots_open && !selections_open && self.pending == 0 {
                break;
            }

            tokio::select! {
                biased;

                snapshot = snapshots.recv(), if snapshots_open => match snapshot {
                    Some(Ok(snapshot)) => {
                        self.latest_snapshot = Some(snapshot);
                        self.launch_current();
                    }
                    Some(Err(err)) => {
                        // Strict-policy terminal failure: the result
                        // stream closes with no further emissions
                        info!("pipeline run terminated by source failure");
                        return Err(err);
                    }
                    None => snapshots_open = false,
                },

                selection = selections.recv(), if selections_open => match selection {
                    Some(index) => self.apply_selection(index),
                    None => selections_open = false,
                },

                outcome = done_rx.recv() => {
                    if let Some(outcome) = outcome {
                        if !self.deliver(outcome).await {
                            // Presentation side hung up; stop quietly
                            return Ok(());
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Launch a sort for the latest (snapshot, method) pair, if a
    /// snapshot exists yet
    fn launch_current(&mut self) {
        let Some(snapshot) = self.latest_snapshot.clone() else {
            return;
        };

        self.generation += 1;
        self.pending += 1;

        let request = SortRequest {
            generation: self.generation,
            snapshot,
            method: self.latest_method,
        };
        debug!(
            generation = request.generation,
            method = %request.method,
            "launching sort"
        );
        sorter::announce_launch(&self.events, &request);
        self.backend.launch(request, self.done_tx.clone());
    }

    fn apply_selection(&mut self, index: usize) {
        match SortMethod::from_index(index) {
            Some(method) => {
                self.latest_method = method;
                self.launch_current();
            }
            None => {
                warn!(index, "selection index out of range, ignoring");
                self.events.emit_lossy(PipelineEvent::SelectionRejected {
                    index,
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    /// Apply one completion. Returns false when the result receiver is
    /// gone and the run should stop.
    async fn deliver(&mut self, outcome: SortOutcome) -> bool {
        self.pending -= 1;

        if outcome.generation != self.generation {
            debug!(
                generation = outcome.generation,
                latest = self.generation,
                "dropping superseded sort result"
            );
            self.events.emit_lossy(PipelineEvent::SortSuperseded {
                generation: outcome.generation,
                latest_generation: self.generation,
                timestamp: chrono::Utc::now(),
            });
            return true;
        }

        self.events.emit_lossy(PipelineEvent::SortCompleted {
            method: outcome.method,
            generation: outcome.generation,
            timestamp: chrono::Utc::now(),
        });
        self.results_tx.send(outcome.rows).await.is_ok()
    }
}
