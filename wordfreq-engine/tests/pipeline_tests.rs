//! Pipeline integration tests
//!
//! Exercises the coordinator end-to-end over channel collaborators. The
//! supersession tests substitute a manual sort backend that holds
//! completions until released, so latest-wins delivery is verified
//! without timing assumptions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use wordfreq_common::events::{EventBus, PipelineEvent};
use wordfreq_common::{Error, OrderedResult, SortMethod, WordCount};
use wordfreq_engine::config::EngineConfig;
use wordfreq_engine::counter::{EmissionMode, ReadPolicy};
use wordfreq_engine::pipeline::Pipeline;
use wordfreq_engine::reader;
use wordfreq_engine::sorter::{SortBackend, SortOutcome, SortRequest};

const WAIT: Duration = Duration::from_secs(5);

fn items(pairs: &[(&str, u64)]) -> Vec<WordCount> {
    pairs
        .iter()
        .map(|(word, count)| WordCount::new(*word, *count))
        .collect()
}

fn test_config() -> EngineConfig {
    EngineConfig {
        channel_capacity: 16,
        ..EngineConfig::default()
    }
}

async fn collect(mut rx: mpsc::Receiver<OrderedResult>) -> Vec<OrderedResult> {
    let mut out = Vec::new();
    while let Some(rows) = timeout(WAIT, rx.recv()).await.expect("results stalled") {
        out.push(rows);
    }
    out
}

/// Sort backend that records launches and only completes them on demand
#[derive(Default)]
struct ManualSortBackend {
    launches: Mutex<Vec<(SortRequest, mpsc::Sender<SortOutcome>)>>,
}

impl SortBackend for ManualSortBackend {
    fn launch(&self, request: SortRequest, done_tx: mpsc::Sender<SortOutcome>) {
        self.launches.lock().unwrap().push((request, done_tx));
    }
}

impl ManualSortBackend {
    fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    fn method_of(&self, index: usize) -> SortMethod {
        self.launches.lock().unwrap()[index].0.method
    }

    /// Wait until at least `n` sorts have been launched
    async fn wait_for_launches(&self, n: usize) {
        timeout(WAIT, async {
            while self.launch_count() < n {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "expected {n} launches, saw {} before timeout",
                self.launch_count()
            )
        });
    }

    /// Release the completion for launch `index`
    async fn complete(&self, index: usize) {
        let (request, done_tx) = {
            let launches = self.launches.lock().unwrap();
            launches[index].clone()
        };
        let mut rows = request.snapshot.to_items();
        request.method.sort(&mut rows);
        done_tx
            .send(SortOutcome {
                generation: request.generation,
                method: request.method,
                rows,
            })
            .await
            .expect("coordinator gone while completing sort");
    }
}

// ================================================================================================
// Selection defaults and explicit selection
// ================================================================================================

#[tokio::test]
async fn test_no_selection_defaults_to_by_frequency() {
    // Selection stream emits nothing before the first snapshot arrives
    let events = EventBus::new(16);
    let chunks = reader::from_text("yes\nyes\nno", events.clone(), 16);
    let (selection_tx, selection_rx) = mpsc::channel::<usize>(8);
    drop(selection_tx);

    let handle = Pipeline::new(test_config(), events).spawn(chunks, selection_rx);
    let results = collect(handle.results).await;

    assert_eq!(results, vec![items(&[("Yes", 2), ("No", 1)])]);
    handle.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_explicit_selection_sorts_alphabetically() {
    let events = EventBus::new(16);
    let chunks = reader::from_text("yes\nyes\nno", events.clone(), 16);
    let (selection_tx, selection_rx) = mpsc::channel(8);

    // Queue the selection before the pipeline starts; it must apply to
    // the first delivered view
    selection_tx.send(1).await.unwrap();
    drop(selection_tx);

    let handle = Pipeline::new(test_config(), events).spawn(chunks, selection_rx);
    let results = collect(handle.results).await;

    assert_eq!(results, vec![items(&[("No", 1), ("Yes", 2)])]);
}

#[tokio::test]
async fn test_full_text_by_frequency_with_deterministic_ties() {
    let events = EventBus::new(16);
    let chunks = reader::from_text(
        "Do you quarrel, sir?\nQuarrel, sir? No, sir.",
        events.clone(),
        16,
    );
    let (selection_tx, selection_rx) = mpsc::channel::<usize>(8);
    drop(selection_tx);

    let handle = Pipeline::new(test_config(), events).spawn(chunks, selection_rx);
    let results = collect(handle.results).await;

    assert_eq!(
        results,
        vec![items(&[
            ("Sir", 3),
            ("Quarrel", 2),
            ("Do", 1),
            ("No", 1),
            ("You", 1),
        ])]
    );
}

// ================================================================================================
// Latest-wins supersession
// ================================================================================================

#[tokio::test]
async fn test_rapid_selection_switch_delivers_only_second() {
    let backend = Arc::new(ManualSortBackend::default());
    let events = EventBus::new(16);
    let mut event_rx = events.subscribe();

    let chunks = reader::from_text("yes\nyes\nno", events.clone(), 16);
    let (selection_tx, selection_rx) = mpsc::channel(8);

    let handle = Pipeline::with_backend(test_config(), events, backend.clone())
        .spawn(chunks, selection_rx);

    // First sort launches for the default selection
    backend.wait_for_launches(1).await;
    assert_eq!(backend.method_of(0), SortMethod::ByFrequency);

    // Switch selection twice before any sort completes
    selection_tx.send(2).await.unwrap();
    backend.wait_for_launches(2).await;
    selection_tx.send(1).await.unwrap();
    backend.wait_for_launches(3).await;
    drop(selection_tx);

    // Let every in-flight sort finish, oldest first
    backend.complete(0).await;
    backend.complete(1).await;
    backend.complete(2).await;

    let results = collect(handle.results).await;
    assert_eq!(
        results,
        vec![items(&[("No", 1), ("Yes", 2)])],
        "exactly one view, reflecting the second selection"
    );

    // Both stale completions surfaced as superseded on the bus
    let mut superseded = 0;
    while let Ok(Ok(event)) = timeout(Duration::from_millis(200), event_rx.recv()).await {
        if let PipelineEvent::SortSuperseded { .. } = event {
            superseded += 1;
        }
    }
    assert_eq!(superseded, 2);
}

#[tokio::test]
async fn test_stale_result_finishing_late_is_never_emitted() {
    let backend = Arc::new(ManualSortBackend::default());
    let events = EventBus::new(16);

    let chunks = reader::from_text("yes\nyes\nno", events.clone(), 16);
    let (selection_tx, selection_rx) = mpsc::channel(8);

    let handle = Pipeline::with_backend(test_config(), events, backend.clone())
        .spawn(chunks, selection_rx);

    backend.wait_for_launches(1).await;
    selection_tx.send(1).await.unwrap();
    backend.wait_for_launches(2).await;
    drop(selection_tx);

    // The newest pair completes first; the older sort only finishes
    // afterwards and must be discarded, not delivered out of order
    backend.complete(1).await;
    backend.complete(0).await;

    let results = collect(handle.results).await;
    assert_eq!(results, vec![items(&[("No", 1), ("Yes", 2)])]);
}

#[tokio::test]
async fn test_interactive_snapshot_churn_delivers_latest_table() {
    let backend = Arc::new(ManualSortBackend::default());
    let events = EventBus::new(16);

    let chunks = reader::from_text("quarrel sir\nquarrel no", events.clone(), 16);
    let (selection_tx, selection_rx) = mpsc::channel::<usize>(8);
    drop(selection_tx);

    let config = EngineConfig {
        emission_mode: EmissionMode::Interactive,
        ..test_config()
    };
    let handle = Pipeline::with_backend(config, events, backend.clone()).spawn(chunks, selection_rx);

    // Two per-chunk snapshots plus the final snapshot, each relaunching
    backend.wait_for_launches(3).await;
    backend.complete(0).await;
    backend.complete(1).await;
    backend.complete(2).await;

    let results = collect(handle.results).await;
    assert_eq!(
        results,
        vec![items(&[("Quarrel", 2), ("No", 1), ("Sir", 1)])],
        "only the view over the final snapshot survives the churn"
    );
}

// ================================================================================================
// Selection validation
// ================================================================================================

#[tokio::test]
async fn test_out_of_range_selection_is_ignored() {
    let backend = Arc::new(ManualSortBackend::default());
    let events = EventBus::new(16);
    let mut event_rx = events.subscribe();

    let chunks = reader::from_text("yes no", events.clone(), 16);
    let (selection_tx, selection_rx) = mpsc::channel(8);

    let handle = Pipeline::with_backend(test_config(), events, backend.clone())
        .spawn(chunks, selection_rx);

    backend.wait_for_launches(1).await;

    // Out of range: rejected, no sort launched
    selection_tx.send(99).await.unwrap();

    // A following valid selection still works
    selection_tx.send(2).await.unwrap();
    backend.wait_for_launches(2).await;
    assert_eq!(backend.method_of(1), SortMethod::ByLength);
    drop(selection_tx);

    backend.complete(0).await;
    backend.complete(1).await;

    let results = collect(handle.results).await;
    assert_eq!(results, vec![items(&[("No", 1), ("Yes", 1)])]);

    let mut rejected = false;
    while let Ok(Ok(event)) = timeout(Duration::from_millis(200), event_rx.recv()).await {
        if let PipelineEvent::SelectionRejected { index, .. } = event {
            assert_eq!(index, 99);
            rejected = true;
        }
    }
    assert!(rejected, "rejection must be observable on the event bus");
}

// ================================================================================================
// Read policies
// ================================================================================================

#[tokio::test]
async fn test_strict_source_failure_emits_no_results() {
    let events = EventBus::new(16);

    let (chunk_tx, chunk_rx) = mpsc::channel(4);
    chunk_tx
        .send(Err(Error::SourceRead("no such file".to_string())))
        .await
        .unwrap();
    drop(chunk_tx);

    let (selection_tx, selection_rx) = mpsc::channel::<usize>(8);
    drop(selection_tx);

    let handle = Pipeline::new(test_config(), events).spawn(chunk_rx, selection_rx);

    let results = collect(handle.results).await;
    assert!(results.is_empty(), "strict failure delivers no views");

    let outcome = handle.task.await.unwrap();
    assert!(matches!(outcome, Err(Error::SourceRead(_))));
}

#[tokio::test]
async fn test_lenient_source_failure_still_delivers_partial_view() {
    let events = EventBus::new(16);

    let (chunk_tx, chunk_rx) = mpsc::channel(4);
    chunk_tx.send(Ok("quarrel sir".to_string())).await.unwrap();
    chunk_tx
        .send(Err(Error::SourceRead("stream interrupted".to_string())))
        .await
        .unwrap();
    drop(chunk_tx);

    let (selection_tx, selection_rx) = mpsc::channel::<usize>(8);
    drop(selection_tx);

    let config = EngineConfig {
        read_policy: ReadPolicy::Lenient,
        ..test_config()
    };
    let handle = Pipeline::new(config, events).spawn(chunk_rx, selection_rx);

    let results = collect(handle.results).await;
    assert_eq!(results, vec![items(&[("Quarrel", 1), ("Sir", 1)])]);
    handle.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_empty_source_delivers_empty_view() {
    let events = EventBus::new(16);
    let chunks = reader::from_text("", events.clone(), 16);
    let (selection_tx, selection_rx) = mpsc::channel::<usize>(8);
    drop(selection_tx);

    let handle = Pipeline::new(test_config(), events).spawn(chunks, selection_rx);
    let results = collect(handle.results).await;

    assert_eq!(results, vec![Vec::<WordCount>::new()]);
}
