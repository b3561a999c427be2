//! Event types for the wordfreq pipeline
//!
//! The pipeline uses hybrid communication:
//! - **EventBus** (tokio::broadcast): one-to-many diagnostic events
//! - **Data channels** (tokio::mpsc): chunk / snapshot / result streams
//!
//! Diagnostic events are the operator-visible side channel: absorbed
//! source failures and superseded sorts surface here rather than in the
//! result stream.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::SortMethod;

/// Pipeline event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Ingestion of a text source began
    IngestStarted {
        source: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new frequency snapshot was folded
    SnapshotUpdated {
        distinct_words: usize,
        total_occurrences: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The chunk stream completed
    IngestCompleted {
        chunks: u64,
        distinct_words: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The text source failed to read
    ///
    /// `absorbed` is true under the lenient read policy (the pipeline
    /// continued with the input seen so far), false when the failure
    /// terminated the run.
    SourceReadFailed {
        error: String,
        absorbed: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A sort was launched for a (snapshot, method) pair
    SortStarted {
        method: SortMethod,
        generation: u64,
        items: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A sort result was delivered downstream
    SortCompleted {
        method: SortMethod,
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A sort finished after its pair was superseded; result dropped
    SortSuperseded {
        generation: u64,
        latest_generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A selection index outside the enumeration was ignored
    SelectionRejected {
        index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PipelineEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PipelineEvent::IngestStarted { .. } => "IngestStarted",
            PipelineEvent::SnapshotUpdated { .. } => "SnapshotUpdated",
            PipelineEvent::IngestCompleted { .. } => "IngestCompleted",
            PipelineEvent::SourceReadFailed { .. } => "SourceReadFailed",
            PipelineEvent::SortStarted { .. } => "SortStarted",
            PipelineEvent::SortCompleted { .. } => "SortCompleted",
            PipelineEvent::SortSuperseded { .. } => "SortSuperseded",
            PipelineEvent::SelectionRejected { .. } => "SelectionRejected",
        }
    }
}

/// Broadcast bus for pipeline diagnostic events
///
/// Wraps `tokio::sync::broadcast`. Subscribers only receive events
/// emitted after subscription; with no subscribers, `emit` returns an
/// error while `emit_lossy` silently drops.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: PipelineEvent,
    ) -> Result<usize, broadcast::error::SendError<PipelineEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
