//! # Wordfreq Common Library
//!
//! Shared code for the wordfreq workspace including:
//! - Core value types (WordCount, FrequencyTable, SortMethod)
//! - Event types (PipelineEvent enum) and the event bus
//! - Common error types

pub mod error;
pub mod events;
pub mod types;

pub use error::{Error, Result};
pub use types::{FrequencyTable, ListRow, OrderedResult, Snapshot, SortMethod, WordCount};
