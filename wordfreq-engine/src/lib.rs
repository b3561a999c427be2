//! # Wordfreq Engine Library
//!
//! Word-frequency pipeline: streamed text ingestion, incremental
//! frequency aggregation, and cancellable asynchronous re-sorting with
//! latest-selection-wins delivery.
//!
//! **Architecture:** channel-wired task pipeline. One aggregation task
//! folds chunks sequentially into an owned frequency table; a coordinator
//! task joins the latest snapshot with the latest sort selection and
//! launches generation-tagged sort work on blocking workers, delivering
//! only the result for the most recently requested pair.

pub mod config;
pub mod counter;
pub mod pipeline;
pub mod reader;
pub mod sorter;
pub mod tokenizer;

pub use pipeline::{Pipeline, PipelineHandle};
pub use wordfreq_common::{Error, Result};
