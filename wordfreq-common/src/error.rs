//! Common error types for wordfreq

use thiserror::Error;

/// Common result type for wordfreq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the wordfreq crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Text source could not be fully read
    #[error("Source read error: {0}")]
    SourceRead(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Selection index outside the sort method enumeration
    #[error("Invalid selection index {index} (expected 0..{len})")]
    InvalidSelection { index: usize, len: usize },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
