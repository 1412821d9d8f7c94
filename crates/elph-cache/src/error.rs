//! Error types for elph-cache operations.

use std::io;
use thiserror::Error;

/// The error type for elph-cache operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized Result type for elph-cache operations.
pub type Result<T> = std::result::Result<T, Error>;
