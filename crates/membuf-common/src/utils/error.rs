//! Error types shared by the Membuf crates.

use thiserror::Error;

use crate::types::Attr;

/// Result alias used throughout Membuf.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by allocators and the tooling around them.
///
/// Caching layers never produce these on their own; they pass through
/// whatever the allocator that owns the memory reported.
#[derive(Error, Debug)]
pub enum Error {
    /// The allocator could not provide the requested memory.
    #[error("out of memory: requested {requested} bytes ({attr})")]
    OutOfMemory {
        /// Requested size in bytes.
        requested: usize,
        /// Attribute of the failed request.
        attr: Attr,
    },

    /// The requested size cannot be served.
    #[error("invalid allocation size: {0}")]
    InvalidSize(usize),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Malformed or inconsistent allocation trace.
    #[error("trace error: {0}")]
    Trace(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
