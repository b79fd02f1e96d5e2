//! Error types for PrefixKV
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for PrefixKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The log could not be opened or recovered at startup
    #[error("cannot open log {}: {source}", path.display())]
    StartupIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    /// The log writer refuses appends after an earlier append failed
    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Lookup / Write Policy Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    NotFound,

    #[error("Key already exists")]
    AlreadyExists,

    /// Key or value length does not fit the 32-bit length prefix
    #[error("Entry too large: {0} bytes")]
    EntryTooLarge(usize),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// Wrap an I/O error that happened while bringing the log up
    pub(crate) fn startup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KvError::StartupIo {
            path: path.into(),
            source,
        }
    }
}
