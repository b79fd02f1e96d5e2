//! WAL Recovery
//!
//! Handles crash recovery by replaying the log.

use std::path::Path;

use crate::error::Result;
use super::{WalEntry, WalReader};

/// Handles log replay after a restart or crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records successfully replayed
    pub entries_recovered: u64,

    /// Length of the well-formed prefix of the file
    pub valid_bytes: u64,

    /// Bytes of the torn trailing record, if any
    pub discarded_bytes: u64,

    /// Whether a partial trailing record was found
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Replay every complete record into `apply`, in append order
    ///
    /// A torn tail is not an error: it is reported in the result and logged.
    /// The file itself is left untouched.
    pub fn recover<F>(path: &Path, mut apply: F) -> Result<RecoveryResult>
    where
        F: FnMut(WalEntry),
    {
        let mut reader = WalReader::open(path)?;
        let mut entries_recovered = 0u64;

        while let Some(entry) = reader.next_entry()? {
            apply(entry);
            entries_recovered += 1;
        }

        let result = RecoveryResult {
            entries_recovered,
            valid_bytes: reader.valid_len(),
            discarded_bytes: reader.discarded_bytes(),
            was_truncated: reader.is_truncated(),
        };

        if result.was_truncated {
            tracing::warn!(
                "Torn record at end of {}: discarding {} bytes after offset {}",
                path.display(),
                result.discarded_bytes,
                result.valid_bytes
            );
        }

        Ok(result)
    }

    /// Scan a log file and report its stats without applying anything
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::recover(path, |_| {})
    }
}
