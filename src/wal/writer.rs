//! WAL Writer
//!
//! Handles appending records to the log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};
use super::WalEntry;

/// Appends records to the log file
///
/// The file handle is opened once and held until `close`. Every `append`
/// is fsynced before it returns. After a failed append the writer is
/// disabled: a failed fsync may have lost pages and a failed rollback may
/// have left a partial record, so nothing written afterwards could be
/// trusted to replay.
pub struct WalWriter {
    file: File,
    path: PathBuf,

    /// Length of the file made of whole, durable records
    offset: u64,

    records_written: u64,

    /// Set by the first failed append; never cleared
    failed: bool,

    /// Reused encode buffer
    scratch: Vec<u8>,

    #[cfg(test)]
    faults: Faults,
}

/// Failures the unit tests can force on the next append
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Faults {
    /// Write the bytes, then report the fsync as failed
    pub fail_sync: bool,

    /// Leave the partial record in place instead of truncating it
    pub fail_rollback: bool,
}

impl WalWriter {
    /// Open or create a log file for appending
    ///
    /// Any failure here is a startup failure: there is no degraded mode.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| KvError::startup(path, e))?;

        let offset = file
            .metadata()
            .map_err(|e| KvError::startup(path, e))?
            .len();

        Ok(Self {
            file,
            path: path.to_path_buf(),
            offset,
            records_written: 0,
            failed: false,
            scratch: Vec::new(),
            #[cfg(test)]
            faults: Faults::default(),
        })
    }

    /// Append a record and force it to stable storage
    ///
    /// Returns the offset the record starts at. The first I/O failure is
    /// returned as `KvError::Io`; every append after it fails with
    /// `KvError::WalWrite`.
    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<u64> {
        self.ensure_usable()?;

        self.scratch.clear();
        WalEntry::encode_into(key, value, &mut self.scratch)?;

        let start = self.offset;
        if let Err(e) = self.write_durably() {
            self.failed = true;
            let rolled_back = self.rollback(start);
            tracing::error!(
                "Append to {} failed at offset {}: {} (partial record removed: {}); log disabled",
                self.path.display(),
                start,
                e,
                rolled_back
            );
            return Err(e.into());
        }

        self.offset += self.scratch.len() as u64;
        self.records_written += 1;
        Ok(start)
    }

    /// Drop everything past `len` (a torn tail found during recovery)
    pub fn discard_tail(&mut self, len: u64) -> Result<()> {
        self.file
            .set_len(len)
            .and_then(|_| self.file.sync_all())
            .map_err(|e| KvError::startup(&self.path, e))?;
        self.offset = len;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.ensure_usable()?;
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Flush, sync and release the file handle
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }

    /// Current durable length of the log
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Records appended through this writer
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Whether an earlier append failed and the writer is disabled
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn inject(&mut self, faults: Faults) {
        self.faults = faults;
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.failed {
            return Err(KvError::WalWrite(format!(
                "{} is disabled after a failed append",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn write_durably(&mut self) -> io::Result<()> {
        self.file.write_all(&self.scratch)?;

        #[cfg(test)]
        if self.faults.fail_sync {
            return Err(io::Error::new(io::ErrorKind::Other, "injected fsync failure"));
        }

        self.file.sync_data()
    }

    /// Cut a partially written record back to `offset`
    fn rollback(&mut self, offset: u64) -> bool {
        #[cfg(test)]
        if self.faults.fail_rollback {
            return false;
        }

        match self.file.set_len(offset) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "Failed to roll back log {} to offset {}: {}",
                    self.path.display(),
                    offset,
                    e
                );
                false
            }
        }
    }
}
