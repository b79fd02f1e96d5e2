//! WAL Reader
//!
//! Handles reading records from the log file.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bytes::Bytes;

use crate::error::Result;
use super::{RecordHeader, WalEntry, HEADER_SIZE};

/// Reads records from the log file, lazily and in append order
///
/// A missing file reads as an empty log. Iteration stops at the first
/// record whose header or body runs past the end of the file; the bytes
/// from that point on are the torn tail.
pub struct WalReader {
    reader: Option<BufReader<File>>,
    file_len: u64,
    position: u64,
    truncated: bool,
    done: bool,
}

impl WalReader {
    /// Open a log file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let (reader, file_len) = match File::open(path) {
            Ok(file) => {
                let len = file.metadata()?.len();
                (Some(BufReader::new(file)), len)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (None, 0),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            reader,
            file_len,
            position: 0,
            truncated: false,
            done: false,
        })
    }

    /// Read the next record from the log
    ///
    /// `Ok(None)` at a clean end of file or at a torn tail.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        if self.done {
            return Ok(None);
        }
        let Some(reader) = self.reader.as_mut() else {
            self.done = true;
            return Ok(None);
        };

        let remaining = self.file_len - self.position;
        if remaining == 0 {
            self.done = true;
            return Ok(None);
        }
        if remaining < HEADER_SIZE as u64 {
            return Ok(self.torn());
        }

        let mut header_bytes = [0u8; HEADER_SIZE];
        if !read_or_torn(reader, &mut header_bytes)? {
            return Ok(self.torn());
        }
        let header = RecordHeader::parse(&header_bytes);

        if header.body_len() > remaining - HEADER_SIZE as u64 {
            return Ok(self.torn());
        }

        let mut key = vec![0u8; header.key_len as usize];
        let mut value = vec![0u8; header.value_len as usize];
        if !read_or_torn(reader, &mut key)? || !read_or_torn(reader, &mut value)? {
            return Ok(self.torn());
        }

        self.position += HEADER_SIZE as u64 + header.body_len();
        Ok(Some(WalEntry::new(Bytes::from(key), Bytes::from(value))))
    }

    /// Bytes covered by the records read so far
    pub fn valid_len(&self) -> u64 {
        self.position
    }

    /// Whether iteration stopped on an incomplete trailing record
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Size of the torn tail (0 unless `is_truncated`)
    pub fn discarded_bytes(&self) -> u64 {
        if self.truncated {
            self.file_len - self.position
        } else {
            0
        }
    }

    fn torn(&mut self) -> Option<WalEntry> {
        self.truncated = true;
        self.done = true;
        None
    }
}

impl Iterator for WalReader {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// `read_exact` that reports a short read as `false` instead of an error
fn read_or_torn(reader: &mut BufReader<File>, buf: &mut [u8]) -> Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}
