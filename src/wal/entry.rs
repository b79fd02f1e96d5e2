//! WAL Entry definitions
//!
//! Defines the structure and byte layout of individual log records.

use bytes::{BufMut, Bytes};

use crate::error::{KvError, Result};

/// Header size: key_len (4) + value_len (4)
pub const HEADER_SIZE: usize = 8;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    pub key: Bytes,
    pub value: Bytes,
}

/// Parsed fixed-size record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_len: u32,
    pub value_len: u32,
}

impl RecordHeader {
    /// Parse the 8 header bytes
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            key_len: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            value_len: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Number of bytes that follow the header
    pub fn body_len(&self) -> u64 {
        self.key_len as u64 + self.value_len as u64
    }
}

impl WalEntry {
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Size of this entry once framed
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.key.len() + self.value.len()
    }

    /// Serialize into a standalone buffer
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        Self::encode_into(&self.key, &self.value, &mut buf)?;
        Ok(buf)
    }

    /// Append the framed record for `key`/`value` to `buf`
    ///
    /// Fails without touching `buf` if either length overflows a `u32`.
    pub fn encode_into(key: &[u8], value: &[u8], buf: &mut Vec<u8>) -> Result<()> {
        let key_len = u32::try_from(key.len()).map_err(|_| KvError::EntryTooLarge(key.len()))?;
        let value_len =
            u32::try_from(value.len()).map_err(|_| KvError::EntryTooLarge(value.len()))?;

        buf.reserve(HEADER_SIZE + key.len() + value.len());
        buf.put_u32(key_len);
        buf.put_u32(value_len);
        buf.put_slice(key);
        buf.put_slice(value);
        Ok(())
    }
}
