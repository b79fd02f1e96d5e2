//! MemTable implementation
//!
//! HashMap-based table, rebuilt from the log at startup.

use std::collections::HashMap;

use bytes::Bytes;

/// In-memory table of every live key
#[derive(Debug, Default)]
pub struct MemTable {
    data: HashMap<Bytes, Bytes>,

    /// Approximate size in bytes (keys + values)
    size: usize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.get(key).cloned()
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &[u8]) -> bool {
        self.data.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one
    pub fn upsert(&mut self, key: Bytes, value: Bytes) -> Option<Bytes> {
        let (key_len, value_len) = (key.len(), value.len());
        let previous = self.data.insert(key, value);

        match &previous {
            Some(old) => self.size = self.size - old.len() + value_len,
            None => self.size += key_len + value_len,
        }
        previous
    }

    /// Every entry whose key starts with `prefix`, in no particular order
    ///
    /// An empty prefix matches every key.
    pub fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Bytes, Bytes)> {
        self.data
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.data.iter()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Approximate size in bytes
    pub fn size(&self) -> usize {
        self.size
    }
}
