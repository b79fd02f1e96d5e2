//! Engine Module
//!
//! The storage engine that coordinates the log and the table.
//!
//! ## Responsibilities
//! - Replay the log into the table before serving anything
//! - Write the log first, then the table, on every `set`
//! - Enforce the duplicate-key policy
//! - Count requests per operation type

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::{Config, DuplicatePolicy};
use crate::error::{KvError, Result};
use crate::memtable::MemTable;
use crate::protocol::{Command, Reply};
use crate::wal::{RecoveryResult, WalRecovery, WalWriter};

/// Snapshot of the request counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub start_time: SystemTime,
    pub total: u64,
    pub set_count: u64,
    pub get_count: u64,
    pub prefix_count: u64,
}

/// Process-lifetime request counters, never persisted
#[derive(Debug, Default)]
struct Counters {
    total: u64,
    set: u64,
    get: u64,
    prefix: u64,
}

/// Everything guarded by the engine lock
struct State {
    wal: WalWriter,
    table: MemTable,
    counters: Counters,
}

/// The main storage engine
///
/// ## Concurrency Model: one exclusive lock
///
/// `get`, `set`, `get_prefix` and `stat` each hold `state` for their whole
/// body, so the log file and the table never disagree and every execution
/// is equivalent to some sequential order. There is no lock-free read path.
///
/// ## Ordering
///
/// `set` appends and fsyncs the record before the table changes. After a
/// crash, the table rebuilt from the log is never behind an acknowledged
/// write and never ahead of the log.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// When this engine finished recovery
    start_time: SystemTime,

    /// Outcome of the startup replay
    recovery: RecoveryResult,

    state: Mutex<State>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Open (or create) the log for appending
    /// 3. Replay the log into a fresh table
    /// 4. Cut off a torn trailing record, if any
    /// 5. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)
            .map_err(|e| KvError::startup(&config.data_dir, e))?;

        let log_path = config.log_path();
        let mut wal = WalWriter::open(&log_path)?;

        let mut table = MemTable::new();
        let recovery = WalRecovery::recover(&log_path, |entry| {
            table.upsert(entry.key, entry.value);
        })
        .map_err(|e| match e {
            KvError::Io(source) => KvError::startup(&log_path, source),
            other => other,
        })?;

        // New records must not land behind a half-written one
        if recovery.was_truncated {
            wal.discard_tail(recovery.valid_bytes)?;
        }

        tracing::info!(
            "Recovered {} records ({} keys, {} bytes) from {}",
            recovery.entries_recovered,
            table.len(),
            table.size(),
            log_path.display()
        );

        Ok(Self {
            config,
            start_time: SystemTime::now(),
            recovery,
            state: Mutex::new(State {
                wal,
                table,
                counters: Counters::default(),
            }),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Get { key } => self.get(&key).map(Reply::Value),
            Command::Set { key, value } => {
                self.set(&key, &value)?;
                Ok(Reply::Ack)
            }
            Command::GetPrefix { prefix } => Ok(Reply::Entries(self.get_prefix(&prefix))),
            Command::Stat => Ok(Reply::Stats(self.stat())),
            Command::Ping => Ok(Reply::Pong),
        }
    }

    /// Get a value by key
    ///
    /// Returns `KvError::NotFound` for an unknown key. Counted only on success.
    pub fn get(&self, key: &[u8]) -> Result<Bytes> {
        let mut state = self.state.lock();

        let value = state.table.get(key).ok_or(KvError::NotFound)?;
        state.counters.total += 1;
        state.counters.get += 1;
        Ok(value)
    }

    /// Store a key-value pair
    ///
    /// Steps (all under the engine lock):
    /// 1. Apply the duplicate policy
    /// 2. Append to the log and fsync
    /// 3. Update the table
    ///
    /// If step 1 or 2 fails nothing changes and nothing is counted.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut state = self.state.lock();

        if self.config.duplicate_policy == DuplicatePolicy::Reject && state.table.contains(key) {
            return Err(KvError::AlreadyExists);
        }

        state.wal.append(key, value)?;
        state
            .table
            .upsert(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value));

        state.counters.total += 1;
        state.counters.set += 1;
        Ok(())
    }

    /// Every stored pair whose key starts with `prefix`
    ///
    /// An empty result is a normal answer. Order is unspecified.
    pub fn get_prefix(&self, prefix: &[u8]) -> Vec<(Bytes, Bytes)> {
        let mut state = self.state.lock();

        let pairs = state.table.scan_prefix(prefix);
        state.counters.total += 1;
        state.counters.prefix += 1;
        pairs
    }

    /// Snapshot the counters (not counted itself)
    pub fn stat(&self) -> Stats {
        let state = self.state.lock();

        Stats {
            start_time: self.start_time,
            total: state.counters.total,
            set_count: state.counters.set,
            get_count: state.counters.get,
            prefix_count: state.counters.prefix,
        }
    }

    /// Close the engine gracefully
    ///
    /// Flushes and syncs the log, then releases the file handle.
    pub fn close(self) -> Result<()> {
        let state = self.state.into_inner();
        state.wal.close()?;
        tracing::info!("Closed log {}", self.config.log_path().display());
        Ok(())
    }

    /// Close an engine that was shared with the server's workers
    ///
    /// Succeeds only once every other handle is gone; otherwise the log is
    /// left to be closed on drop and an error is returned.
    pub fn close_shared(engine: Arc<Engine>) -> Result<()> {
        match Arc::try_unwrap(engine) {
            Ok(engine) => engine.close(),
            Err(shared) => Err(KvError::Config(format!(
                "engine still has {} other handles; cannot close",
                Arc::strong_count(&shared) - 1
            ))),
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.config.log_path()
    }

    /// What the startup replay found
    pub fn recovery(&self) -> RecoveryResult {
        self.recovery
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.state.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
