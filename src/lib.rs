//! # PrefixKV
//!
//! A durable, single-node key-value store with:
//! - An append-only, length-prefixed log fsynced on every write
//! - Crash recovery that tolerates a torn trailing record
//! - An in-memory hash table with byte-prefix scans
//! - One engine-wide lock, so every operation is serializable
//! - A small TCP binding for remote clients
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (acceptor + worker threads)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        get / set / get_prefix / stat  (one Mutex)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │ ───────▶ │  MemTable   │
//!   │  (Append)   │  replay  │  (HashMap)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod memtable;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, DuplicatePolicy};
pub use engine::{Engine, Stats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PrefixKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
