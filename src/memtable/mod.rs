//! MemTable Module
//!
//! In-memory index over every key the log holds.
//!
//! ## Responsibilities
//! - O(1) average point lookups
//! - Upsert and existence checks, so either duplicate policy can be built on top
//! - Byte-for-byte prefix scans (linear in table size)
//! - Track approximate size for stats
//!
//! ## Data Structure Choice
//! `HashMap<Bytes, Bytes>` with no internal locking:
//! - The engine already serializes every operation behind one Mutex
//! - `Bytes` values are reference counted, so reads hand out cheap clones
//! - No ordering is promised, so no tree is needed

mod table;

pub use table::MemTable;
