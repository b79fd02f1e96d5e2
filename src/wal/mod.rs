//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append one record per `set`, fsynced before the call returns
//! - Lazy, in-order replay for crash recovery
//! - Detect and discard a torn trailing record left by a crash
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │ Record 1                                          │
//! │ ┌─────────────┬─────────────┬───────┬─────────┐   │
//! │ │ KeyLen (4)  │ ValLen (4)  │  Key  │  Value  │   │
//! │ └─────────────┴─────────────┴───────┴─────────┘   │
//! ├───────────────────────────────────────────────────┤
//! │ Record 2                                          │
//! │ ┌─────────────┬─────────────┬───────┬─────────┐   │
//! │ │ KeyLen (4)  │ ValLen (4)  │  Key  │  Value  │   │
//! │ └─────────────┴─────────────┴───────┴─────────┘   │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! Both lengths are big-endian `u32`. There is no checksum, tag or delimiter:
//! a record is only ever recognised by reading its 8-byte header first.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{WalEntry, RecordHeader, HEADER_SIZE};
pub use writer::WalWriter;
#[cfg(test)]
pub(crate) use writer::Faults;
pub use reader::WalReader;
pub use recovery::{WalRecovery, RecoveryResult};
