//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GET         - Payload: key
//! - 0x02: SET         - Payload: key_len (4) + key + value
//! - 0x03: GET_PREFIX  - Payload: prefix
//! - 0x04: STAT        - Payload: empty
//! - 0x05: PING        - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ALREADY_EXISTS
//! - 0x03: ERROR
//! - 0x04: MORE (partial GET_PREFIX result, more frames follow)

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Reply, Response, Status};
pub use codec::{
    decode_command, decode_pairs, decode_response, decode_stats, encode_command, encode_pairs,
    encode_pairs_chunked, encode_response, encode_stats, read_command, read_response,
    write_command, write_response,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
