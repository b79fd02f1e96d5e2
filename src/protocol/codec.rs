//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET:        key
//! - SET:        key_len (4 bytes) + key + value
//! - GET_PREFIX: prefix
//! - STAT, PING: empty
//!
//! ### Response Payloads
//! - GET:        value
//! - GET_PREFIX: count (4) + (key_len (4) + value_len (4) + key + value)*
//! - STAT:       start_ms (8) + total (8) + set (8) + get (8) + prefix (8)
//!
//! A GET_PREFIX result larger than one frame is split into several pairs
//! payloads: every frame but the last carries `MORE`, the last carries `OK`.
//! No frame, in either direction, is ever written with a payload above
//! `MAX_PAYLOAD_SIZE`.

use std::io::{Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut, Bytes};

use crate::engine::Stats;
use crate::error::{KvError, Result};
use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

const STATS_PAYLOAD_SIZE: usize = 5 * 8;

/// Count prefix of a pairs payload
const PAIRS_COUNT_SIZE: usize = 4;

/// Per-pair key_len + value_len
const PAIR_HEADER_SIZE: usize = 8;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
///
/// Fails with `KvError::Protocol` if the payload would not fit in one frame.
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let payload = match command {
        Command::Get { key } => key.clone(),
        Command::Set { key, value } => {
            let key_len = checked_len(key.len(), "SET key")?;
            let mut payload = Vec::with_capacity(4 + key.len() + value.len());
            payload.put_u32(key_len);
            payload.put_slice(key);
            payload.put_slice(value);
            payload
        }
        Command::GetPrefix { prefix } => prefix.clone(),
        Command::Stat | Command::Ping => Vec::new(),
    };

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    match cmd_type {
        0x01 => Ok(Command::Get {
            key: payload.to_vec(),
        }),
        0x02 => decode_set_command(payload),
        0x03 => Ok(Command::GetPrefix {
            prefix: payload.to_vec(),
        }),
        0x04 => expect_empty(payload, "STAT").map(|_| Command::Stat),
        0x05 => expect_empty(payload, "PING").map(|_| Command::Ping),
        _ => Err(KvError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// Decode SET command payload
fn decode_set_command(payload: &[u8]) -> Result<Command> {
    if payload.len() < 4 {
        return Err(KvError::Protocol(
            "SET command: missing key length".to_string(),
        ));
    }

    let mut cursor = payload;
    let key_len = cursor.get_u32() as usize;

    if cursor.len() < key_len {
        return Err(KvError::Protocol(format!(
            "SET command: incomplete key (expected {}, got {})",
            key_len,
            cursor.len()
        )));
    }

    let (key, value) = cursor.split_at(key_len);
    Ok(Command::Set {
        key: key.to_vec(),
        value: value.to_vec(),
    })
}

fn expect_empty(payload: &[u8], name: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(KvError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
///
/// Fails with `KvError::Protocol` if the payload would not fit in one frame.
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::AlreadyExists,
        0x03 => Status::Error,
        0x04 => Status::More,
        _ => {
            return Err(KvError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Payload helpers
// =============================================================================

/// Encode prefix scan results as a single payload
pub fn encode_pairs(pairs: &[(Bytes, Bytes)]) -> Result<Vec<u8>> {
    let body: usize = pairs.iter().map(pair_size).sum();
    let mut buf = Vec::with_capacity(PAIRS_COUNT_SIZE + body);

    buf.put_u32(checked_len(pairs.len(), "pair count")?);
    for (key, value) in pairs {
        buf.put_u32(checked_len(key.len(), "pair key")?);
        buf.put_u32(checked_len(value.len(), "pair value")?);
        buf.put_slice(key);
        buf.put_slice(value);
    }
    Ok(buf)
}

/// Encode prefix scan results as payloads of at most `limit` bytes each
///
/// Every chunk is a complete pairs payload on its own, so the receiver can
/// decode each with `decode_pairs` and concatenate. An empty result still
/// yields one (empty) chunk. Fails if a single pair cannot fit in `limit`.
pub fn encode_pairs_chunked(pairs: &[(Bytes, Bytes)], limit: usize) -> Result<Vec<Vec<u8>>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = PAIRS_COUNT_SIZE;

    for (i, pair) in pairs.iter().enumerate() {
        let needed = pair_size(pair);
        if PAIRS_COUNT_SIZE + needed > limit {
            return Err(KvError::Protocol(format!(
                "pair of {} bytes does not fit in a {} byte frame",
                needed, limit
            )));
        }
        if size + needed > limit {
            chunks.push(encode_pairs(&pairs[start..i])?);
            start = i;
            size = PAIRS_COUNT_SIZE;
        }
        size += needed;
    }

    chunks.push(encode_pairs(&pairs[start..])?);
    Ok(chunks)
}

fn pair_size((key, value): &(Bytes, Bytes)) -> usize {
    PAIR_HEADER_SIZE + key.len() + value.len()
}

/// Decode prefix scan results
pub fn decode_pairs(payload: &[u8]) -> Result<Vec<(Bytes, Bytes)>> {
    let mut cursor = payload;
    if cursor.remaining() < 4 {
        return Err(KvError::Protocol("pairs: missing count".to_string()));
    }
    let count = cursor.get_u32() as usize;

    // Each pair needs at least its 8 header bytes
    let mut pairs = Vec::with_capacity(count.min(cursor.remaining() / PAIR_HEADER_SIZE));
    for i in 0..count {
        if cursor.remaining() < PAIR_HEADER_SIZE {
            return Err(KvError::Protocol(format!("pairs: truncated header at {}", i)));
        }
        let key_len = cursor.get_u32() as usize;
        let value_len = cursor.get_u32() as usize;
        if cursor.remaining() < key_len + value_len {
            return Err(KvError::Protocol(format!("pairs: truncated body at {}", i)));
        }
        let key = cursor.copy_to_bytes(key_len);
        let value = cursor.copy_to_bytes(value_len);
        pairs.push((key, value));
    }

    if cursor.has_remaining() {
        return Err(KvError::Protocol(format!(
            "pairs: {} trailing bytes",
            cursor.remaining()
        )));
    }
    Ok(pairs)
}

/// Encode a stats snapshot
pub fn encode_stats(stats: &Stats) -> Vec<u8> {
    let start_ms = stats
        .start_time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut buf = Vec::with_capacity(STATS_PAYLOAD_SIZE);
    buf.put_u64(start_ms);
    buf.put_u64(stats.total);
    buf.put_u64(stats.set_count);
    buf.put_u64(stats.get_count);
    buf.put_u64(stats.prefix_count);
    buf
}

/// Decode a stats snapshot (start time has millisecond precision)
pub fn decode_stats(payload: &[u8]) -> Result<Stats> {
    if payload.len() != STATS_PAYLOAD_SIZE {
        return Err(KvError::Protocol(format!(
            "stats: expected {} bytes, got {}",
            STATS_PAYLOAD_SIZE,
            payload.len()
        )));
    }

    let mut cursor = payload;
    let start_time: SystemTime = UNIX_EPOCH + Duration::from_millis(cursor.get_u64());
    Ok(Stats {
        start_time,
        total: cursor.get_u64(),
        set_count: cursor.get_u64(),
        get_count: cursor.get_u64(),
        prefix_count: cursor.get_u64(),
    })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(kind: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let len = checked_len(payload.len(), "frame payload")?;
    if len > MAX_PAYLOAD_SIZE {
        return Err(KvError::Protocol(format!(
            "payload too large to send: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(kind);
    message.put_u32(len);
    message.put_slice(payload);
    Ok(message)
}

/// A length as the wire's `u32`, refusing anything that would truncate
fn checked_len(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| KvError::Protocol(format!("{} length {} exceeds u32", what, len)))
}

/// Validate header and length, returning the kind byte and payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KvError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = payload_len(&bytes[..HEADER_SIZE], what)?;
    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(KvError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

fn payload_len(header: &[u8], what: &str) -> Result<usize> {
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(KvError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one whole frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = payload_len(&header, what)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
///
/// Encoding happens before anything is written, so a refused frame leaves
/// the stream untouched.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
