//! Response definitions
//!
//! Represents engine results and the responses sent to clients.

use bytes::Bytes;

use crate::engine::Stats;
use crate::error::{KvError, Result};
use super::codec::{
    decode_pairs, decode_stats, encode_pairs_chunked, encode_stats, MAX_PAYLOAD_SIZE,
};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    AlreadyExists = 0x02,
    Error = 0x03,

    /// A partial GET_PREFIX result; more frames follow
    More = 0x04,
}

/// Successful result of executing a command against the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Bytes),
    Ack,
    Entries(Vec<(Bytes, Bytes)>),
    Stats(Stats),
    Pong,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value, pairs, stats, or error message)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ALREADY_EXISTS response
    pub fn already_exists() -> Self {
        Self {
            status: Status::AlreadyExists,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Build the wire responses for an engine outcome
    ///
    /// Always at least one. Prefix results too large for one frame are split
    /// into `MORE` frames followed by a final `OK`; everything else is a
    /// single response.
    pub fn frames(result: Result<Reply>) -> Vec<Self> {
        let response = match result {
            Ok(Reply::Entries(pairs)) => return Self::pair_frames(&pairs),
            Ok(Reply::Value(value)) => Response::ok(Some(value.to_vec())),
            Ok(Reply::Ack) => Response::ok(None),
            Ok(Reply::Stats(stats)) => Response::ok(Some(encode_stats(&stats))),
            Ok(Reply::Pong) => Response::ok(Some(b"PONG".to_vec())),
            Err(KvError::NotFound) => Response::not_found(),
            Err(KvError::AlreadyExists) => Response::already_exists(),
            Err(e) => Response::error(&e.to_string()),
        };
        vec![response]
    }

    fn pair_frames(pairs: &[(Bytes, Bytes)]) -> Vec<Self> {
        let chunks = match encode_pairs_chunked(pairs, MAX_PAYLOAD_SIZE as usize) {
            Ok(chunks) => chunks,
            Err(e) => return vec![Response::error(&e.to_string())],
        };

        let last = chunks.len() - 1;
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| Response {
                status: if i == last { Status::Ok } else { Status::More },
                payload: Some(chunk),
            })
            .collect()
    }

    /// Whether more frames belong to the same reply
    pub fn is_partial(&self) -> bool {
        self.status == Status::More
    }

    /// Turn a non-OK status back into the matching error
    pub fn into_result(self) -> Result<Option<Vec<u8>>> {
        match self.status {
            Status::Ok | Status::More => Ok(self.payload),
            Status::NotFound => Err(KvError::NotFound),
            Status::AlreadyExists => Err(KvError::AlreadyExists),
            Status::Error => {
                let message = self
                    .payload
                    .map(|p| String::from_utf8_lossy(&p).into_owned())
                    .unwrap_or_default();
                Err(KvError::Network(format!("server error: {}", message)))
            }
        }
    }

    /// Interpret an OK payload as a single value
    pub fn into_value(self) -> Result<Bytes> {
        Ok(Bytes::from(self.into_result()?.unwrap_or_default()))
    }

    /// Interpret an OK payload as prefix scan results
    pub fn into_pairs(self) -> Result<Vec<(Bytes, Bytes)>> {
        match self.into_result()? {
            Some(payload) => decode_pairs(&payload),
            None => Ok(Vec::new()),
        }
    }

    /// Interpret an OK payload as engine stats
    pub fn into_stats(self) -> Result<Stats> {
        let payload = self.into_result()?.unwrap_or_default();
        decode_stats(&payload)
    }
}
