//! Blocking TCP client
//!
//! Speaks the binary protocol to a running server.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::engine::Stats;
use crate::error::{KvError, Result};
use crate::protocol::{decode_pairs, read_response, write_command, Command, Response};

/// Client connection to a PrefixKV server
///
/// Once a read or write fails partway, the stream position is unknown and
/// the client refuses further calls; reconnect instead.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,

    /// Set after an error that may have left the stream out of step
    broken: bool,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| KvError::Network(format!("connect failed: {}", e)))?;
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
            broken: false,
        })
    }

    /// Fetch a value (`KvError::NotFound` if absent)
    pub fn get(&mut self, key: &[u8]) -> Result<Bytes> {
        self.call(Command::Get { key: key.to_vec() })?.into_value()
    }

    /// Store a value (`KvError::AlreadyExists` under the reject policy)
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.call(Command::Set {
            key: key.to_vec(),
            value: value.to_vec(),
        })?
        .into_result()
        .map(|_| ())
    }

    /// All pairs whose key starts with `prefix`
    ///
    /// Collects every `MORE` frame up to the final `OK`.
    pub fn get_prefix(&mut self, prefix: &[u8]) -> Result<Vec<(Bytes, Bytes)>> {
        self.send(Command::GetPrefix {
            prefix: prefix.to_vec(),
        })?;

        let mut pairs = Vec::new();
        loop {
            let response = self.recv()?;
            let partial = response.is_partial();
            if let Some(payload) = response.into_result()? {
                pairs.extend(self.guard(decode_pairs(&payload))?);
            }
            if !partial {
                return Ok(pairs);
            }
        }
    }

    /// Server counters
    pub fn stat(&mut self) -> Result<Stats> {
        self.call(Command::Stat)?.into_stats()
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        self.call(Command::Ping)?.into_result().map(|_| ())
    }

    /// Send one command and wait for its single-frame response
    pub fn call(&mut self, command: Command) -> Result<Response> {
        self.send(command)?;
        let response = self.recv()?;
        if response.is_partial() {
            self.broken = true;
            return Err(KvError::Protocol(
                "unexpected MORE frame for a single-frame reply".to_string(),
            ));
        }
        Ok(response)
    }

    /// Whether an earlier error left this connection unusable
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    fn send(&mut self, command: Command) -> Result<()> {
        if self.broken {
            return Err(KvError::Network(
                "connection unusable after an earlier protocol error".to_string(),
            ));
        }
        let result = write_command(&mut self.writer, &command);
        // An encode refusal writes nothing; anything else may have
        if let Err(KvError::Io(_)) = result {
            self.broken = true;
        }
        result
    }

    fn recv(&mut self) -> Result<Response> {
        let result = read_response(&mut self.reader);
        self.guard(result)
    }

    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.broken = true;
        }
        result
    }
}
