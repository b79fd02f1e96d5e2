//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Set = 0x02,
    GetPrefix = 0x03,
    Stat = 0x04,
    Ping = 0x05,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Store a key-value pair
    Set { key: Vec<u8>, value: Vec<u8> },

    /// List every pair whose key starts with `prefix`
    GetPrefix { prefix: Vec<u8> },

    /// Request counters
    Stat,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::GetPrefix { .. } => CommandType::GetPrefix,
            Command::Stat => CommandType::Stat,
            Command::Ping => CommandType::Ping,
        }
    }
}
