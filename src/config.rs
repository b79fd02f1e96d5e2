//! Configuration for PrefixKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{KvError, Result};

/// Main configuration for a PrefixKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the log file
    /// Internal structure:
    ///   {data_dir}/
    ///     └── database.log     (append-only log)
    pub data_dir: PathBuf,

    /// File name of the log inside `data_dir`
    pub log_filename: String,

    /// What `set` does when the key is already stored
    pub duplicate_policy: DuplicatePolicy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of threads serving connections
    pub worker_threads: usize,

    /// Accepted connections allowed to wait for a free worker
    pub max_pending_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

/// Behaviour of `set` for a key that is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Replace the stored value
    #[default]
    Overwrite,

    /// Fail with `AlreadyExists` and leave the store untouched
    Reject,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./prefixkv_data"),
            log_filename: "database.log".to_string(),
            duplicate_policy: DuplicatePolicy::Overwrite,
            listen_addr: "127.0.0.1:50051".to_string(),
            worker_threads: 10,
            max_pending_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the log file
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_filename)
    }

    /// Check values that would otherwise fail later at runtime
    pub fn validate(&self) -> Result<()> {
        if self.log_filename.is_empty() {
            return Err(KvError::Config("log_filename must not be empty".to_string()));
        }
        if self.worker_threads == 0 {
            return Err(KvError::Config("worker_threads must be at least 1".to_string()));
        }
        if self.max_pending_connections == 0 {
            return Err(KvError::Config(
                "max_pending_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the log file name
    pub fn log_filename(mut self, name: impl Into<String>) -> Self {
        self.config.log_filename = name.into();
        self
    }

    /// Set the duplicate-key policy
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_policy = policy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the pending connection queue capacity
    pub fn max_pending_connections(mut self, count: usize) -> Self {
        self.config.max_pending_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_path(), PathBuf::from("./prefixkv_data/database.log"));
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = Config::builder().worker_threads(0).build();
        assert!(matches!(config.validate(), Err(KvError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_log_name() {
        let config = Config::builder().log_filename("").build();
        assert!(matches!(config.validate(), Err(KvError::Config(_))));
    }
}
