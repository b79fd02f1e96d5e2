//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{KvError, Result};
use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for PrefixKV
///
/// One acceptor (the thread calling `run`) pushes accepted streams into a
/// bounded channel; `worker_threads` workers each serve one connection at a
/// time. When the channel is full the acceptor blocks, which applies
/// backpressure to new clients.
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
}

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stop accepting; `run` returns once in-flight connections finish
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the listen address (idempotent)
    ///
    /// Returns the bound address, useful with port 0.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            KvError::Network(format!("cannot bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address the server is bound to, if any
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        self.config.validate()?;
        let addr = self.bind()?;
        tracing::info!(
            "Listening on {} with {} workers",
            addr,
            self.config.worker_threads
        );

        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_pending_connections);
        let workers = self.spawn_workers(rx)?;

        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| KvError::Network("listener not bound".to_string()))?;

        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    tracing::trace!("Accepted {}", peer);
                    if tx.send(stream).is_err() {
                        tracing::error!("All workers exited; stopping acceptor");
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        // Closing the channel lets each worker drain and exit
        drop(tx);
        let mut panicked = 0;
        for worker in workers {
            if worker.join().is_err() {
                panicked += 1;
            }
        }

        tracing::info!("Server on {} stopped", addr);
        if panicked > 0 {
            return Err(KvError::Network(format!("{} worker(s) panicked", panicked)));
        }
        Ok(())
    }

    fn spawn_workers(&self, rx: Receiver<TcpStream>) -> Result<Vec<JoinHandle<()>>> {
        let mut workers = Vec::with_capacity(self.config.worker_threads);

        for id in 0..self.config.worker_threads {
            let rx = rx.clone();
            let engine = Arc::clone(&self.engine);
            let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

            let handle = thread::Builder::new()
                .name(format!("prefixkv-worker-{}", id))
                .spawn(move || {
                    for stream in rx.iter() {
                        serve(stream, Arc::clone(&engine), read_ms, write_ms);
                    }
                })?;
            workers.push(handle);
        }

        Ok(workers)
    }
}

fn serve(stream: TcpStream, engine: Arc<Engine>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, engine) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
    }
    if let Err(e) = connection.handle() {
        tracing::debug!("Connection {} closed with error: {}", connection.peer_addr(), e);
    }
}
