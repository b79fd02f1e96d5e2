//! PrefixKV Server Binary
//!
//! Recovers the log and starts the TCP server. Ctrl+C (or SIGTERM) shuts
//! down gracefully: the log is synced and closed before exit.

use std::sync::Arc;

use clap::Parser;
use prefixkv::network::Server;
use prefixkv::{Config, DuplicatePolicy, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// PrefixKV Server
#[derive(Parser, Debug)]
#[command(name = "prefixkv-server")]
#[command(about = "Durable key-value store with prefix scans")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./prefixkv_data")]
    data_dir: String,

    /// Log file name inside the data directory
    #[arg(long, default_value = "database.log")]
    log_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "10")]
    workers: usize,

    /// Reject SET on keys that already exist instead of overwriting
    #[arg(long)]
    reject_duplicates: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,prefixkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("PrefixKV Server v{}", prefixkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let policy = if args.reject_duplicates {
        DuplicatePolicy::Reject
    } else {
        DuplicatePolicy::Overwrite
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .log_filename(&args.log_file)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .duplicate_policy(policy)
        .build();

    // Recovery finishes before the listener exists
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine ready with {} keys", engine.len());

    let mut server = Server::new(config, Arc::clone(&engine));

    // SIGINT/SIGTERM stop the accept loop; workers drain, then the log closes
    let handle = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        handle.shutdown();
    }) {
        tracing::warn!("Failed to install signal handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
    drop(server);

    if let Err(e) = Engine::close_shared(engine) {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
