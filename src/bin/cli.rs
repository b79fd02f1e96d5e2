//! PrefixKV CLI Client
//!
//! Command-line interface for interacting with PrefixKV.

use std::process::ExitCode;
use std::time::UNIX_EPOCH;

use clap::{Parser, Subcommand};
use prefixkv::network::Client;
use prefixkv::KvError;

/// PrefixKV CLI
#[derive(Parser, Debug)]
#[command(name = "prefixkv-cli")]
#[command(about = "CLI for PrefixKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// List all pairs whose key starts with a prefix
    Prefix {
        /// The prefix to match (empty matches everything)
        #[arg(default_value = "")]
        prefix: String,
    },

    /// Show server request counters
    Stat,

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(KvError::NotFound) => {
            eprintln!("(not found)");
            ExitCode::from(1)
        }
        Err(KvError::AlreadyExists) => {
            eprintln!("(already exists)");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> prefixkv::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => {
            let value = client.get(key.as_bytes())?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::Set { key, value } => {
            client.set(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Prefix { prefix } => {
            let mut pairs = client.get_prefix(prefix.as_bytes())?;
            pairs.sort();
            for (key, value) in pairs {
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(&key),
                    String::from_utf8_lossy(&value)
                );
            }
        }
        Commands::Stat => {
            let stats = client.stat()?;
            let started = stats
                .start_time
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            println!("start_time:   {}", started);
            println!("total:        {}", stats.total);
            println!("set_count:    {}", stats.set_count);
            println!("get_count:    {}", stats.get_count);
            println!("prefix_count: {}", stats.prefix_count);
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}
