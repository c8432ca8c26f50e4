use clap::Parser;
use std::time::Duration;

use crate::blockchain::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

/// Command line / environment configuration of a node. A `.env` file is
/// loaded before parsing, so every option can also come from there.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Proof-of-work ledger node")]
pub struct Config {
    /// Interface to bind the HTTP API to.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Leading zero hex chars required by the proof-of-work.
    /// Every node of a network must use the same value.
    #[arg(
        long,
        env = "DIFFICULTY",
        default_value_t = DEFAULT_DIFFICULTY,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DIFFICULTY))
    )]
    pub difficulty: u32,

    /// Identifier credited with mining rewards (random if omitted).
    #[arg(long, env = "NODE_ID")]
    pub node_id: Option<String>,

    /// Peer registered at startup; repeat or comma-separate for several.
    #[arg(long = "peer", env = "PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Timeout for fetching a peer's chain, in milliseconds.
    #[arg(long, env = "PEER_TIMEOUT_MS", default_value_t = 5000)]
    pub peer_timeout_ms: u64,
}

impl Config {
    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    pub fn node_id(&self) -> String {
        self.node_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string())
    }
}
