use crate::blockchain::{Block, Ledger, ProofOfWork};
use crate::consensus::HttpChainSource;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

/// Shared application state: one ledger per node plus what the handlers need
/// to mine and to talk to peers.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
    pub node_id: String,
    pub chain_source: HttpChainSource,
    /// Raised on shutdown to abandon in-flight proof searches.
    pub mining_cancel: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(pow: ProofOfWork, node_id: String, chain_source: HttpChainSource) -> Self {
        Self {
            ledger: Mutex::new(Ledger::new(pow)),
            node_id,
            chain_source,
            mining_cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct PendingResponse<'a> {
    pub size: usize,
    pub transactions: &'a [Transaction],
}

/* ---------- Nodes API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct RegisterNodesResponse {
    pub message: &'static str,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub total_nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    pub replaced: bool,
    pub chain: Vec<Block>,
}
