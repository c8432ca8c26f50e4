use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::hash::{canonical_json, sha256_hex};
use super::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::transaction::Transaction;

/// A single block in the chain holding the transactions committed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,     // 1-based position in the chain
    pub timestamp: f64, // Unix seconds (UTC), display only
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        Self::new(
            1,
            Vec::new(),
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH.to_string(),
        )
    }

    /// Create a block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp: now_secs(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// SHA-256 (hex) of the block's canonical JSON form. Every field takes
    /// part, so any mutation changes the digest.
    pub fn compute_hash(&self) -> String {
        let preimage = canonical_json(self).expect("serialize block");
        sha256_hex(preimage.as_bytes())
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
