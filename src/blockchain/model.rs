use std::collections::HashSet;

use log::debug;
use reqwest::Url;

use super::validator::is_valid_chain;
use super::{Block, ProofOfWork};
use crate::error::LedgerError;
use crate::transaction::Transaction;

/// In-memory ledger: the chain, the pool of transactions waiting for the next
/// block, and the peers consulted by consensus.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending_transactions: Vec<Transaction>,
    peers: HashSet<String>,
    pow: ProofOfWork,
}

impl Ledger {
    /// Initialize a new ledger with a genesis block.
    pub fn new(pow: ProofOfWork) -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending_transactions: Vec::new(),
            peers: HashSet::new(),
            pow,
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger should always hold at least the genesis block")
    }

    /// Queue a transaction for the next block; returns that block's index.
    pub fn queue_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: i64,
    ) -> u64 {
        self.pending_transactions
            .push(Transaction::new(sender, recipient, amount));
        self.chain.len() as u64 + 1
    }

    /// Seal the pending pool into a new block and append it.
    ///
    /// `proof` is trusted: the caller must have checked it against the tip's
    /// proof. When `previous_hash` is `None` the tip's hash is used.
    pub fn append_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().compute_hash());
        let transactions = std::mem::take(&mut self.pending_transactions);
        let block = Block::new(
            self.chain.len() as u64 + 1,
            transactions,
            proof,
            previous_hash,
        );
        debug!(
            "LEDGER - appended block #{} ({} txs, proof={})",
            block.index,
            block.transactions.len(),
            block.proof
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Add a peer as `host:port`. Returns `false` if it was already known.
    pub fn register_peer(&mut self, address: &str) -> Result<bool, LedgerError> {
        let peer = parse_peer_address(address)?;
        Ok(self.peers.insert(peer))
    }

    /// Register several peers at once. Every address is parsed before any is
    /// added, so one malformed entry leaves the peer set untouched. Returns
    /// how many were new.
    pub fn register_peers<S: AsRef<str>>(&mut self, addresses: &[S]) -> Result<usize, LedgerError> {
        for address in addresses {
            parse_peer_address(address.as_ref())?;
        }
        let mut added = 0;
        for address in addresses {
            if self.register_peer(address.as_ref())? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Swap the whole chain in one step (used by consensus).
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        debug!(
            "LEDGER - chain replaced: {} -> {} blocks",
            self.chain.len(),
            chain.len()
        );
        self.chain = chain;
    }

    /// Validate the local chain: linkage and PoW.
    pub fn is_valid(&self) -> bool {
        is_valid_chain(&self.chain, &self.pow)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    /// Known peers, sorted for stable display.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.peers.iter().cloned().collect();
        peers.sort();
        peers
    }

    /// Known peers in set iteration order (unspecified).
    pub fn peer_set(&self) -> &HashSet<String> {
        &self.peers
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }
}

/// Reduce `http://host:port/...` or a bare `host:port` to `host:port`.
fn parse_peer_address(address: &str) -> Result<String, LedgerError> {
    let invalid = || LedgerError::InvalidPeerAddress(address.to_string());

    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }
    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{trimmed}"))
    }
    .map_err(|_| invalid())?;

    let host = url.host_str().ok_or_else(invalid)?;
    match url.port_or_known_default() {
        Some(port) => Ok(format!("{host}:{port}")),
        None => Err(invalid()),
    }
}
