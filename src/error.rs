use thiserror::Error;

/// Errors raised by ledger operations on caller-supplied input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid peer address: {0:?}")]
    InvalidPeerAddress(String),
}

/// Why a candidate chain was rejected. `index` is the 1-based block index of
/// the first block that failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainValidationError {
    #[error("block {index}: previous_hash does not match the preceding block")]
    BrokenLink { index: u64 },
    #[error("block {index}: proof does not satisfy the proof-of-work")]
    InvalidProof { index: u64 },
}

/// Failure to obtain a peer's chain.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("peer answered with status {0}")]
    Status(u16),
    #[error("peer unreachable: {0}")]
    Unreachable(String),
}

/// Why `POST /mine/` gave up without forging a block.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MineError {
    #[error("proof search cancelled")]
    Cancelled,
    #[error("proof search failed: {0}")]
    Search(String),
}
