pub mod block;
pub mod hash;
pub mod model;
pub mod pow;
pub mod validator;

pub use block::Block;
pub use model::Ledger;
pub use pow::ProofOfWork;
pub use validator::validate_chain;

/// Default Proof-of-Work difficulty (number of leading zero hex chars).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// A SHA-256 hex digest has 64 characters; no proof can satisfy more.
pub const MAX_DIFFICULTY: u32 = 64;

/// Coins minted to the node that seals a block.
pub const MINING_REWARD: i64 = 1;

/// Proof stored in the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// Sentinel `previous_hash` of the genesis block (not a digest).
pub const GENESIS_PREVIOUS_HASH: &str = "1";
