use super::{Block, ProofOfWork};
use crate::error::ChainValidationError;

/// Walk `chain` pairwise from the first block (trusted anchor) and check hash
/// linkage and proof-of-work at every step. Transactions are not inspected.
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> Result<(), ChainValidationError> {
    for pair in chain.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        if curr.previous_hash != prev.compute_hash() {
            return Err(ChainValidationError::BrokenLink { index: curr.index });
        }

        if !pow.is_valid(prev.proof, curr.proof) {
            return Err(ChainValidationError::InvalidProof { index: curr.index });
        }
    }
    Ok(())
}

pub fn is_valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    validate_chain(chain, pow).is_ok()
}
