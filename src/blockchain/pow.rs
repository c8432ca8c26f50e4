use std::sync::atomic::{AtomicBool, Ordering};

use super::DEFAULT_DIFFICULTY;
use super::hash::sha256_hex;

/// How many candidates to try between two looks at the cancel flag.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Proof-of-Work puzzle: given the previous block's proof `p`, find `p'` such
/// that `sha256("{p}{p'}")` starts with `difficulty` hex zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// O(1) check of a candidate proof against the previous one.
    pub fn is_valid(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{last_proof}{proof}");
        sha256_hex(guess.as_bytes())
            .chars()
            .take(self.difficulty as usize)
            .all(|c| c == '0')
    }

    /// Smallest non-negative proof valid against `last_proof`.
    ///
    /// Unbounded sequential search (expect ~16^difficulty attempts), abandoned
    /// with `None` once `cancel` is raised.
    pub fn find_proof(&self, last_proof: u64, cancel: &AtomicBool) -> Option<u64> {
        let mut proof = 0u64;
        loop {
            if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }
            if self.is_valid(last_proof, proof) {
                return Some(proof);
            }
            proof += 1;
        }
    }

    /// Uncancellable search for test fixtures.
    #[cfg(test)]
    pub fn solve(&self, last_proof: u64) -> u64 {
        self.find_proof(last_proof, &AtomicBool::new(false))
            .expect("search without a cancel signal always finishes")
    }
}
