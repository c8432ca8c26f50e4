use std::sync::Mutex;

use futures::future::join_all;
use log::{debug, info, warn};

use super::source::{ChainSnapshot, ChainSource};
use crate::blockchain::{Block, Ledger, ProofOfWork, validate_chain};
use crate::error::FetchError;

/// Fetch every peer's chain concurrently. Results come back in `peers` order.
pub async fn fetch_all<S: ChainSource>(
    source: &S,
    peers: &[String],
) -> Vec<(String, Result<ChainSnapshot, FetchError>)> {
    let results = join_all(peers.iter().map(|peer| source.fetch_chain(peer))).await;
    peers.iter().cloned().zip(results).collect()
}

/// Longest-chain rule: walk the results in order, keeping a candidate only if
/// its reported length is strictly greater than the best seen so far (starting
/// at `local_len`) and the chain validates. Among equally long winners the
/// first one visited is kept. Failed fetches and invalid chains are skipped.
pub fn select_longest<I>(local_len: usize, results: I, pow: &ProofOfWork) -> Option<Vec<Block>>
where
    I: IntoIterator<Item = (String, Result<ChainSnapshot, FetchError>)>,
{
    let mut max_length = local_len;
    let mut best = None;

    for (peer, result) in results {
        let snapshot = match result {
            Ok(s) => s,
            Err(e) => {
                warn!("CONSENSUS - skipping peer {peer}: {e}");
                continue;
            }
        };
        if snapshot.length <= max_length {
            debug!(
                "CONSENSUS - peer {peer} not longer ({} <= {max_length})",
                snapshot.length
            );
            continue;
        }
        if let Err(e) = validate_chain(&snapshot.chain, pow) {
            warn!("CONSENSUS - rejecting chain from {peer}: {e}");
            continue;
        }
        debug!(
            "CONSENSUS - peer {peer} offers valid chain of length {}",
            snapshot.length
        );
        max_length = snapshot.length;
        best = Some(snapshot.chain);
    }

    best
}

/// Ask every registered peer for its chain and adopt the longest valid one if
/// it beats ours. Returns whether the local chain was replaced.
///
/// The ledger lock is not held while peers are contacted. If the local chain
/// grew in the meantime and is no longer shorter than the winner, nothing is
/// replaced.
pub async fn resolve_conflicts<S: ChainSource>(ledger: &Mutex<Ledger>, source: &S) -> bool {
    let (peers, local_len, pow) = {
        let l = ledger.lock().expect("mutex poisoned");
        let peers: Vec<String> = l.peer_set().iter().cloned().collect();
        (peers, l.len(), l.pow())
    };
    if peers.is_empty() {
        debug!("CONSENSUS - no peers registered");
        return false;
    }

    let results = fetch_all(source, &peers).await;
    let Some(chain) = select_longest(local_len, results, &pow) else {
        info!("CONSENSUS - local chain is authoritative (length {local_len})");
        return false;
    };

    let mut l = ledger.lock().expect("mutex poisoned");
    if chain.len() <= l.len() {
        info!(
            "CONSENSUS - local chain grew to {} while resolving; keeping it",
            l.len()
        );
        return false;
    }
    info!(
        "CONSENSUS - replacing local chain ({} blocks) with peer chain ({} blocks)",
        l.len(),
        chain.len()
    );
    l.replace_chain(chain);
    true
}
