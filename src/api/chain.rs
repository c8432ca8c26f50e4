use std::future::Future;
use std::sync::Mutex;

use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};

use super::models::{AppState, ChainResponse, MineResponse, ValidateResponse};
use crate::blockchain::{Block, Ledger, MINING_REWARD, ProofOfWork};
use crate::error::MineError;
use crate::transaction::REWARD_SENDER;

/// Get the full chain. Peers read this endpoint during consensus.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ChainResponse {
        length: ledger.len(),
        chain: ledger.chain(),
    })
}

/// Validate the local chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ValidateResponse {
        valid: ledger.is_valid(),
        length: ledger.len(),
        difficulty: ledger.pow().difficulty(),
    })
}

/// Mine a new block:
/// - Search a proof against the tip's proof (off the request thread, no lock held)
/// - Credit this node with the mining reward
/// - Seal the pending pool into a block
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    let cancel = state.mining_cancel.clone();
    let search = |pow: ProofOfWork, last_proof: u64| {
        let cancel = cancel.clone();
        async move {
            web::block(move || pow.find_proof(last_proof, cancel.as_ref()))
                .await
                .map_err(|e| MineError::Search(e.to_string()))?
                .ok_or(MineError::Cancelled)
        }
    };

    match forge_block(&state.ledger, &state.node_id, search).await {
        Ok(block) => HttpResponse::Ok().json(MineResponse {
            message: "New Block Forged",
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }),
        Err(MineError::Cancelled) => {
            warn!("MINER - proof search cancelled");
            HttpResponse::ServiceUnavailable().body("mining cancelled")
        }
        Err(e) => {
            warn!("MINER - {e}");
            HttpResponse::InternalServerError().body("mining failed")
        }
    }
}

/// Run `search` against the current tip without holding the lock, then credit
/// `node_id` and append. If the tip moved while searching (another block mined
/// or the chain replaced by consensus) the proof is stale and the search
/// restarts against the new tip.
async fn forge_block<F, Fut>(
    ledger: &Mutex<Ledger>,
    node_id: &str,
    mut search: F,
) -> Result<Block, MineError>
where
    F: FnMut(ProofOfWork, u64) -> Fut,
    Fut: Future<Output = Result<u64, MineError>>,
{
    loop {
        let (last_index, last_proof, pow) = {
            let l = ledger.lock().expect("mutex poisoned");
            let tip = l.last_block();
            (tip.index, tip.proof, l.pow())
        };

        debug!("MINER - searching proof for block #{}", last_index + 1);
        let proof = search(pow, last_proof).await?;

        let mut l = ledger.lock().expect("mutex poisoned");
        let tip = l.last_block();
        if tip.index != last_index || tip.proof != last_proof {
            info!("MINER - tip moved to #{} during search, retrying", tip.index);
            continue;
        }

        l.queue_transaction(REWARD_SENDER, node_id, MINING_REWARD);
        let block = l.append_block(proof, None);
        info!(
            "MINER - forged block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        return Ok(block.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::forge_block;
    use crate::blockchain::{Ledger, ProofOfWork};
    use crate::error::MineError;
    use std::future::ready;
    use std::sync::Mutex;

    fn ledger() -> Mutex<Ledger> {
        Mutex::new(Ledger::new(ProofOfWork::new(2)))
    }

    #[actix_web::test]
    async fn stale_proof_is_discarded_when_the_tip_moves() {
        let ledger = ledger();
        let mut calls = 0;

        let block = forge_block(&ledger, "miner", |pow: ProofOfWork, last_proof| {
            calls += 1;
            if calls == 1 {
                // Someone else seals block #2 while this search runs.
                let mut l = ledger.lock().unwrap();
                let proof = pow.solve(l.last_block().proof);
                l.append_block(proof, None);
            }
            ready(Ok(pow.solve(last_proof)))
        })
        .await
        .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(block.index, 3);
        let l = ledger.lock().unwrap();
        assert_eq!(l.len(), 3);
        assert_eq!(block.previous_hash, l.chain()[1].compute_hash());
        assert!(l.pow().is_valid(l.chain()[1].proof, block.proof));
        assert!(l.is_valid());
    }

    #[actix_web::test]
    async fn reward_goes_to_the_miner() {
        let ledger = ledger();
        ledger.lock().unwrap().queue_transaction("alice", "bob", 3);

        let block = forge_block(&ledger, "miner", |pow: ProofOfWork, last_proof| {
            ready(Ok(pow.solve(last_proof)))
        })
        .await
        .unwrap();

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[1].sender, "0");
        assert_eq!(block.transactions[1].recipient, "miner");
        assert!(ledger.lock().unwrap().pending_transactions().is_empty());
    }

    #[actix_web::test]
    async fn failed_search_appends_nothing() {
        let ledger = ledger();
        ledger.lock().unwrap().queue_transaction("alice", "bob", 3);

        for err in [MineError::Cancelled, MineError::Search("pool gone".into())] {
            let got = forge_block(&ledger, "miner", |_: ProofOfWork, _| ready(Err(err.clone()))).await;
            assert_eq!(got, Err(err));
        }
        let l = ledger.lock().unwrap();
        assert_eq!(l.len(), 1);
        assert_eq!(l.pending_transactions().len(), 1);
    }
}
