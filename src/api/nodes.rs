use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, NodesResponse, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse,
};
use crate::consensus::resolve_conflicts;

/// Register a batch of peers. Either every address is accepted or none is.
#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    let nodes = match body.into_inner().nodes {
        Some(nodes) if !nodes.is_empty() => nodes,
        _ => {
            return HttpResponse::BadRequest().body("Error: Please supply a valid list of nodes");
        }
    };

    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    match ledger.register_peers(&nodes) {
        Ok(added) => info!(
            "POST /nodes/register/ - {added} new peer(s), {} known",
            ledger.peer_set().len()
        ),
        Err(e) => {
            warn!("POST /nodes/register/ - {e}");
            return HttpResponse::BadRequest().body(e.to_string());
        }
    }

    HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes: ledger.peers(),
    })
}

/// List known peers.
#[get("/nodes/")]
pub async fn list_nodes(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(NodesResponse {
        total_nodes: ledger.peers(),
    })
}

/// Run the longest-chain rule against every registered peer.
#[get("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> impl Responder {
    let replaced = resolve_conflicts(&state.ledger, &state.chain_source).await;
    let chain = {
        let ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.chain().to_vec()
    };
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    HttpResponse::Ok().json(ResolveResponse {
        message,
        replaced,
        chain,
    })
}
