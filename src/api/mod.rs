mod chain;
mod health;
pub mod models;
mod nodes;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::mine_block)
            .service(tx::post_transaction)
            .service(tx::get_pending)
            .service(nodes::register_nodes)
            .service(nodes::list_nodes)
            .service(nodes::resolve),
    );
}

#[cfg(test)]
mod tests {
    use super::{AppState, init_routes};
    use crate::blockchain::validator::is_valid_chain;
    use crate::blockchain::{Block, ProofOfWork};
    use crate::consensus::HttpChainSource;
    use crate::consensus::source::{CHAIN_PATH, ChainSnapshot};
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(
            ProofOfWork::new(2),
            "test-node".into(),
            HttpChainSource::new(Duration::from_millis(300)).unwrap(),
        ))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(init_routes)).await
        };
    }

    #[actix_web::test]
    async fn health_is_up() {
        let app = app!(state());
        let req = test::TestRequest::get().uri("/api/v1/health/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn chain_starts_with_genesis() {
        let app = app!(state());
        let req = test::TestRequest::get().uri(CHAIN_PATH).to_request();
        let snapshot: ChainSnapshot = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot.length, 1);
        assert_eq!(snapshot.chain[0].index, 1);
        assert_eq!(snapshot.chain[0].proof, 100);
        assert_eq!(snapshot.chain[0].previous_hash, "1");
    }

    #[actix_web::test]
    async fn new_transaction_reports_next_block() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({"sender": "alice", "recipient": "bob", "amount": 5}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["index"], 2);
        assert_eq!(body["message"], "Transaction will be added to Block 2");

        let req = test::TestRequest::get()
            .uri("/api/v1/transactions/pending/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["size"], 1);
        assert_eq!(body["transactions"][0]["recipient"], "bob");
    }

    #[actix_web::test]
    async fn malformed_transactions_are_rejected() {
        let state = state();
        let app = app!(state);
        for payload in [
            json!({"sender": "alice", "recipient": "bob"}),
            json!({"sender": "", "recipient": "bob", "amount": 1}),
            json!({"sender": "alice", "recipient": "bob", "amount": "lots"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/transactions/new/")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
        assert!(
            state
                .ledger
                .lock()
                .unwrap()
                .pending_transactions()
                .is_empty()
        );
    }

    #[actix_web::test]
    async fn mining_seals_pending_pool_with_reward() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({"sender": "alice", "recipient": "bob", "amount": 5}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post().uri("/api/v1/mine/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "New Block Forged");
        assert_eq!(body["index"], 2);
        let txs = body["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[1], json!({"sender": "0", "recipient": "test-node", "amount": 1}));

        let ledger = state.ledger.lock().unwrap();
        assert!(ledger.pending_transactions().is_empty());
        assert_eq!(body["previous_hash"], ledger.chain()[0].compute_hash());
        assert!(ledger.is_valid());
    }

    #[actix_web::test]
    async fn mined_chain_validates_on_another_node() {
        let app = app!(state());
        for _ in 0..3 {
            let req = test::TestRequest::post().uri("/api/v1/mine/").to_request();
            test::call_service(&app, req).await;
        }
        let req = test::TestRequest::get().uri(CHAIN_PATH).to_request();
        let body = test::call_and_read_body(&app, req).await;
        // Decode from raw bytes, the way a peer would receive it.
        let snapshot: ChainSnapshot = serde_json::from_slice(&body).unwrap();
        assert_eq!(snapshot.length, 4);
        assert!(is_valid_chain(&snapshot.chain, &ProofOfWork::new(2)));

        let req = test::TestRequest::get().uri("/api/v1/validate/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"valid": true, "length": 4, "difficulty": 2}));
    }

    #[actix_web::test]
    async fn cancelled_mining_appends_nothing() {
        let state = state();
        state.mining_cancel.store(true, Ordering::Relaxed);
        let app = app!(state);
        let req = test::TestRequest::post().uri("/api/v1/mine/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.ledger.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn register_nodes_validates_input() {
        let state = state();
        let app = app!(state);

        for payload in [json!({}), json!({"nodes": []}), json!({"nodes": ["a:1", "http://"]})] {
            let req = test::TestRequest::post()
                .uri("/api/v1/nodes/register/")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
        assert!(state.ledger.lock().unwrap().peers().is_empty());

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/register/")
            .set_json(json!({"nodes": ["http://127.0.0.1:5001", "127.0.0.1:5001", "node-b:5002"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total_nodes"], json!(["127.0.0.1:5001", "node-b:5002"]));

        let req = test::TestRequest::get().uri("/api/v1/nodes/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_nodes"], json!(["127.0.0.1:5001", "node-b:5002"]));
    }

    #[actix_web::test]
    async fn resolve_with_unreachable_peer_keeps_chain() {
        let state = state();
        state
            .ledger
            .lock()
            .unwrap()
            .register_peer("127.0.0.1:9")
            .unwrap();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/v1/nodes/resolve/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["replaced"], false);
        assert_eq!(body["message"], "Our chain is authoritative");
        let chain: Vec<Block> = serde_json::from_value(body["chain"].clone()).unwrap();
        assert_eq!(chain.len(), 1);
    }
}
