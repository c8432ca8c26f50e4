mod api;
mod blockchain;
mod config;
mod consensus;
mod error;
mod transaction;

use actix_web::{App, HttpServer, rt, web};
use clap::Parser;
use dotenvy::dotenv;
use log::{info, warn};
use std::io;
use std::sync::atomic::Ordering;

use api::AppState;
use blockchain::ProofOfWork;
use config::Config;
use consensus::HttpChainSource;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Config::parse();
    let node_id = cfg.node_id();
    let chain_source = HttpChainSource::new(cfg.peer_timeout()).map_err(io::Error::other)?;
    let state = web::Data::new(AppState::new(
        ProofOfWork::new(cfg.difficulty),
        node_id.clone(),
        chain_source,
    ));

    if !cfg.peers.is_empty() {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        match ledger.register_peers(&cfg.peers) {
            Ok(added) => info!("registered {added} startup peer(s)"),
            Err(e) => warn!("ignoring startup peers: {e}"),
        }
    }

    println!(
        "⛓️ Starting ledger node {node_id} at http://{}:{} (difficulty {})",
        cfg.host, cfg.port, cfg.difficulty
    );

    // Abandon proof searches on Ctrl-C so graceful shutdown isn't held up.
    let cancel = state.mining_cancel.clone();
    rt::spawn(async move {
        if rt::signal::ctrl_c().await.is_ok() {
            cancel.store(true, Ordering::Relaxed);
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run()
    .await
}
