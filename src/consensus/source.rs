use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::blockchain::Block;
use crate::error::FetchError;

/// Path every node serves its chain on.
pub const CHAIN_PATH: &str = "/api/v1/chain/";

/// Wire form of a node's chain: `{ "length": .., "chain": [..] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl From<Vec<Block>> for ChainSnapshot {
    fn from(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }
}

/// Somewhere peer chains can be read from.
pub trait ChainSource {
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<ChainSnapshot, FetchError>>;
}

/// Reads peer chains over HTTP with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpChainSource {
    client: Client,
}

impl HttpChainSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ChainSource for HttpChainSource {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, FetchError> {
        let url = format!("http://{peer}{CHAIN_PATH}");
        debug!("CONSENSUS - GET {url}");

        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                FetchError::Unreachable(format!("{peer}: {e}"))
            } else {
                FetchError::Http(e)
            }
        })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        Ok(resp.json::<ChainSnapshot>().await?)
    }
}
