use serde::{Deserialize, Serialize};

/// Sender used for coins minted by mining.
pub const REWARD_SENDER: &str = "0";

/// A pending transfer record. The payload is opaque to the ledger:
/// no balance or signature checks are performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}
