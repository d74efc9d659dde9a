//! JSON action scripts.
//!
//! A script funds accounts, then feeds blocks of transactions to a node in
//! height order. Heights skipped between blocks are filled with derived
//! block hashes so the randomness window is always complete.
//!
//! ```json
//! {
//!   "deposits": [{ "address": "alice", "amount": 1000 }],
//!   "blocks": [
//!     { "height": 1, "txs": [
//!       { "from": "creator", "action": { "action": "create", "purchase_window": 30, "draw_window": 40 } }
//!     ]}
//!   ]
//! }
//! ```

use crate::node::{LotteryNode, NodeError};
use lottery_executor::{LotteryAction, LotteryError, LotteryInfo};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Address, Hash};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("block {height} is not above {tip}")]
    HeightOrder { height: u64, tip: u64 },

    #[error("block {height} hash is not 32 hex bytes")]
    BadHash { height: u64 },

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Initial funding, in whole coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub address: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTx {
    pub from: Address,
    pub action: LotteryAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBlock {
    pub height: u64,
    #[serde(default)]
    pub time: i64,
    /// Hex block hash; derived from the height when absent.
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub txs: Vec<ScriptTx>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub deposits: Vec<Deposit>,
    #[serde(default)]
    pub blocks: Vec<ScriptBlock>,
}

impl Script {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Result of one scripted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub height: u64,
    pub index: u32,
    pub from: Address,
    pub action: String,
    pub tx_hash: String,
    pub error: Option<String>,
}

impl TxOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    pub outcomes: Vec<TxOutcome>,
    /// Final state of every lottery the script created.
    pub lotteries: Vec<LotteryInfo>,
}

fn derived_block_hash(height: u64) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(b"block");
    hasher.update(height.to_be_bytes());
    hasher.finalize().into()
}

fn derived_tx_hash(height: u64, index: u32, from: &Address) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(height.to_be_bytes());
    hasher.update(index.to_be_bytes());
    hasher.update(from.as_bytes());
    hasher.finalize().into()
}

fn parse_hash(height: u64, hex_hash: &str) -> Result<Hash, ScriptError> {
    let raw = hex::decode(hex_hash.trim_start_matches("0x"))
        .map_err(|_| ScriptError::BadHash { height })?;
    raw.try_into().map_err(|_| ScriptError::BadHash { height })
}

/// Run `script` against `node`, committing history after every block.
///
/// Rejected transactions are reported, not fatal.
pub fn run_script(node: &mut LotteryNode, script: &Script) -> Result<ScriptReport, ScriptError> {
    let precision = node.coin_precision();
    for deposit in &script.deposits {
        let amount = deposit
            .amount
            .checked_mul(precision)
            .ok_or(NodeError::Lottery(LotteryError::Overflow("deposit")))?;
        node.deposit(&deposit.address, amount)?;
    }

    let mut report = ScriptReport::default();
    let mut created = Vec::new();
    let mut tip: Option<u64> = None;

    for block in &script.blocks {
        let first = match tip {
            Some(tip) if block.height <= tip => {
                return Err(ScriptError::HeightOrder {
                    height: block.height,
                    tip,
                })
            }
            Some(tip) => tip + 1,
            None => block.height.saturating_sub(1),
        };
        for height in first..block.height {
            node.begin_block(height, derived_block_hash(height));
        }
        let hash = match &block.hash {
            Some(hex_hash) => parse_hash(block.height, hex_hash)?,
            None => derived_block_hash(block.height),
        };
        node.begin_block(block.height, hash);
        tip = Some(block.height);

        for (i, tx) in block.txs.iter().enumerate() {
            let index = i as u32;
            let ctx = node.tx_context(
                tx.from.clone(),
                block.height,
                index,
                block.time,
                derived_tx_hash(block.height, index, &tx.from),
            );
            let error = match node.apply(&ctx, &tx.action) {
                Ok(_) => {
                    if matches!(tx.action, LotteryAction::Create(_)) {
                        created.push(ctx.tx_hash_hex());
                    }
                    None
                }
                Err(NodeError::Lottery(e)) => Some(e.to_string()),
                Err(e) => return Err(e.into()),
            };
            report.outcomes.push(TxOutcome {
                height: block.height,
                index,
                from: tx.from.clone(),
                action: tx.action.name().to_string(),
                tx_hash: ctx.tx_hash_hex(),
                error,
            });
        }
        node.commit()?;
    }

    for id in created {
        match node.lottery_info(&id) {
            Ok(info) => report.lotteries.push(info),
            Err(e) => warn!(lottery_id = %id, error = %e, "created lottery not readable"),
        }
    }

    let rejected = report.outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(
        txs = report.outcomes.len(),
        rejected,
        lotteries = report.lotteries.len(),
        "script finished"
    );
    Ok(report)
}
