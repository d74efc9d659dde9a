//! # Core Platform Entities
//!
//! - **Identity**: `Address`, `Hash`
//! - **Execution**: `TxContext`
//! - **Output**: `KeyValue`, `ReceiptLog`, `Receipt`

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte transaction hash.
pub type Hash = [u8; 32];

/// Upper bound on transactions per block, used to build global sequence indices.
pub const MAX_TXS_PER_BLOCK: u64 = 100_000;

/// A ledger address in its textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Create an address from anything string-like.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes, used when the address is embedded in a storage key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Everything the platform tells an executor about the transaction it is
/// currently applying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    /// Hash of the transaction being executed.
    pub tx_hash: Hash,
    /// Signer of the transaction.
    pub from: Address,
    /// Height of the block containing the transaction.
    pub height: u64,
    /// Position of the transaction inside its block.
    pub index: u32,
    /// Block timestamp (unix seconds).
    pub block_time: i64,
    /// Execution address that scopes balances moved by this executor.
    pub exec_address: Address,
}

impl TxContext {
    /// Sequence index unique across the whole chain:
    /// `height * max_txs_per_block + index`, or `None` on overflow.
    pub fn global_index(&self, max_txs_per_block: u64) -> Option<u64> {
        self.height
            .checked_mul(max_txs_per_block)?
            .checked_add(u64::from(self.index))
    }

    /// `0x`-prefixed lowercase hex of the transaction hash.
    pub fn tx_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.tx_hash))
    }
}

/// A single state write produced by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An audit entry. `ty` identifies the payload encoding of `log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
    pub ty: u32,
    pub log: Vec<u8>,
}

/// The complete output of one successfully executed action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// State writes, in the order they were issued.
    pub kv: Vec<KeyValue>,
    /// Audit entries, in the order they were issued.
    pub logs: Vec<ReceiptLog>,
}

impl Receipt {
    /// Append another receipt's writes and logs after this one's.
    pub fn merge(&mut self, other: Receipt) {
        self.kv.extend(other.kv);
        self.logs.extend(other.logs);
    }

    /// Logs of a single type, in issue order.
    pub fn logs_of_type(&self, ty: u32) -> impl Iterator<Item = &ReceiptLog> {
        self.logs.iter().filter(move |log| log.ty == ty)
    }
}
