//! # Outbound Ports
//!
//! Capabilities the executor consumes: the account ledger, the randomness
//! oracle, the height resolver, the creator allow-list, and the remote
//! main-chain client used on a dependent chain.
//!
//! Ledger calls take the action's state view explicitly so every balance
//! write lands in the same overlay as the lottery record.

use crate::domain::{AccountError, HeightMark, OracleError};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, KeyValueStore, Receipt, TxContext};
use std::collections::HashMap;

/// Balance of one account under an execution address, in minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: u64,
    pub frozen: u64,
}

/// Account ledger - outbound port.
///
/// Every call is all-or-nothing: on error nothing was written.
pub trait AccountService: Send + Sync {
    /// Move spendable balance from `from` to `to`.
    fn transfer(
        &self,
        state: &mut dyn KeyValueStore,
        from: &Address,
        to: &Address,
        exec: &Address,
        amount: u64,
    ) -> Result<Receipt, AccountError>;

    /// Move spendable balance of `addr` into its frozen balance.
    fn freeze(
        &self,
        state: &mut dyn KeyValueStore,
        addr: &Address,
        exec: &Address,
        amount: u64,
    ) -> Result<Receipt, AccountError>;

    /// Move frozen balance of `from` into the spendable balance of `to`.
    fn transfer_frozen(
        &self,
        state: &mut dyn KeyValueStore,
        from: &Address,
        to: &Address,
        exec: &Address,
        amount: u64,
    ) -> Result<Receipt, AccountError>;

    /// Current balances.
    fn load_account(
        &self,
        state: &dyn KeyValueStore,
        addr: &Address,
        exec: &Address,
    ) -> Result<AccountBalance, AccountError>;
}

/// Randomness oracle - outbound port.
pub trait RandomnessOracle: Send + Sync {
    /// Hash derived from `sample_blocks` blocks ending at `reference_height`.
    fn random_hash(&self, reference_height: u64, sample_blocks: u64)
        -> Result<Vec<u8>, OracleError>;
}

/// Height resolver - outbound port.
///
/// Abstracts whether timing is anchored to local heights or to main-chain
/// heights resolved per transaction.
pub trait HeightResolver: Send + Sync {
    /// Heights at which `ctx` executes.
    fn resolve(&self, ctx: &TxContext) -> Result<HeightMark, OracleError>;

    /// Reference height handed to the randomness oracle for a draw at `mark`.
    fn randomness_height(&self, mark: &HeightMark) -> u64;
}

/// Creator allow-list - outbound port.
pub trait CreatorAuthorization: Send + Sync {
    /// Whether `addr` may create lotteries. Any lookup failure denies.
    fn is_authorized(&self, state: &dyn KeyValueStore, addr: &Address) -> bool;
}

/// Remote main-chain client - outbound port for dependent chains.
#[async_trait]
pub trait MainChainClient: Send + Sync {
    /// Main-chain height the transaction is anchored to. Negative means
    /// unresolved.
    async fn main_height_by_tx(&self, tx_hash: &Hash) -> Result<i64, OracleError>;

    /// Randomness hash computed on the main chain.
    async fn rand_hash(&self, height: u64, sample_blocks: u64) -> Result<Vec<u8>, OracleError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock main-chain client for testing.
#[derive(Default)]
pub struct MockMainChainClient {
    /// Main height per transaction hash.
    heights: RwLock<HashMap<Hash, i64>>,
    /// Hash returned for every randomness query.
    pub rand: Vec<u8>,
    /// Should fail?
    pub should_fail: bool,
}

impl MockMainChainClient {
    pub fn with_rand(rand: Vec<u8>) -> Self {
        Self {
            rand,
            ..Default::default()
        }
    }

    /// Anchor `tx_hash` to `main_height`.
    pub fn set_height(&self, tx_hash: Hash, main_height: i64) {
        self.heights.write().insert(tx_hash, main_height);
    }
}

#[async_trait]
impl MainChainClient for MockMainChainClient {
    async fn main_height_by_tx(&self, tx_hash: &Hash) -> Result<i64, OracleError> {
        if self.should_fail {
            return Err(OracleError::Remote("Mock failure".to_string()));
        }
        Ok(self.heights.read().get(tx_hash).copied().unwrap_or(-1))
    }

    async fn rand_hash(&self, height: u64, sample_blocks: u64) -> Result<Vec<u8>, OracleError> {
        if self.should_fail || self.rand.is_empty() {
            return Err(OracleError::RandomnessUnavailable {
                height,
                blocks: sample_blocks,
            });
        }
        Ok(self.rand.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_unknown_tx_is_negative() {
        let client = MockMainChainClient::default();
        assert_eq!(client.main_height_by_tx(&[1u8; 32]).await.unwrap(), -1);

        client.set_height([1u8; 32], 500);
        assert_eq!(client.main_height_by_tx(&[1u8; 32]).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_mock_client_failure() {
        let client = MockMainChainClient {
            should_fail: true,
            ..Default::default()
        };
        assert!(client.main_height_by_tx(&[0u8; 32]).await.is_err());
        assert!(client.rand_hash(10, 5).await.is_err());
    }
}
