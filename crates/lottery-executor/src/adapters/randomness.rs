//! Randomness oracle adapters.
//!
//! `BlockHashOracle` derives randomness from recorded block hashes;
//! `FixedRandomness` returns a preset hash for deterministic draws.

use crate::domain::OracleError;
use crate::ports::outbound::RandomnessOracle;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_types::Hash;
use std::collections::BTreeMap;
use tracing::warn;

/// Oracle over locally known block hashes.
///
/// The hash for `(height, n)` is SHA-256 over the hashes of blocks
/// `height - n + 1 ..= height`, in ascending order.
#[derive(Default)]
pub struct BlockHashOracle {
    blocks: RwLock<BTreeMap<u64, Hash>>,
}

impl BlockHashOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hash of a produced block.
    pub fn record_block(&self, height: u64, hash: Hash) {
        self.blocks.write().insert(height, hash);
    }

    /// Highest recorded block.
    pub fn tip(&self) -> Option<u64> {
        self.blocks.read().keys().next_back().copied()
    }
}

impl RandomnessOracle for BlockHashOracle {
    fn random_hash(
        &self,
        reference_height: u64,
        sample_blocks: u64,
    ) -> Result<Vec<u8>, OracleError> {
        let unavailable = OracleError::RandomnessUnavailable {
            height: reference_height,
            blocks: sample_blocks,
        };
        if sample_blocks == 0 || sample_blocks > reference_height + 1 {
            return Err(unavailable);
        }

        let blocks = self.blocks.read();
        let start = reference_height + 1 - sample_blocks;
        let mut hasher = Sha256::new();
        for height in start..=reference_height {
            match blocks.get(&height) {
                Some(hash) => hasher.update(hash),
                None => {
                    warn!(height, reference_height, "block missing from randomness sample");
                    return Err(unavailable);
                }
            }
        }
        Ok(hasher.finalize().to_vec())
    }
}

/// Oracle that always answers with the same hash.
#[derive(Clone, Debug)]
pub struct FixedRandomness {
    hash: Vec<u8>,
}

impl FixedRandomness {
    pub fn new(hash: Vec<u8>) -> Self {
        Self { hash }
    }

    /// A hash that derives exactly `lucky` (which must be below 100000).
    pub fn for_number(lucky: u32) -> Self {
        let mut hash = vec![0u8; 32];
        hash[..4].copy_from_slice(&lucky.to_be_bytes());
        Self { hash }
    }
}

impl RandomnessOracle for FixedRandomness {
    fn random_hash(&self, _reference_height: u64, _sample_blocks: u64) -> Result<Vec<u8>, OracleError> {
        Ok(self.hash.clone())
    }
}
