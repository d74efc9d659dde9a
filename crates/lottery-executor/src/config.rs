//! Executor configuration.

use crate::domain::{ChainMode, DRAW_WINDOW_FLOOR, PURCHASE_WINDOW_FLOOR};
use serde::{Deserialize, Serialize};
use shared_types::{Address, MAX_TXS_PER_BLOCK};
use thiserror::Error;

/// Default operator reward address.
pub const DEFAULT_OP_REWARD_ADDR: &str = "1PHtChNt3UcfssR7v7trKSk3WJtAWjKjjX";

/// Default developer reward address.
pub const DEFAULT_DEV_REWARD_ADDR: &str = "1D6RFZNp2rh6QdbcZ1d7RWuBUz61We6SD7";

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be non-zero")]
    Zero(&'static str),

    #[error("{name} {got} is below the floor of {floor}")]
    BelowFloor {
        name: &'static str,
        got: u64,
        floor: u64,
    },

    #[error("min_purchase_window {purchase} exceeds min_draw_window {draw}")]
    InvertedWindows { purchase: u64, draw: u64 },

    #[error("{0} reward address is empty")]
    EmptyAddress(&'static str),
}

/// Configuration for the lottery executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotteryConfig {
    /// Whether `Close` is accepted at all
    pub close_enabled: bool,

    /// Main chain or dependent chain
    pub chain_mode: ChainMode,

    /// Minor units per coin on the ledger
    pub coin_precision: u64,

    /// Blocks sampled by the randomness oracle
    pub rand_sample_blocks: u64,

    /// Smallest purchase window a creator may configure
    pub min_purchase_window: u64,

    /// Smallest draw window a creator may configure
    pub min_draw_window: u64,

    /// Receiver of the operator share of each draw
    pub op_reward_addr: Address,

    /// Receiver of the developer share of each draw
    pub dev_reward_addr: Address,

    /// Multiplier used to build global ticket indices
    pub max_txs_per_block: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            close_enabled: true,
            chain_mode: ChainMode::Main,
            coin_precision: 100_000_000,
            rand_sample_blocks: 5,
            min_purchase_window: PURCHASE_WINDOW_FLOOR,
            min_draw_window: DRAW_WINDOW_FLOOR,
            op_reward_addr: Address::from(DEFAULT_OP_REWARD_ADDR),
            dev_reward_addr: Address::from(DEFAULT_DEV_REWARD_ADDR),
            max_txs_per_block: MAX_TXS_PER_BLOCK,
        }
    }
}

impl LotteryConfig {
    /// Same defaults, anchored to a main chain.
    pub fn for_parachain() -> Self {
        Self {
            chain_mode: ChainMode::Parachain,
            ..Self::default()
        }
    }

    /// Reject values the executor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coin_precision == 0 {
            return Err(ConfigError::Zero("coin_precision"));
        }
        if self.rand_sample_blocks == 0 {
            return Err(ConfigError::Zero("rand_sample_blocks"));
        }
        if self.max_txs_per_block == 0 {
            return Err(ConfigError::Zero("max_txs_per_block"));
        }
        if self.min_purchase_window < PURCHASE_WINDOW_FLOOR {
            return Err(ConfigError::BelowFloor {
                name: "min_purchase_window",
                got: self.min_purchase_window,
                floor: PURCHASE_WINDOW_FLOOR,
            });
        }
        if self.min_draw_window < DRAW_WINDOW_FLOOR {
            return Err(ConfigError::BelowFloor {
                name: "min_draw_window",
                got: self.min_draw_window,
                floor: DRAW_WINDOW_FLOOR,
            });
        }
        if self.min_purchase_window > self.min_draw_window {
            return Err(ConfigError::InvertedWindows {
                purchase: self.min_purchase_window,
                draw: self.min_draw_window,
            });
        }
        if self.op_reward_addr.as_str().is_empty() {
            return Err(ConfigError::EmptyAddress("operator"));
        }
        if self.dev_reward_addr.as_str().is_empty() {
            return Err(ConfigError::EmptyAddress("developer"));
        }
        Ok(())
    }

    pub fn is_parachain(&self) -> bool {
        self.chain_mode == ChainMode::Parachain
    }
}
