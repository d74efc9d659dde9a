//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the executor's outbound ports.

mod authorization;
mod height;
mod ledger;
mod main_chain;
mod randomness;

pub use authorization::{ConfigItem, ManagedAllowList, StaticAllowList, CREATOR_CONFIG_KEY};
pub use height::LocalHeightResolver;
pub use ledger::{AccountDelta, StateLedger, TY_LOG_EXEC_FROZEN, TY_LOG_EXEC_TRANSFER};
pub use main_chain::BlockingMainChain;
pub use randomness::{BlockHashOracle, FixedRandomness};
