//! # Lottery Executor
//!
//! Deterministic transaction-processing core of a numbers lottery hosted on
//! a shared ledger.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Lifecycle
//!
//! ```text
//! Created ──buy──► Purchase ──draw──► Drawed ──buy──► Purchase ...
//!    │                 │                 │
//!    └──────close──────┴──────close──────┴──► Closed (terminal)
//! ```
//!
//! ## Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | Windows | `purchase >= 30`, `draw >= 40`, `purchase <= draw` |
//! | Purchase expiry | elapsed since round open `<= purchase_window` |
//! | Draw eligibility | elapsed since round open `>= draw_window`, creator only |
//! | Exhaustion protection | a round never pays more than half the pool |
//! | Atomicity | every action commits whole or not at all |
//!
//! ## Module Structure
//!
//! ```text
//! lottery-executor/
//! ├── domain/       # LotteryRecord, phases, tiers, missing table, errors
//! ├── algorithms/   # Reward settlement, lucky number derivation
//! ├── ports/        # LotteryApi, LotteryQuery, AccountService, oracles
//! ├── adapters/     # State ledger, height resolvers, randomness, allow-lists
//! ├── store.rs      # Record persistence
//! ├── events.rs     # Receipt log payloads
//! └── service.rs    # LotteryExecutor
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;
pub mod store;

// Re-exports
pub use algorithms::{settle_round, ticket_reward, RoundSettlement, WinningTicket};
pub use config::{ConfigError, LotteryConfig};
pub use domain::{
    AccountError, BetTier, ChainMode, HeightMark, LotteryError, LotteryPhase, LotteryRecord,
    LotteryResult, MissingTable, OracleError, PurchaseAggregate, Ticket,
};
pub use events::{
    LotteryEvent, LotteryReceipt, TY_LOG_LOTTERY_BUY, TY_LOG_LOTTERY_CLOSE,
    TY_LOG_LOTTERY_CREATE, TY_LOG_LOTTERY_DRAW,
};
pub use ports::{
    AccountBalance, AccountService, CreatorAuthorization, HeightResolver, LotteryAction,
    LotteryApi, LotteryBuy, LotteryClose, LotteryCreate, LotteryDraw, LotteryInfo, LotteryQuery,
    MainChainClient, MockMainChainClient, RandomnessOracle,
};
pub use service::{ExecutorPorts, ExecutorStats, LotteryExecutor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
