//! # Lottery Runtime
//!
//! Host wiring around the lottery executor.
//!
//! ## Modular Structure
//!
//! - `config` - `RuntimeConfig` from JSON file or `LOTTERY_*` variables
//! - `telemetry` - tracing subscriber setup
//! - `node` - `LotteryNode`: atomic apply, history commit and revert
//! - `script` - JSON action scripts replayed against a node
//! - `adapters` - RocksDB store (`rocksdb` feature)
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, else environment) and apply CLI overrides
//! 2. Initialize tracing
//! 3. Open state and history stores
//! 4. Seed the creator allow-list into state
//! 5. Replay the script, committing history per block

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod node;
pub mod script;
pub mod telemetry;

pub use config::{RuntimeConfig, RuntimeConfigError, DEFAULT_EXEC_ADDRESS};
pub use node::{HistoryView, LotteryNode, NodeError, NodeResult};
pub use script::{run_script, Script, ScriptError, ScriptReport, TxOutcome};
pub use telemetry::{init_tracing, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
