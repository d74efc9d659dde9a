//! # Lottery History
//!
//! Append-only secondary indices over executed lottery actions:
//!
//! - **Draw history** per lottery, one entry per drawn round.
//! - **Buy history** per lottery and address, one entry per ticket.
//!
//! Entries are derived from the Buy and Draw logs of executor receipts, so
//! the indices can always be rebuilt by replaying receipts, and rolled back
//! by reverting them.
//!
//! ## Pagination
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `round = 0` | start at the newest (descending) or oldest (ascending) end |
//! | `round > 0` | resume strictly after the `(round, index)` cursor |
//! | `count` | `0` selects the default page (20), capped at 100 |
//!
//! Entries that fail to decode are skipped, never fatal.

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    BuyRecord, DrawRecord, HistoryConfig, HistoryError, HistoryQuery, HistoryResult,
    BUY_HISTORY_PREFIX, DRAW_HISTORY_PREFIX,
};
pub use ports::{HistoryApi, HistoryWriter};
pub use service::{HistoryIndexer, HistoryStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
