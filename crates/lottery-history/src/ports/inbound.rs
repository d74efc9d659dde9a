//! # Inbound Ports (Driving Ports)
//!
//! Write and query APIs of the history indexer. Both read from or produce
//! writes for a caller-supplied ordered store, so the indexer itself holds
//! no data.

use crate::domain::{BuyRecord, DrawRecord, HistoryQuery, HistoryResult};
use shared_types::{Address, BatchOperation, KeyValueStore, Receipt};

/// Derives index writes from executor receipts.
pub trait HistoryWriter: Send + Sync {
    /// Writes that add every Buy and Draw entry of `receipt`.
    fn index(&self, receipt: &Receipt) -> HistoryResult<Vec<BatchOperation>>;

    /// Deletes that undo [`HistoryWriter::index`] for the same receipt.
    fn revert(&self, receipt: &Receipt) -> HistoryResult<Vec<BatchOperation>>;
}

/// Paginated and point queries over the indices.
pub trait HistoryApi: Send + Sync {
    /// Draw results of one lottery.
    fn list_draws(
        &self,
        store: &dyn KeyValueStore,
        query: &HistoryQuery,
    ) -> HistoryResult<Vec<DrawRecord>>;

    /// Tickets one address bought in one lottery.
    ///
    /// ## Returns
    ///
    /// - `Err(MissingAddress)`: `query.address` is `None`
    fn list_buys(
        &self,
        store: &dyn KeyValueStore,
        query: &HistoryQuery,
    ) -> HistoryResult<Vec<BuyRecord>>;

    /// Draw results for the given rounds; rounds never drawn are omitted.
    fn round_lucky_numbers(
        &self,
        store: &dyn KeyValueStore,
        lottery_id: &str,
        rounds: &[u64],
    ) -> HistoryResult<Vec<DrawRecord>>;

    /// Every ticket `address` bought in `round`, in sequence order.
    fn buys_in_round(
        &self,
        store: &dyn KeyValueStore,
        lottery_id: &str,
        address: &Address,
        round: u64,
    ) -> HistoryResult<Vec<BuyRecord>>;
}
