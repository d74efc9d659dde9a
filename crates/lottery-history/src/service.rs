//! # History Indexer Service
//!
//! Turns executor receipts into draw and buy index entries and answers
//! queries over them. Entries are append-only; a block rollback replays the
//! same receipts through [`HistoryWriter::revert`].

use crate::domain::{
    buy_key, buy_prefix, buy_round_prefix, draw_key, draw_prefix, BuyRecord, DrawRecord,
    HistoryConfig, HistoryError, HistoryQuery, HistoryResult,
};
use crate::ports::{HistoryApi, HistoryWriter};
use lottery_executor::{LotteryEvent, LotteryReceipt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use shared_types::{Address, BatchOperation, KeyValueStore, Receipt};
use tracing::{debug, instrument, warn};

/// Counters since start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub indexed: u64,
    pub reverted: u64,
    /// Malformed entries skipped by queries.
    pub skipped: u64,
}

/// Receipt-driven history indexer.
pub struct HistoryIndexer {
    config: HistoryConfig,
    stats: Mutex<HistoryStats>,
}

impl HistoryIndexer {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            stats: Mutex::new(HistoryStats::default()),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn stats(&self) -> HistoryStats {
        *self.stats.lock()
    }

    /// Index entries carried by `receipt` as `(key, encoded record)`.
    fn entries(receipt: &Receipt) -> HistoryResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries = Vec::new();
        for log in &receipt.logs {
            let decoded = match LotteryReceipt::from_log(log) {
                None => continue,
                Some(decoded) => decoded.map_err(|e| HistoryError::Receipt(e.to_string()))?,
            };
            match decoded.event {
                LotteryEvent::Bought {
                    round,
                    number,
                    amount,
                    way,
                    buyer,
                    index,
                    time,
                    tx_hash,
                } => {
                    let record = BuyRecord {
                        number,
                        amount,
                        round,
                        way,
                        index,
                        time,
                        tx_hash,
                    };
                    entries.push((
                        buy_key(&decoded.lottery_id, &buyer, round, index),
                        bincode::serialize(&record)?,
                    ));
                }
                LotteryEvent::Drawn {
                    round,
                    lucky_number,
                    time,
                    tx_hash,
                    ..
                } => {
                    let record = DrawRecord {
                        number: lucky_number,
                        round,
                        time,
                        tx_hash,
                    };
                    entries.push((
                        draw_key(&decoded.lottery_id, round),
                        bincode::serialize(&record)?,
                    ));
                }
                LotteryEvent::Created | LotteryEvent::Closed => {}
            }
        }
        Ok(entries)
    }

    /// Decode listed values, dropping the ones that do not parse.
    fn decode_all<T: DeserializeOwned>(&self, index: &'static str, values: Vec<Vec<u8>>) -> Vec<T> {
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match bincode::deserialize(&value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed history entry");
                    self.stats.lock().skipped += 1;
                }
            }
        }
        records
    }
}

impl Default for HistoryIndexer {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryWriter for HistoryIndexer {
    #[instrument(skip(self, receipt), fields(logs = receipt.logs.len()))]
    fn index(&self, receipt: &Receipt) -> HistoryResult<Vec<BatchOperation>> {
        let ops: Vec<_> = Self::entries(receipt)?
            .into_iter()
            .map(|(key, value)| BatchOperation::put(key, value))
            .collect();
        self.stats.lock().indexed += ops.len() as u64;
        debug!(entries = ops.len(), "indexed receipt");
        Ok(ops)
    }

    #[instrument(skip(self, receipt), fields(logs = receipt.logs.len()))]
    fn revert(&self, receipt: &Receipt) -> HistoryResult<Vec<BatchOperation>> {
        let ops: Vec<_> = Self::entries(receipt)?
            .into_iter()
            .map(|(key, _)| BatchOperation::delete(key))
            .collect();
        self.stats.lock().reverted += ops.len() as u64;
        debug!(entries = ops.len(), "reverted receipt");
        Ok(ops)
    }
}

impl HistoryApi for HistoryIndexer {
    fn list_draws(
        &self,
        store: &dyn KeyValueStore,
        query: &HistoryQuery,
    ) -> HistoryResult<Vec<DrawRecord>> {
        let cursor = (query.round != 0).then(|| draw_key(&query.lottery_id, query.round));
        let count = self.config.page_size(query.count);
        debug!(
            lottery_id = %query.lottery_id,
            round = query.round,
            count,
            direction = ?query.direction,
            "listing draws"
        );
        let values = store.list(
            &draw_prefix(&query.lottery_id),
            cursor.as_deref(),
            count,
            query.direction,
        )?;
        Ok(self.decode_all("draw", values))
    }

    fn list_buys(
        &self,
        store: &dyn KeyValueStore,
        query: &HistoryQuery,
    ) -> HistoryResult<Vec<BuyRecord>> {
        let address = query.address.as_ref().ok_or(HistoryError::MissingAddress)?;
        let cursor = (query.round != 0).then(|| {
            buy_key(
                &query.lottery_id,
                address,
                query.round,
                query.index.unwrap_or(0),
            )
        });
        let count = self.config.page_size(query.count);
        debug!(
            lottery_id = %query.lottery_id,
            %address,
            round = query.round,
            count,
            "listing buys"
        );
        let values = store.list(
            &buy_prefix(&query.lottery_id, address),
            cursor.as_deref(),
            count,
            query.direction,
        )?;
        Ok(self.decode_all("buy", values))
    }

    fn round_lucky_numbers(
        &self,
        store: &dyn KeyValueStore,
        lottery_id: &str,
        rounds: &[u64],
    ) -> HistoryResult<Vec<DrawRecord>> {
        let mut values = Vec::with_capacity(rounds.len());
        for round in rounds {
            if let Some(value) = store.get(&draw_key(lottery_id, *round))? {
                values.push(value);
            }
        }
        Ok(self.decode_all("draw", values))
    }

    fn buys_in_round(
        &self,
        store: &dyn KeyValueStore,
        lottery_id: &str,
        address: &Address,
        round: u64,
    ) -> HistoryResult<Vec<BuyRecord>> {
        let values = store
            .prefix_scan(&buy_round_prefix(lottery_id, address, round))?
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        Ok(self.decode_all("buy", values))
    }
}
