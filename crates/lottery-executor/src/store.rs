//! # Lottery Record Store
//!
//! Persists one [`LotteryRecord`] per identifier at `lottery/<id>`.

use crate::domain::{LotteryError, LotteryRecord, LotteryResult};
use shared_types::{KeyValue, KeyValueStore};
use tracing::debug;

/// Prefix of every lottery record key.
pub const LOTTERY_KEY_PREFIX: &str = "lottery/";

/// State key of a lottery record.
pub fn lottery_key(id: &str) -> Vec<u8> {
    format!("{LOTTERY_KEY_PREFIX}{id}").into_bytes()
}

/// Load a record if present.
pub fn load_lottery(state: &dyn KeyValueStore, id: &str) -> LotteryResult<Option<LotteryRecord>> {
    match state.get(&lottery_key(id))? {
        Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
        None => Ok(None),
    }
}

/// Load a record that must exist.
pub fn find_lottery(state: &dyn KeyValueStore, id: &str) -> LotteryResult<LotteryRecord> {
    load_lottery(state, id)?.ok_or_else(|| {
        debug!(lottery_id = id, "lottery not found");
        LotteryError::NotFound(id.to_string())
    })
}

/// Write a record and return the write for the receipt.
pub fn save_lottery(state: &mut dyn KeyValueStore, record: &LotteryRecord) -> LotteryResult<KeyValue> {
    let key = lottery_key(&record.id);
    let value = bincode::serialize(record)?;
    state.put(&key, &value)?;
    Ok(KeyValue::new(key, value))
}
