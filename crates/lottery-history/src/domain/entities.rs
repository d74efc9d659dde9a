//! # History Entities
//!
//! Stored records and their key layout.
//!
//! | Index | Key |
//! |-------|-----|
//! | Draws | `lottery/draw-history/<id>/<round>` |
//! | Buys  | `lottery/buy-history/<id>/<address>/<round>/<index>` |
//!
//! Numeric segments are zero-padded to 18 digits so lexicographic key order
//! equals numeric order.

use serde::{Deserialize, Serialize};
use shared_types::Address;

pub const DRAW_HISTORY_PREFIX: &str = "lottery/draw-history/";
pub const BUY_HISTORY_PREFIX: &str = "lottery/buy-history/";

/// Result of one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub number: u32,
    pub round: u64,
    pub time: i64,
    pub tx_hash: String,
}

/// One purchased ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyRecord {
    pub number: u32,
    pub amount: u64,
    pub round: u64,
    pub way: u32,
    /// Global ticket sequence index.
    pub index: u64,
    pub time: i64,
    pub tx_hash: String,
}

pub fn draw_prefix(lottery_id: &str) -> Vec<u8> {
    format!("{DRAW_HISTORY_PREFIX}{lottery_id}/").into_bytes()
}

pub fn draw_key(lottery_id: &str, round: u64) -> Vec<u8> {
    format!("{DRAW_HISTORY_PREFIX}{lottery_id}/{round:018}").into_bytes()
}

pub fn buy_prefix(lottery_id: &str, address: &Address) -> Vec<u8> {
    format!("{BUY_HISTORY_PREFIX}{lottery_id}/{address}/").into_bytes()
}

pub fn buy_round_prefix(lottery_id: &str, address: &Address, round: u64) -> Vec<u8> {
    format!("{BUY_HISTORY_PREFIX}{lottery_id}/{address}/{round:018}/").into_bytes()
}

pub fn buy_key(lottery_id: &str, address: &Address, round: u64, index: u64) -> Vec<u8> {
    format!("{BUY_HISTORY_PREFIX}{lottery_id}/{address}/{round:018}/{index:018}").into_bytes()
}
