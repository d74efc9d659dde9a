//! # Lottery Receipt Logs
//!
//! Typed audit payloads appended to every successful action's receipt.
//! The history indexer consumes the Buy and Draw variants.

use crate::algorithms::WinningTicket;
use crate::domain::{LotteryPhase, LotteryResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, ReceiptLog};
use std::collections::BTreeMap;

pub const TY_LOG_LOTTERY_CREATE: u32 = 801;
pub const TY_LOG_LOTTERY_BUY: u32 = 802;
pub const TY_LOG_LOTTERY_DRAW: u32 = 803;
pub const TY_LOG_LOTTERY_CLOSE: u32 = 804;

/// Action-specific part of a receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotteryEvent {
    Created,
    Bought {
        round: u64,
        number: u32,
        amount: u64,
        way: u32,
        buyer: Address,
        index: u64,
        time: i64,
        tx_hash: String,
    },
    Drawn {
        round: u64,
        lucky_number: u32,
        time: i64,
        tx_hash: String,
        /// Winning tickets per buyer; empty when nobody won.
        winners: BTreeMap<Address, Vec<WinningTicket>>,
    },
    Closed,
}

/// Audit entry of one lottery action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryReceipt {
    pub lottery_id: String,
    pub phase: LotteryPhase,
    pub prev_phase: LotteryPhase,
    pub event: LotteryEvent,
}

impl LotteryReceipt {
    /// Receipt log type of this entry.
    pub fn log_type(&self) -> u32 {
        match self.event {
            LotteryEvent::Created => TY_LOG_LOTTERY_CREATE,
            LotteryEvent::Bought { .. } => TY_LOG_LOTTERY_BUY,
            LotteryEvent::Drawn { .. } => TY_LOG_LOTTERY_DRAW,
            LotteryEvent::Closed => TY_LOG_LOTTERY_CLOSE,
        }
    }

    /// Encode as a receipt log.
    pub fn to_log(&self) -> LotteryResult<ReceiptLog> {
        Ok(ReceiptLog {
            ty: self.log_type(),
            log: bincode::serialize(self)?,
        })
    }

    /// Decode a receipt log. Returns `None` for logs of other types.
    pub fn from_log(log: &ReceiptLog) -> Option<LotteryResult<Self>> {
        if !(TY_LOG_LOTTERY_CREATE..=TY_LOG_LOTTERY_CLOSE).contains(&log.ty) {
            return None;
        }
        Some(bincode::deserialize(&log.log).map_err(Into::into))
    }
}
