//! # Domain Entities
//!
//! The persisted lottery record and its purchase aggregates.

use super::missing::MissingTable;
use super::value_objects::{HeightMark, LotteryPhase};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeMap;

/// One purchased ticket. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Guessed number in `[0, 100000)`.
    pub number: u32,
    /// Raw bet tier (`way`).
    pub way: u32,
    /// Amount in whole coins.
    pub amount: u64,
    /// Global sequence index of the buying transaction.
    pub index: u64,
}

/// A buyer's position in the current round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseAggregate {
    /// Coins bought this round.
    pub amount_one_round: u64,
    /// Raw winnings (`multiplier * amount`) accumulated at draw time.
    pub fund_win: u64,
    /// Tickets in purchase order.
    pub tickets: Vec<Ticket>,
}

/// Persisted state of one lottery instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryRecord {
    /// `0x`-hex of the creating transaction hash.
    pub id: String,
    pub phase: LotteryPhase,
    pub round: u64,
    pub purchase_window: u64,
    pub draw_window: u64,
    pub created_at: HeightMark,
    pub last_to_purchase: HeightMark,
    pub last_to_draw: HeightMark,
    pub creator: Address,
    /// Escrowed stake in whole coins.
    pub fund_pool: u64,
    pub op_reward_ratio: u64,
    pub dev_reward_ratio: u64,
    pub purchase_records: BTreeMap<Address, PurchaseAggregate>,
    pub total_purchase_count: u64,
    pub lucky_number: u32,
    pub missing: MissingTable,
}

/// Parameters for a fresh record.
#[derive(Clone, Debug)]
pub struct NewLottery {
    pub id: String,
    pub creator: Address,
    pub purchase_window: u64,
    pub draw_window: u64,
    pub op_reward_ratio: u64,
    pub dev_reward_ratio: u64,
    pub created_at: HeightMark,
}

impl LotteryRecord {
    /// A record in phase Created, round 0, with an empty pool.
    pub fn new(params: NewLottery) -> Self {
        Self {
            id: params.id,
            phase: LotteryPhase::Created,
            round: 0,
            purchase_window: params.purchase_window,
            draw_window: params.draw_window,
            created_at: params.created_at,
            last_to_purchase: params.created_at,
            last_to_draw: HeightMark::default(),
            creator: params.creator,
            fund_pool: 0,
            op_reward_ratio: params.op_reward_ratio,
            dev_reward_ratio: params.dev_reward_ratio,
            purchase_records: BTreeMap::new(),
            total_purchase_count: 0,
            lucky_number: 0,
            missing: MissingTable::default(),
        }
    }

    /// Record a ticket under `buyer`, opening an aggregate if needed.
    pub fn add_ticket(&mut self, buyer: &Address, ticket: Ticket) {
        let aggregate = self.purchase_records.entry(buyer.clone()).or_default();
        aggregate.amount_one_round += ticket.amount;
        aggregate.tickets.push(ticket);
    }

    /// Drop every aggregate and reset the purchase counter.
    pub fn clear_purchases(&mut self) {
        self.purchase_records.clear();
        self.total_purchase_count = 0;
    }

    /// Coins bought this round across all buyers.
    pub fn outstanding_amount(&self) -> u64 {
        self.purchase_records
            .values()
            .map(|agg| agg.amount_one_round)
            .sum()
    }

    /// Buyers holding tickets this round, in key order.
    pub fn buyers(&self) -> impl Iterator<Item = &Address> {
        self.purchase_records.keys()
    }
}
