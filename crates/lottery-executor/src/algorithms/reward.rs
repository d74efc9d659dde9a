//! # Reward Calculator
//!
//! Maps a ticket to its prize and settles a whole round with fund-exhaustion
//! protection.
//!
//! ## Fixed-point scaling
//!
//! The scaling factor is carried as an integer in units of `1 / FACTOR_BASE`.
//! When a round's raw winnings exceed half the pool the factor becomes
//! `pool / (2 * winnings)` and the pool halves; otherwise the factor is 1 and
//! the winnings are subtracted. All intermediate products use `u128`.

use crate::domain::{BetTier, LotteryError, LotteryRecord, Ticket};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeMap;

/// Fixed-point base of the scaling factor.
pub const FACTOR_BASE: u64 = 100_000;

/// Denominator of the reward ratios.
pub const REWARD_BASE: u64 = 1_000;

/// A ticket's prize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prize {
    pub tier: BetTier,
    pub multiplier: u64,
}

/// A winning ticket, reported in the draw receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningTicket {
    /// Global sequence index of the ticket.
    pub index: u64,
    /// Tier the ticket won at.
    pub tier: BetTier,
}

/// One ledger transfer a draw will issue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payout {
    pub to: Address,
    /// Minor units.
    pub amount: u64,
}

/// Outcome of settling one round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundSettlement {
    /// Sum of `multiplier * amount` over all tickets, in coins.
    pub total_winnings: u64,
    /// Scaling factor in units of `1 / FACTOR_BASE`.
    pub factor: u64,
    /// Pool after the round, in coins.
    pub fund_after: u64,
    /// Buyer payouts in buyer key order, zero amounts omitted.
    pub buyer_payouts: Vec<Payout>,
    /// Operator share in minor units.
    pub op_share: u64,
    /// Developer share in minor units.
    pub dev_share: u64,
    /// Winning tickets per buyer.
    pub winners: BTreeMap<Address, Vec<WinningTicket>>,
}

impl RoundSettlement {
    /// Minor units the draw will move out of the creator's frozen balance.
    pub fn required_frozen(&self) -> Result<u64, LotteryError> {
        self.buyer_payouts
            .iter()
            .map(|p| p.amount)
            .chain([self.op_share, self.dev_share])
            .try_fold(0u64, |acc, amount| acc.checked_add(amount))
            .ok_or(LotteryError::Overflow("required_frozen"))
    }
}

/// Prize for a guess at a given raw tier, if any.
///
/// | tier | match | multiplier |
/// |------|-------|------------|
/// | 5 | all five digits | 100000 |
/// | 3 | last three | 1000 |
/// | 2 | last two | 100 |
/// | 1 | last one | 10 |
pub fn ticket_reward(lucky: u32, guess: u32, way: u32) -> Option<Prize> {
    let tier = BetTier::from_way(way)?;
    let modulus = tier.match_modulus();
    if lucky % modulus == guess % modulus {
        Some(Prize {
            tier,
            multiplier: tier.multiplier(),
        })
    } else {
        None
    }
}

fn narrow(value: u128, what: &'static str) -> Result<u64, LotteryError> {
    u64::try_from(value).map_err(|_| LotteryError::Overflow(what))
}

/// Raw winnings of one ticket in coins.
fn raw_winnings(lucky: u32, ticket: &Ticket) -> Result<(u64, Option<Prize>), LotteryError> {
    match ticket_reward(lucky, ticket.number, ticket.way) {
        Some(prize) => {
            let raw = prize
                .multiplier
                .checked_mul(ticket.amount)
                .ok_or(LotteryError::Overflow("ticket winnings"))?;
            Ok((raw, Some(prize)))
        }
        None => Ok((0, None)),
    }
}

/// Settle the current round against `lucky`.
///
/// Fills each aggregate's `fund_win` and returns the transfers to issue. The
/// record's pool is not touched; the caller applies `fund_after`.
pub fn settle_round(
    record: &mut LotteryRecord,
    lucky: u32,
    coin_precision: u64,
) -> Result<RoundSettlement, LotteryError> {
    let mut settlement = RoundSettlement {
        factor: FACTOR_BASE,
        fund_after: record.fund_pool,
        ..RoundSettlement::default()
    };

    let mut total: u64 = 0;
    for (buyer, aggregate) in record.purchase_records.iter_mut() {
        for ticket in &aggregate.tickets {
            let (raw, prize) = raw_winnings(lucky, ticket)?;
            if let Some(prize) = prize {
                settlement
                    .winners
                    .entry(buyer.clone())
                    .or_default()
                    .push(WinningTicket {
                        index: ticket.index,
                        tier: prize.tier,
                    });
            }
            aggregate.fund_win = aggregate
                .fund_win
                .checked_add(raw)
                .ok_or(LotteryError::Overflow("buyer winnings"))?;
            total = total
                .checked_add(raw)
                .ok_or(LotteryError::Overflow("round winnings"))?;
        }
    }
    settlement.total_winnings = total;

    if total == 0 {
        return Ok(settlement);
    }

    let fund = record.fund_pool;
    if total > fund / 2 {
        settlement.factor = narrow(
            u128::from(fund) * u128::from(FACTOR_BASE) / (2 * u128::from(total)),
            "scaling factor",
        )?;
        settlement.fund_after = fund / 2;
    } else {
        settlement.fund_after = fund - total;
    }

    let factor = u128::from(settlement.factor);
    let precision = u128::from(coin_precision);
    let op = u128::from(record.op_reward_ratio);
    let dev = u128::from(record.dev_reward_ratio);
    let keep = u128::from(REWARD_BASE)
        .checked_sub(op + dev)
        .ok_or(LotteryError::Overflow("reward ratios"))?;

    for (buyer, aggregate) in &record.purchase_records {
        if aggregate.fund_win == 0 {
            continue;
        }
        let amount = u128::from(aggregate.fund_win) * factor * precision * keep
            / (u128::from(FACTOR_BASE) * u128::from(REWARD_BASE));
        let amount = narrow(amount, "buyer payout")?;
        if amount > 0 {
            settlement.buyer_payouts.push(Payout {
                to: buyer.clone(),
                amount,
            });
        }
    }

    let scaled_unit = factor * precision / u128::from(FACTOR_BASE);
    let total = u128::from(total);
    settlement.op_share = narrow(scaled_unit * total * op / u128::from(REWARD_BASE), "op share")?;
    settlement.dev_share = narrow(
        scaled_unit * total * dev / u128::from(REWARD_BASE),
        "dev share",
    )?;

    Ok(settlement)
}
