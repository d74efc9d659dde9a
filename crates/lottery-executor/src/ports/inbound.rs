//! # Inbound Ports
//!
//! API traits defining what the lottery executor can do, plus the action
//! payloads it accepts.

use crate::domain::{HeightMark, LotteryPhase, LotteryResult, MissingTable};
use serde::{Deserialize, Serialize};
use shared_types::{Address, KeyValueStore, Receipt, TxContext};

/// Create a lottery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryCreate {
    pub purchase_window: u64,
    pub draw_window: u64,
    #[serde(default)]
    pub op_reward_ratio: u64,
    #[serde(default)]
    pub dev_reward_ratio: u64,
}

/// Buy a ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryBuy {
    pub lottery_id: String,
    /// Whole coins.
    pub amount: u64,
    pub number: u32,
    /// Raw bet tier: 1, 2, 3 or 5.
    pub way: u32,
}

/// Draw the current round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryDraw {
    pub lottery_id: String,
}

/// Close a lottery for good.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryClose {
    pub lottery_id: String,
}

/// Any lottery action, as carried by a transaction payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LotteryAction {
    Create(LotteryCreate),
    Buy(LotteryBuy),
    Draw(LotteryDraw),
    Close(LotteryClose),
}

impl LotteryAction {
    /// Short action name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LotteryAction::Create(_) => "create",
            LotteryAction::Buy(_) => "buy",
            LotteryAction::Draw(_) => "draw",
            LotteryAction::Close(_) => "close",
        }
    }
}

/// Snapshot of a lottery's live state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryInfo {
    pub id: String,
    pub creator: Address,
    pub phase: LotteryPhase,
    pub round: u64,
    pub fund_pool: u64,
    pub purchase_window: u64,
    pub draw_window: u64,
    pub created_at: HeightMark,
    pub last_to_purchase: HeightMark,
    pub last_to_draw: HeightMark,
    pub lucky_number: u32,
    pub total_purchase_count: u64,
    pub op_reward_ratio: u64,
    pub dev_reward_ratio: u64,
    pub missing: MissingTable,
}

/// Lottery API - inbound port.
///
/// Each call runs against `state`, which the host treats as a write buffer:
/// on `Err` the host discards it, on `Ok` it commits it.
pub trait LotteryApi: Send + Sync {
    /// Create a lottery owned by `ctx.from`.
    fn create(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryCreate,
    ) -> LotteryResult<Receipt>;

    /// Buy a ticket as `ctx.from`.
    fn buy(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryBuy,
    ) -> LotteryResult<Receipt>;

    /// Draw the current round. Creator only.
    fn draw(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryDraw,
    ) -> LotteryResult<Receipt>;

    /// Refund outstanding tickets and close. Creator only.
    fn close(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryClose,
    ) -> LotteryResult<Receipt>;

    /// Dispatch any action.
    fn execute(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        action: &LotteryAction,
    ) -> LotteryResult<Receipt> {
        match action {
            LotteryAction::Create(payload) => self.create(state, ctx, payload),
            LotteryAction::Buy(payload) => self.buy(state, ctx, payload),
            LotteryAction::Draw(payload) => self.draw(state, ctx, payload),
            LotteryAction::Close(payload) => self.close(state, ctx, payload),
        }
    }
}

/// Lottery queries - inbound port.
pub trait LotteryQuery: Send + Sync {
    /// Live state of one lottery.
    fn lottery_info(&self, state: &dyn KeyValueStore, lottery_id: &str)
        -> LotteryResult<LotteryInfo>;

    /// Buyers holding tickets in the current round.
    fn purchase_addresses(
        &self,
        state: &dyn KeyValueStore,
        lottery_id: &str,
    ) -> LotteryResult<Vec<Address>>;
}
