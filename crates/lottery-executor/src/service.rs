//! # Lottery Executor Service
//!
//! The lottery state machine. Each action loads the record, runs its guards
//! in a fixed order, issues ledger calls, persists the record and appends a
//! typed audit log.
//!
//! ## Atomicity
//!
//! All writes, ledger writes included, go to the `state` handed in by the
//! host. The host runs every action against an `OverlayStore` and commits it
//! only on `Ok`, so a failure at any point leaves no trace.
//!
//! ## Heights
//!
//! Window checks are written once against [`HeightMark::reference`]. The
//! injected [`HeightResolver`] decides whether that is the local height or a
//! main-chain height.

use crate::algorithms::{is_valid_number, lucky_number_from_hash, settle_round};
use crate::config::LotteryConfig;
use crate::domain::{
    invariant_reward_ratios, invariant_windows, LotteryError, LotteryPhase, LotteryRecord,
    LotteryResult, NewLottery, Ticket,
};
use crate::events::{LotteryEvent, LotteryReceipt};
use crate::ports::inbound::{
    LotteryApi, LotteryBuy, LotteryClose, LotteryCreate, LotteryDraw, LotteryInfo, LotteryQuery,
};
use crate::ports::outbound::{
    AccountService, CreatorAuthorization, HeightResolver, RandomnessOracle,
};
use crate::store::{find_lottery, load_lottery, save_lottery};

use parking_lot::Mutex;
use shared_types::{Address, KeyValueStore, Receipt, TxContext};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outbound capabilities the executor is wired with.
#[derive(Clone)]
pub struct ExecutorPorts {
    pub ledger: Arc<dyn AccountService>,
    pub oracle: Arc<dyn RandomnessOracle>,
    pub heights: Arc<dyn HeightResolver>,
    pub authorization: Arc<dyn CreatorAuthorization>,
}

/// Counters kept across actions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Actions that returned a receipt.
    pub accepted: u64,
    /// Actions that returned an error.
    pub rejected: u64,
    /// Rounds drawn.
    pub draws: u64,
    /// Minor units paid out by draws, shares included.
    pub paid_out: u64,
}

/// The lottery state machine.
pub struct LotteryExecutor {
    config: LotteryConfig,
    ports: ExecutorPorts,
    stats: Mutex<ExecutorStats>,
}

impl LotteryExecutor {
    pub fn new(config: LotteryConfig, ports: ExecutorPorts) -> Self {
        Self {
            config,
            ports,
            stats: Mutex::new(ExecutorStats::default()),
        }
    }

    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> ExecutorStats {
        self.stats.lock().clone()
    }

    fn track(&self, action: &'static str, result: LotteryResult<Receipt>) -> LotteryResult<Receipt> {
        let mut stats = self.stats.lock();
        match &result {
            Ok(_) => stats.accepted += 1,
            Err(e) => {
                stats.rejected += 1;
                debug!(action, error = %e, "action rejected");
            }
        }
        result
    }

    /// Coins to ledger minor units.
    fn to_minor(&self, coins: u64) -> LotteryResult<u64> {
        coins
            .checked_mul(self.config.coin_precision)
            .ok_or(LotteryError::Overflow("coin precision"))
    }

    /// Fail with `InsufficientFunds` unless the creator's frozen balance
    /// covers `required` minor units.
    fn ensure_frozen(
        &self,
        state: &dyn KeyValueStore,
        record: &LotteryRecord,
        exec: &Address,
        required: u64,
    ) -> LotteryResult<()> {
        let account = self.ports.ledger.load_account(state, &record.creator, exec)?;
        if account.frozen < required {
            warn!(
                lottery_id = %record.id,
                required,
                frozen = account.frozen,
                "creator frozen balance too low"
            );
            return Err(LotteryError::InsufficientFunds {
                required,
                frozen: account.frozen,
            });
        }
        Ok(())
    }

    fn create_inner(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryCreate,
    ) -> LotteryResult<Receipt> {
        let lottery_id = ctx.tx_hash_hex();

        invariant_reward_ratios(payload.op_reward_ratio, payload.dev_reward_ratio)?;

        if !self.ports.authorization.is_authorized(state, &ctx.from) {
            warn!(from = %ctx.from, "creator not on allow-list");
            return Err(LotteryError::NotAuthorized(ctx.from.clone()));
        }

        invariant_windows(
            payload.purchase_window,
            payload.draw_window,
            self.config.min_purchase_window,
            self.config.min_draw_window,
        )?;

        if load_lottery(state, &lottery_id)?.is_some() {
            warn!(%lottery_id, "lottery already exists");
            return Err(LotteryError::DuplicateLottery(lottery_id));
        }

        let created_at = self.ports.heights.resolve(ctx)?;
        let record = LotteryRecord::new(NewLottery {
            id: lottery_id.clone(),
            creator: ctx.from.clone(),
            purchase_window: payload.purchase_window,
            draw_window: payload.draw_window,
            op_reward_ratio: payload.op_reward_ratio,
            dev_reward_ratio: payload.dev_reward_ratio,
            created_at,
        });

        let kv = save_lottery(state, &record)?;
        let log = LotteryReceipt {
            lottery_id: lottery_id.clone(),
            phase: record.phase,
            prev_phase: record.phase,
            event: LotteryEvent::Created,
        }
        .to_log()?;

        info!(
            %lottery_id,
            creator = %record.creator,
            purchase_window = record.purchase_window,
            draw_window = record.draw_window,
            "lottery created"
        );
        Ok(Receipt {
            kv: vec![kv],
            logs: vec![log],
        })
    }

    fn buy_inner(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryBuy,
    ) -> LotteryResult<Receipt> {
        let mut record = find_lottery(state, &payload.lottery_id)?;
        let prev_phase = record.phase;

        if prev_phase == LotteryPhase::Closed {
            warn!(lottery_id = %record.id, "buy on closed lottery");
            return Err(LotteryError::InvalidPhase("lottery is closed".into()));
        }

        if prev_phase == LotteryPhase::Drawed && ctx.height <= record.last_to_draw.local {
            warn!(
                lottery_id = %record.id,
                height = ctx.height,
                last_draw = record.last_to_draw.local,
                "buy at or below draw height"
            );
            return Err(LotteryError::InvalidPhase(format!(
                "height {} not past draw height {}",
                ctx.height, record.last_to_draw.local
            )));
        }

        let now = self.ports.heights.resolve(ctx)?;
        if prev_phase.opens_round() {
            record.phase = LotteryPhase::Purchase;
            record.round += 1;
            record.last_to_purchase = now;
            debug!(lottery_id = %record.id, round = record.round, "round opened");
        }

        let elapsed = now.elapsed_since(&record.last_to_purchase);
        if elapsed > record.purchase_window {
            warn!(
                lottery_id = %record.id,
                elapsed,
                window = record.purchase_window,
                "purchase window expired"
            );
            return Err(LotteryError::PurchaseWindowExpired {
                elapsed,
                window: record.purchase_window,
            });
        }

        if ctx.from == record.creator {
            return Err(LotteryError::CreatorCannotBuy);
        }
        if payload.amount == 0 {
            return Err(LotteryError::InvalidAmount(payload.amount));
        }
        if !is_valid_number(payload.number) {
            return Err(LotteryError::InvalidNumber(payload.number));
        }

        let minor = self.to_minor(payload.amount)?;
        let index = ctx
            .global_index(self.config.max_txs_per_block)
            .ok_or(LotteryError::Overflow("ticket index"))?;
        let exec = &ctx.exec_address;
        let mut receipt = self
            .ports
            .ledger
            .transfer(state, &ctx.from, &record.creator, exec, minor)?;
        receipt.merge(self.ports.ledger.freeze(state, &record.creator, exec, minor)?);

        record.add_ticket(
            &ctx.from,
            Ticket {
                number: payload.number,
                way: payload.way,
                amount: payload.amount,
                index,
            },
        );
        record.fund_pool = record
            .fund_pool
            .checked_add(payload.amount)
            .ok_or(LotteryError::Overflow("fund pool"))?;
        record.total_purchase_count += 1;

        receipt.kv.push(save_lottery(state, &record)?);
        receipt.logs.push(
            LotteryReceipt {
                lottery_id: record.id.clone(),
                phase: record.phase,
                prev_phase,
                event: LotteryEvent::Bought {
                    round: record.round,
                    number: payload.number,
                    amount: payload.amount,
                    way: payload.way,
                    buyer: ctx.from.clone(),
                    index,
                    time: ctx.block_time,
                    tx_hash: ctx.tx_hash_hex(),
                },
            }
            .to_log()?,
        );

        debug!(
            lottery_id = %record.id,
            round = record.round,
            buyer = %ctx.from,
            number = payload.number,
            amount = payload.amount,
            way = payload.way,
            "ticket bought"
        );
        Ok(receipt)
    }

    fn draw_inner(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryDraw,
    ) -> LotteryResult<Receipt> {
        let mut record = find_lottery(state, &payload.lottery_id)?;
        let prev_phase = record.phase;

        if prev_phase != LotteryPhase::Purchase {
            warn!(lottery_id = %record.id, phase = %prev_phase, "draw outside purchase phase");
            return Err(LotteryError::InvalidPhase(format!(
                "cannot draw in phase {prev_phase}"
            )));
        }

        if ctx.from != record.creator {
            warn!(lottery_id = %record.id, from = %ctx.from, "draw by non-creator");
            return Err(LotteryError::NotAuthorized(ctx.from.clone()));
        }

        let now = self.ports.heights.resolve(ctx)?;
        let elapsed = now.elapsed_since(&record.last_to_purchase);
        if elapsed < record.draw_window {
            warn!(
                lottery_id = %record.id,
                elapsed,
                window = record.draw_window,
                "draw window not reached"
            );
            return Err(LotteryError::InvalidPhase(format!(
                "draw window not reached: {elapsed} < {}",
                record.draw_window
            )));
        }

        let reference = self.ports.heights.randomness_height(&now);
        let hash = self
            .ports
            .oracle
            .random_hash(reference, self.config.rand_sample_blocks)?;
        let lucky = lucky_number_from_hash(&hash)?;
        if !is_valid_number(lucky) {
            return Err(LotteryError::InvalidLuckyNumber);
        }
        debug!(lottery_id = %record.id, reference, lucky, "lucky number resolved");

        let settlement = settle_round(&mut record, lucky, self.config.coin_precision)?;
        let required = settlement.required_frozen()?;
        let exec = &ctx.exec_address;
        if required > 0 {
            self.ensure_frozen(state, &record, exec, required)?;
        }

        let mut receipt = Receipt::default();
        let creator = record.creator.clone();
        for payout in &settlement.buyer_payouts {
            receipt.merge(self.ports.ledger.transfer_frozen(
                state,
                &creator,
                &payout.to,
                exec,
                payout.amount,
            )?);
        }
        for (to, amount) in [
            (&self.config.op_reward_addr, settlement.op_share),
            (&self.config.dev_reward_addr, settlement.dev_share),
        ] {
            if amount > 0 {
                receipt.merge(
                    self.ports
                        .ledger
                        .transfer_frozen(state, &creator, to, exec, amount)?,
                );
            }
        }

        record.fund_pool = settlement.fund_after;
        record.clear_purchases();
        record.missing.record(lucky);
        record.lucky_number = lucky;
        record.phase = LotteryPhase::Drawed;
        record.last_to_draw = now;

        receipt.kv.push(save_lottery(state, &record)?);
        receipt.logs.push(
            LotteryReceipt {
                lottery_id: record.id.clone(),
                phase: record.phase,
                prev_phase,
                event: LotteryEvent::Drawn {
                    round: record.round,
                    lucky_number: lucky,
                    time: ctx.block_time,
                    tx_hash: ctx.tx_hash_hex(),
                    winners: settlement.winners,
                },
            }
            .to_log()?,
        );

        {
            let mut stats = self.stats.lock();
            stats.draws += 1;
            stats.paid_out = stats.paid_out.saturating_add(required);
        }
        info!(
            lottery_id = %record.id,
            round = record.round,
            lucky,
            total_winnings = settlement.total_winnings,
            factor = settlement.factor,
            fund_pool = record.fund_pool,
            "round drawn"
        );
        Ok(receipt)
    }

    fn close_inner(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryClose,
    ) -> LotteryResult<Receipt> {
        if !self.config.close_enabled {
            return Err(LotteryError::CloseDisabled);
        }

        let mut record = find_lottery(state, &payload.lottery_id)?;
        let prev_phase = record.phase;

        if ctx.from != record.creator {
            warn!(lottery_id = %record.id, from = %ctx.from, "close by non-creator");
            return Err(LotteryError::CloseUnauthorized(ctx.from.clone()));
        }
        if prev_phase == LotteryPhase::Closed {
            return Err(LotteryError::InvalidPhase("lottery already closed".into()));
        }

        let outstanding = record.outstanding_amount();
        let mut receipt = Receipt::default();
        if outstanding > 0 {
            let exec = &ctx.exec_address;
            self.ensure_frozen(state, &record, exec, self.to_minor(outstanding)?)?;
            for (buyer, aggregate) in &record.purchase_records {
                if aggregate.amount_one_round == 0 {
                    continue;
                }
                let refund = self.to_minor(aggregate.amount_one_round)?;
                receipt.merge(self.ports.ledger.transfer_frozen(
                    state,
                    &record.creator,
                    buyer,
                    exec,
                    refund,
                )?);
            }
        }

        record.fund_pool = record.fund_pool.saturating_sub(outstanding);
        record.clear_purchases();
        record.phase = LotteryPhase::Closed;

        receipt.kv.push(save_lottery(state, &record)?);
        receipt.logs.push(
            LotteryReceipt {
                lottery_id: record.id.clone(),
                phase: record.phase,
                prev_phase,
                event: LotteryEvent::Closed,
            }
            .to_log()?,
        );

        info!(lottery_id = %record.id, refunded = outstanding, "lottery closed");
        Ok(receipt)
    }
}

impl LotteryApi for LotteryExecutor {
    #[instrument(skip(self, state, ctx, payload), fields(from = %ctx.from, height = ctx.height))]
    fn create(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryCreate,
    ) -> LotteryResult<Receipt> {
        self.track("create", self.create_inner(state, ctx, payload))
    }

    #[instrument(skip(self, state, ctx, payload), fields(lottery_id = %payload.lottery_id, from = %ctx.from, height = ctx.height))]
    fn buy(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryBuy,
    ) -> LotteryResult<Receipt> {
        self.track("buy", self.buy_inner(state, ctx, payload))
    }

    #[instrument(skip(self, state, ctx, payload), fields(lottery_id = %payload.lottery_id, from = %ctx.from, height = ctx.height))]
    fn draw(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryDraw,
    ) -> LotteryResult<Receipt> {
        self.track("draw", self.draw_inner(state, ctx, payload))
    }

    #[instrument(skip(self, state, ctx, payload), fields(lottery_id = %payload.lottery_id, from = %ctx.from, height = ctx.height))]
    fn close(
        &self,
        state: &mut dyn KeyValueStore,
        ctx: &TxContext,
        payload: &LotteryClose,
    ) -> LotteryResult<Receipt> {
        self.track("close", self.close_inner(state, ctx, payload))
    }
}

impl LotteryQuery for LotteryExecutor {
    fn lottery_info(
        &self,
        state: &dyn KeyValueStore,
        lottery_id: &str,
    ) -> LotteryResult<LotteryInfo> {
        let record = find_lottery(state, lottery_id)?;
        Ok(LotteryInfo {
            id: record.id,
            creator: record.creator,
            phase: record.phase,
            round: record.round,
            fund_pool: record.fund_pool,
            purchase_window: record.purchase_window,
            draw_window: record.draw_window,
            created_at: record.created_at,
            last_to_purchase: record.last_to_purchase,
            last_to_draw: record.last_to_draw,
            lucky_number: record.lucky_number,
            total_purchase_count: record.total_purchase_count,
            op_reward_ratio: record.op_reward_ratio,
            dev_reward_ratio: record.dev_reward_ratio,
            missing: record.missing,
        })
    }

    fn purchase_addresses(
        &self,
        state: &dyn KeyValueStore,
        lottery_id: &str,
    ) -> LotteryResult<Vec<Address>> {
        let record = find_lottery(state, lottery_id)?;
        Ok(record.buyers().cloned().collect())
    }
}
