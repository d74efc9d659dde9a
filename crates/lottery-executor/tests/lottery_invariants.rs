//! # Lottery Invariant Tests
//!
//! Drives the executor through many randomized rounds and checks the fund
//! and missing-number invariants after every draw, then exercises the
//! dependent-chain height path end to end.
//!
//! ## Test Categories
//!
//! 1. **Fund conservation** - pool never grows on draw, escrow always covers the pool
//! 2. **Exhaustion protection** - scaled rounds pay at most half the pool
//! 3. **Missing counters** - exactly nine counters per position move per draw
//! 4. **Parachain timing** - windows measured on main-chain heights

use lottery_executor::adapters::{
    BlockHashOracle, BlockingMainChain, LocalHeightResolver, StateLedger, StaticAllowList,
};
use lottery_executor::{
    ticket_reward, AccountService, ExecutorPorts, LotteryAction, LotteryApi, LotteryBuy,
    LotteryConfig, LotteryCreate, LotteryDraw, LotteryError, LotteryExecutor, LotteryPhase,
    LotteryQuery, LotteryResult, MockMainChainClient, OracleError,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{Address, InMemoryKVStore, KeyValueStore, OverlayStore, Receipt, TxContext};
use std::sync::Arc;

// =============================================================================
// TEST HELPERS
// =============================================================================

const COIN: u64 = 100_000_000;
const BUYERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

fn exec() -> Address {
    Address::from("lottery-exec")
}

fn ctx(from: &str, height: u64, index: u32, tx_hash: [u8; 32]) -> TxContext {
    TxContext {
        tx_hash,
        from: Address::from(from),
        height,
        index,
        block_time: 1_700_000_000 + height as i64,
        exec_address: exec(),
    }
}

fn tx_hash(height: u64, index: u32) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash[..8].copy_from_slice(&height.to_be_bytes());
    hash[8..12].copy_from_slice(&index.to_be_bytes());
    hash
}

fn apply(
    executor: &LotteryExecutor,
    state: &mut InMemoryKVStore,
    ctx: &TxContext,
    action: LotteryAction,
) -> LotteryResult<Receipt> {
    let (result, batch) = {
        let mut overlay = OverlayStore::new(state);
        let result = executor.execute(&mut overlay, ctx, &action);
        (result, overlay.into_batch())
    };
    if result.is_ok() {
        state.atomic_batch_write(batch).unwrap();
    }
    result
}

fn frozen(ledger: &StateLedger, state: &InMemoryKVStore, who: &str) -> u64 {
    ledger
        .load_account(state, &Address::from(who), &exec())
        .unwrap()
        .frozen
}

// =============================================================================
// FUND CONSERVATION
// =============================================================================

#[test]
fn test_randomized_rounds_preserve_fund_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5EED_1077);
    let ledger = Arc::new(StateLedger::new());
    let oracle = Arc::new(BlockHashOracle::new());
    let config = LotteryConfig {
        op_reward_addr: Address::from("operator"),
        dev_reward_addr: Address::from("developer"),
        ..LotteryConfig::default()
    };
    let executor = LotteryExecutor::new(
        config,
        ExecutorPorts {
            ledger: ledger.clone(),
            oracle: oracle.clone(),
            heights: Arc::new(LocalHeightResolver),
            authorization: Arc::new(StaticAllowList::new([Address::from("creator")])),
        },
    );

    let mut state = InMemoryKVStore::new();
    for who in BUYERS {
        ledger
            .deposit(&mut state, &Address::from(who), &exec(), 10_000_000 * COIN)
            .unwrap();
    }

    let mut height = 1u64;
    let record_block = |h: u64, rng: &mut StdRng| {
        let mut hash = [0u8; 32];
        rng.fill(&mut hash);
        oracle.record_block(h, hash);
    };
    record_block(0, &mut rng);
    record_block(height, &mut rng);

    let create = ctx("creator", height, 0, tx_hash(height, 0));
    apply(
        &executor,
        &mut state,
        &create,
        LotteryAction::Create(LotteryCreate {
            purchase_window: 30,
            draw_window: 40,
            op_reward_ratio: 25,
            dev_reward_ratio: 15,
        }),
    )
    .unwrap();
    let id = create.tx_hash_hex();

    let mut previous_missing = executor.lottery_info(&state, &id).unwrap().missing;

    for round in 1..=25u64 {
        let mut tickets: Vec<(u32, u32, u64)> = Vec::new();
        let buys = rng.gen_range(1..12);
        for i in 0..buys {
            height += 1;
            record_block(height, &mut rng);
            let who = BUYERS[rng.gen_range(0..BUYERS.len())];
            let way = [1u32, 2, 3, 5, 4][rng.gen_range(0..5)];
            let number = rng.gen_range(0..100_000u32);
            let amount = rng.gen_range(1..500u64);
            let buy = ctx(who, height, i, tx_hash(height, i));
            apply(
                &executor,
                &mut state,
                &buy,
                LotteryAction::Buy(LotteryBuy {
                    lottery_id: id.clone(),
                    amount,
                    number,
                    way,
                }),
            )
            .unwrap();
            tickets.push((number, way, amount));
        }

        let before = executor.lottery_info(&state, &id).unwrap();
        assert_eq!(before.round, round);
        assert_eq!(before.phase, LotteryPhase::Purchase);
        assert_eq!(before.total_purchase_count, buys as u64);
        assert!(frozen(&ledger, &state, "creator") >= before.fund_pool * COIN);

        while height < before.last_to_purchase.local + 40 {
            height += 1;
            record_block(height, &mut rng);
        }
        let frozen_before = frozen(&ledger, &state, "creator");
        let draw = ctx("creator", height, 0, tx_hash(height, 99));
        apply(
            &executor,
            &mut state,
            &draw,
            LotteryAction::Draw(LotteryDraw {
                lottery_id: id.clone(),
            }),
        )
        .unwrap();

        let after = executor.lottery_info(&state, &id).unwrap();
        let paid = frozen_before - frozen(&ledger, &state, "creator");
        let total: u64 = tickets
            .iter()
            .filter_map(|(number, way, amount)| {
                ticket_reward(after.lucky_number, *number, *way).map(|p| p.multiplier * amount)
            })
            .sum();

        assert_eq!(after.phase, LotteryPhase::Drawed);
        assert!(after.fund_pool <= before.fund_pool);
        assert!(frozen(&ledger, &state, "creator") >= after.fund_pool * COIN);
        if total > before.fund_pool / 2 {
            assert_eq!(after.fund_pool, before.fund_pool / 2);
            assert!(paid * 2 <= before.fund_pool * COIN);
        } else {
            assert_eq!(after.fund_pool, before.fund_pool - total);
            assert_eq!(paid, total * COIN);
        }

        for position in 0..5 {
            let moved = (0..10)
                .filter(|digit| {
                    let now = after.missing.times(position, *digit);
                    let prev = previous_missing.times(position, *digit);
                    assert!(now >= prev);
                    now == prev + 1
                })
                .count();
            assert_eq!(moved, 9, "round {round} position {position}");
        }
        previous_missing = after.missing;

        height += 1;
        record_block(height, &mut rng);
    }

    assert_eq!(executor.stats().draws, 25);
    assert_eq!(executor.stats().rejected, 0);
}

// =============================================================================
// PARACHAIN TIMING
// =============================================================================

#[test]
fn test_parachain_windows_follow_main_heights() {
    let client = Arc::new(MockMainChainClient::with_rand(vec![0x00, 0x00, 0x30, 0x39]));
    let bridge = Arc::new(BlockingMainChain::new(client.clone()).unwrap());
    let ledger = Arc::new(StateLedger::new());
    let executor = LotteryExecutor::new(
        LotteryConfig::for_parachain(),
        ExecutorPorts {
            ledger: ledger.clone(),
            oracle: bridge.clone(),
            heights: bridge,
            authorization: Arc::new(StaticAllowList::new([Address::from("creator")])),
        },
    );

    let mut state = InMemoryKVStore::new();
    ledger
        .deposit(&mut state, &Address::from("alice"), &exec(), 1_000 * COIN)
        .unwrap();

    // Unanchored transaction: creation aborts.
    let orphan = ctx("creator", 1, 0, [0xEE; 32]);
    let err = apply(
        &executor,
        &mut state,
        &orphan,
        LotteryAction::Create(LotteryCreate {
            purchase_window: 30,
            draw_window: 40,
            op_reward_ratio: 0,
            dev_reward_ratio: 0,
        }),
    )
    .unwrap_err();
    assert_eq!(err, LotteryError::Oracle(OracleError::MainHeightUnavailable));

    let create = ctx("creator", 1, 0, [0x01; 32]);
    client.set_height(create.tx_hash, 1_000);
    apply(
        &executor,
        &mut state,
        &create,
        LotteryAction::Create(LotteryCreate {
            purchase_window: 30,
            draw_window: 40,
            op_reward_ratio: 0,
            dev_reward_ratio: 0,
        }),
    )
    .unwrap();
    let id = create.tx_hash_hex();
    assert_eq!(
        executor.lottery_info(&state, &id).unwrap().created_at.main,
        Some(1_000)
    );

    let buy = ctx("alice", 2, 0, [0x02; 32]);
    client.set_height(buy.tx_hash, 1_010);
    apply(
        &executor,
        &mut state,
        &buy,
        LotteryAction::Buy(LotteryBuy {
            lottery_id: id.clone(),
            amount: 10,
            number: 12345,
            way: 1,
        }),
    )
    .unwrap();

    // Local height barely moved, main chain only 39 ahead: too early.
    let early = ctx("creator", 3, 0, [0x03; 32]);
    client.set_height(early.tx_hash, 1_049);
    let err = apply(
        &executor,
        &mut state,
        &early,
        LotteryAction::Draw(LotteryDraw {
            lottery_id: id.clone(),
        }),
    )
    .unwrap_err();
    assert!(matches!(err, LotteryError::InvalidPhase(_)));

    let late = ctx("creator", 4, 0, [0x04; 32]);
    client.set_height(late.tx_hash, 1_050);
    apply(
        &executor,
        &mut state,
        &late,
        LotteryAction::Draw(LotteryDraw {
            lottery_id: id.clone(),
        }),
    )
    .unwrap();

    let info = executor.lottery_info(&state, &id).unwrap();
    assert_eq!(info.lucky_number, 12345);
    assert_eq!(info.last_to_draw.main, Some(1_050));
    assert_eq!(info.last_to_draw.local, 4);
    assert_eq!(info.phase, LotteryPhase::Drawed);
}
