//! # Numbers Lottery Benchmarks
//!
//! | Area | What is measured |
//! |------|------------------|
//! | Settlement | `settle_round` over rounds of growing ticket counts |
//! | Lucky number | derivation from a 32-byte hash |
//! | History | indexing receipts and paging through buy history |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lottery_executor::algorithms::lucky_number_from_hash;
use lottery_executor::domain::NewLottery;
use lottery_executor::{
    settle_round, HeightMark, LotteryEvent, LotteryPhase, LotteryReceipt, LotteryRecord, Ticket,
};
use lottery_history::{HistoryApi, HistoryIndexer, HistoryQuery, HistoryWriter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{Address, InMemoryKVStore, KeyValueStore, ListDirection, Receipt};
use std::time::Duration;

const COIN: u64 = 100_000_000;
const LOTTERY_ID: &str = "0x62656e6368";

// ============================================================================
// SETTLEMENT
// ============================================================================

fn round_with_tickets(tickets: usize, rng: &mut StdRng) -> LotteryRecord {
    let mut record = LotteryRecord::new(NewLottery {
        id: LOTTERY_ID.into(),
        creator: Address::from("creator"),
        purchase_window: 30,
        draw_window: 40,
        op_reward_ratio: 30,
        dev_reward_ratio: 20,
        created_at: HeightMark::local(1),
    });
    for i in 0..tickets {
        let buyer = Address::from(format!("buyer-{}", i % 64).as_str());
        let amount = rng.gen_range(1..500);
        record.add_ticket(
            &buyer,
            Ticket {
                number: rng.gen_range(0..100_000),
                way: [1u32, 2, 3, 5][rng.gen_range(0..4)],
                amount,
                index: i as u64,
            },
        );
        record.fund_pool += amount;
        record.total_purchase_count += 1;
    }
    record
}

fn bench_settle_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement");
    group.measurement_time(Duration::from_secs(5));
    let mut rng = StdRng::seed_from_u64(7);

    for size in [10usize, 100, 1_000, 10_000] {
        let record = round_with_tickets(size, &mut rng);
        let lucky = rng.gen_range(0..100_000);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("settle_round", size), &record, |b, record| {
            b.iter_batched(
                || record.clone(),
                |mut record| black_box(settle_round(&mut record, lucky, COIN)),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_lucky_number(c: &mut Criterion) {
    let hash: [u8; 32] = StdRng::seed_from_u64(11).gen();
    c.bench_function("lucky_number_from_hash", |b| {
        b.iter(|| black_box(lucky_number_from_hash(black_box(&hash))))
    });
}

// ============================================================================
// HISTORY
// ============================================================================

fn buy_receipt(buyer: &Address, round: u64, index: u64) -> Receipt {
    let log = LotteryReceipt {
        lottery_id: LOTTERY_ID.into(),
        phase: LotteryPhase::Purchase,
        prev_phase: LotteryPhase::Purchase,
        event: LotteryEvent::Bought {
            round,
            number: (index % 100_000) as u32,
            amount: 1,
            way: 1,
            buyer: buyer.clone(),
            index,
            time: index as i64,
            tx_hash: format!("0x{index:064x}"),
        },
    }
    .to_log()
    .unwrap();
    Receipt {
        kv: Vec::new(),
        logs: vec![log],
    }
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");
    let indexer = HistoryIndexer::default();
    let buyer = Address::from("alice");

    let receipts: Vec<Receipt> = (0..1_000u64)
        .map(|i| buy_receipt(&buyer, i / 50 + 1, i))
        .collect();
    group.throughput(Throughput::Elements(receipts.len() as u64));
    group.bench_function("index_1000_buys", |b| {
        b.iter(|| {
            let mut store = InMemoryKVStore::new();
            for receipt in &receipts {
                let ops = indexer.index(receipt).unwrap();
                store.atomic_batch_write(ops).unwrap();
            }
            black_box(store.len())
        })
    });

    let mut store = InMemoryKVStore::new();
    for receipt in &receipts {
        store
            .atomic_batch_write(indexer.index(receipt).unwrap())
            .unwrap();
    }
    group.throughput(Throughput::Elements(20));
    for direction in [ListDirection::Descending, ListDirection::Ascending] {
        group.bench_with_input(
            BenchmarkId::new("list_buys_page_20", format!("{direction:?}")),
            &direction,
            |b, direction| {
                b.iter(|| {
                    let query = HistoryQuery::buys(LOTTERY_ID, buyer.clone())
                        .after(10, Some(500))
                        .with_direction(*direction);
                    black_box(indexer.list_buys(&store, &query).unwrap())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_settle_round, bench_lucky_number, bench_history);
criterion_main!(benches);
