//! # Multi-Round Coin Conservation
//!
//! Two lotteries run side by side for many rounds with random tickets.
//! No coin is ever created or destroyed: the sum of balance plus frozen over
//! every participant, operator and developer included, never changes.

use super::fixtures::{Chain, COIN, DEVELOPER, OPERATOR};
use lottery_executor::LotteryPhase;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BUYERS: [&str; 4] = ["alice", "bob", "carol", "dave"];
const CREATORS: [&str; 2] = ["creator-a", "creator-b"];

fn total_holdings(chain: &Chain) -> u64 {
    BUYERS
        .iter()
        .chain(CREATORS.iter())
        .chain([OPERATOR, DEVELOPER].iter())
        .map(|who| chain.holdings(who))
        .sum()
}

fn funded_chain() -> Chain {
    let funded: Vec<(&str, u64)> = BUYERS.iter().map(|b| (*b, 1_000_000)).collect();
    let mut chain = Chain::new(&CREATORS, &funded);
    chain.next_block();
    chain
}

#[test]
fn test_coins_conserved_across_rounds_and_close() {
    let mut rng = StdRng::seed_from_u64(20_181_010);
    let mut chain = funded_chain();
    let initial = total_holdings(&chain);
    assert_eq!(initial, 4 * 1_000_000 * COIN);

    let lottery_a = chain.create(CREATORS[0], 30, 20);
    let lottery_b = chain.create(CREATORS[1], 0, 0);
    let lotteries = [(lottery_a.clone(), CREATORS[0]), (lottery_b.clone(), CREATORS[1])];

    for round in 1..=12u64 {
        chain.next_block();
        let open = chain.height;

        for block in 0..10 {
            if block > 0 {
                chain.next_block();
            }
            for (id, _) in &lotteries {
                let tickets = if block == 0 { 1 } else { rng.gen_range(0..3) };
                for _ in 0..tickets {
                    let buyer = BUYERS[rng.gen_range(0..BUYERS.len())];
                    let way = [1u32, 2, 3, 5][rng.gen_range(0..4)];
                    chain
                        .buy(
                            buyer,
                            id,
                            rng.gen_range(1..300),
                            rng.gen_range(0..100_000),
                            way,
                        )
                        .unwrap();
                }
            }
        }
        assert_eq!(total_holdings(&chain), initial);

        chain.advance_to(open + 40);
        for (id, creator) in &lotteries {
            let before = chain.info(id);
            assert_eq!(before.round, round);
            chain.draw(creator, id).unwrap();

            let after = chain.info(id);
            assert_eq!(after.phase, LotteryPhase::Drawed);
            assert!(after.fund_pool <= before.fund_pool);
            assert!(chain.frozen(creator) >= after.fund_pool * COIN);
            assert!(chain.node.purchase_addresses(id).unwrap().is_empty());
        }
        assert_eq!(total_holdings(&chain), initial);
    }

    // One more partial round, then close both.
    chain.next_block();
    let alice_before = chain.holdings("alice");
    let bob_before = chain.holdings("bob");
    chain.buy("alice", &lottery_a, 50, 1, 1).unwrap();
    chain.buy("bob", &lottery_b, 70, 2, 2).unwrap();
    assert_eq!(chain.holdings("alice"), alice_before - 50 * COIN);

    chain.next_block();
    for (id, creator) in &lotteries {
        chain.close(creator, id).unwrap();
        let info = chain.info(id);
        assert_eq!(info.phase, LotteryPhase::Closed);
        assert!(chain.frozen(creator) >= info.fund_pool * COIN);
    }
    assert_eq!(chain.holdings("alice"), alice_before);
    assert_eq!(chain.holdings("bob"), bob_before);
    assert_eq!(chain.node.balance(&"alice".into()).unwrap().frozen, 0);
    assert_eq!(total_holdings(&chain), initial);

    // Terminal: nothing else is accepted.
    chain.next_block();
    assert!(chain.buy("carol", &lottery_a, 1, 1, 1).is_err());
    assert!(chain.draw(CREATORS[0], &lottery_a).is_err());
    assert!(chain.close(CREATORS[0], &lottery_a).is_err());
    assert_eq!(total_holdings(&chain), initial);
}

#[test]
fn test_operator_and_developer_shares_accumulate() {
    let mut chain = funded_chain();
    let id = chain.create(CREATORS[0], 30, 20);

    // One ticket per last digit: some ticket always wins.
    for _ in 0..3 {
        chain.next_block();
        let open = chain.height;
        chain.buy("alice", &id, 100, 0, 1).unwrap();
        for digit in 1..10 {
            chain.buy("bob", &id, 100, digit, 1).unwrap();
        }
        chain.advance_to(open + 40);
        chain.draw(CREATORS[0], &id).unwrap();
    }

    let op = chain.holdings(OPERATOR);
    let dev = chain.holdings(DEVELOPER);
    assert!(op > 0);
    assert!(dev > 0);
    // 30 vs 20 per mille of the same base.
    assert_eq!(op * 2, dev * 3);
}
