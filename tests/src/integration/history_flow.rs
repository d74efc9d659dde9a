//! # History Over Real Receipts
//!
//! Runs several rounds through the node, then pages through the draw and
//! buy indices the way a client would and rolls back the last block.

use super::fixtures::Chain;
use lottery_history::{BuyRecord, HistoryQuery};
use shared_types::{Address, ListDirection};

// =============================================================================
// TEST HELPERS
// =============================================================================

const ROUNDS: u64 = 6;

struct Played {
    chain: Chain,
    id: String,
    /// `(round, lucky number)` per draw.
    draws: Vec<(u64, u32)>,
    /// `(round, global index)` of alice's tickets; alice always buys first in a block.
    alice: Vec<(u64, u64)>,
}

fn play() -> Played {
    let mut chain = Chain::new(&["creator"], &[("alice", 10_000), ("bob", 10_000)]);
    chain.next_block();
    let id = chain.create("creator", 0, 0);
    let mut draws = Vec::new();
    let mut alice = Vec::new();

    for round in 1..=ROUNDS {
        chain.next_block();
        let open = chain.height;
        for step in 0..3u32 {
            if step > 0 {
                chain.next_block();
            }
            chain
                .buy("alice", &id, 1, step * 11 + round as u32, 2)
                .unwrap();
            chain.buy("bob", &id, 2, step, 1).unwrap();
            let tickets = chain
                .node
                .history()
                .buys_in_round(&id, &Address::from("alice"), round)
                .unwrap();
            // History is only visible once the block commits.
            assert_eq!(tickets.len(), step as usize);
            alice.push((round, chain.height * 100_000));
        }
        chain.advance_to(open + 40);
        chain.draw("creator", &id).unwrap();
        draws.push((round, chain.info(&id).lucky_number));
    }

    Played {
        chain,
        id,
        draws,
        alice,
    }
}

fn walk_buys(chain: &Chain, id: &str, page: usize, direction: ListDirection) -> Vec<BuyRecord> {
    let mut seen = Vec::new();
    let mut cursor: Option<(u64, u64)> = None;
    loop {
        let mut query = HistoryQuery::buys(id, "alice")
            .with_count(page)
            .with_direction(direction);
        if let Some((round, index)) = cursor {
            query = query.after(round, Some(index));
        }
        let records = chain.node.history().list_buys(&query).unwrap();
        if records.is_empty() {
            return seen;
        }
        cursor = records.last().map(|r| (r.round, r.index));
        seen.extend(records);
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

#[test]
fn test_draw_pages_walk_back_to_first_round() {
    let mut played = play();
    played.chain.next_block();
    let history = played.chain.node.history();

    let first = history
        .list_draws(&HistoryQuery::draws(played.id.as_str()).with_count(4))
        .unwrap();
    assert_eq!(
        first.iter().map(|d| d.round).collect::<Vec<_>>(),
        vec![6, 5, 4, 3]
    );

    let second = history
        .list_draws(
            &HistoryQuery::draws(played.id.as_str())
                .with_count(4)
                .after(3, None),
        )
        .unwrap();
    assert_eq!(
        second.iter().map(|d| d.round).collect::<Vec<_>>(),
        vec![2, 1]
    );

    let numbers: Vec<(u64, u32)> = first
        .iter()
        .chain(second.iter())
        .rev()
        .map(|d| (d.round, d.number))
        .collect();
    assert_eq!(numbers, played.draws);
}

#[test]
fn test_buy_pages_cover_every_ticket_once() {
    let mut played = play();
    played.chain.next_block();

    let ascending = walk_buys(&played.chain, &played.id, 4, ListDirection::Ascending);
    assert_eq!(
        ascending
            .iter()
            .map(|b| (b.round, b.index))
            .collect::<Vec<_>>(),
        played.alice
    );
    assert!(ascending.iter().all(|b| b.way == 2 && b.amount == 1));

    let descending = walk_buys(&played.chain, &played.id, 5, ListDirection::Descending);
    let mut reversed = descending.clone();
    reversed.reverse();
    assert_eq!(reversed, ascending);
}

#[test]
fn test_point_queries_match_live_state() {
    let mut played = play();
    played.chain.next_block();
    let history = played.chain.node.history();

    let lucky = history
        .round_lucky_numbers(&played.id, &[2, 4, 99])
        .unwrap();
    assert_eq!(
        lucky.iter().map(|d| (d.round, d.number)).collect::<Vec<_>>(),
        vec![played.draws[1], played.draws[3]]
    );
    assert_eq!(
        played.draws.last().map(|d| d.1),
        Some(played.chain.info(&played.id).lucky_number)
    );

    let bob = history
        .buys_in_round(&played.id, &Address::from("bob"), 3)
        .unwrap();
    assert_eq!(
        bob.iter().map(|b| b.number).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn test_oversized_page_is_capped() {
    let mut played = play();
    played.chain.next_block();
    let all = played
        .chain
        .node
        .history()
        .list_buys(&HistoryQuery::buys(played.id.as_str(), "bob").with_count(10_000))
        .unwrap();
    assert_eq!(all.len(), (ROUNDS * 3) as usize);
}

// =============================================================================
// ROLLBACK
// =============================================================================

#[test]
fn test_revert_last_block_drops_its_draw() {
    let mut played = play();
    let last_block = played.chain.next_block();
    assert_eq!(last_block.len(), 1);

    played.chain.node.revert(&last_block).unwrap();
    let latest = played
        .chain
        .node
        .history()
        .list_draws(&HistoryQuery::draws(played.id.as_str()).with_count(1))
        .unwrap();
    assert_eq!(latest[0].round, ROUNDS - 1);

    // Buy history of earlier blocks is untouched.
    let ascending = walk_buys(&played.chain, &played.id, 100, ListDirection::Ascending);
    assert_eq!(ascending.len(), played.alice.len());
}
