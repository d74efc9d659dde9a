//! # Scripts Through The Runtime
//!
//! Scripts are built as JSON values, parsed into [`Script`] and replayed
//! against a fresh node. Lottery ids come back through the report.

use lottery_executor::LotteryPhase;
use lottery_history::HistoryQuery;
use lottery_runtime::{run_script, LotteryNode, RuntimeConfig, Script, ScriptReport};
use serde_json::{json, Value};
use shared_types::Address;
use std::collections::HashMap;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn config(vars: &[(&str, &str)]) -> RuntimeConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    RuntimeConfig::from_lookup(|var| vars.get(var).cloned()).unwrap()
}

fn script(value: Value) -> Script {
    serde_json::from_value(value).unwrap()
}

fn create_two(node: &mut LotteryNode) -> (String, String) {
    let report = run_script(
        node,
        &script(json!({
            "deposits": [
                { "address": "alice", "amount": 1000 },
                { "address": "bob", "amount": 1000 }
            ],
            "blocks": [
                { "height": 1, "time": 1000, "txs": [
                    { "from": "north", "action": { "action": "create", "purchase_window": 30, "draw_window": 40 } },
                    { "from": "south", "action": { "action": "create", "purchase_window": 35, "draw_window": 45,
                      "op_reward_ratio": 10, "dev_reward_ratio": 10 } }
                ]}
            ]
        })),
    )
    .unwrap();
    assert!(report.outcomes.iter().all(|o| o.is_ok()));
    assert_eq!(report.lotteries.len(), 2);
    (report.lotteries[0].id.clone(), report.lotteries[1].id.clone())
}

fn buy(from: &str, id: &str, amount: u64, number: u32, way: u32) -> Value {
    json!({
        "from": from,
        "action": { "action": "buy", "lottery_id": id, "amount": amount, "number": number, "way": way }
    })
}

fn draw(from: &str, id: &str) -> Value {
    json!({ "from": from, "action": { "action": "draw", "lottery_id": id } })
}

fn errors(report: &ScriptReport) -> Vec<Option<String>> {
    report.outcomes.iter().map(|o| o.error.clone()).collect()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_scripts_continue_on_same_node() {
    let mut node = LotteryNode::in_memory(&config(&[("LOTTERY_CREATORS", "north, south")])).unwrap();
    let (north, south) = create_two(&mut node);
    assert_ne!(north, south);
    assert_eq!(node.lottery_info(&south).unwrap().op_reward_ratio, 10);

    let report = run_script(
        &mut node,
        &script(json!({
            "blocks": [
                { "height": 2, "time": 1010, "txs": [
                    buy("alice", &north, 10, 42, 1),
                    buy("bob", &south, 20, 77_777, 5),
                    buy("north", &north, 1, 1, 1)
                ]},
                { "height": 3, "time": 1020, "txs": [ buy("bob", &north, 5, 9, 3) ] },
                { "height": 42, "time": 1400, "txs": [ draw("north", &north), draw("south", &south) ] },
                { "height": 47, "time": 1460, "txs": [ draw("south", &south) ] }
            ]
        })),
    )
    .unwrap();

    let errors = errors(&report);
    assert_eq!(errors.len(), 7);
    assert_eq!(errors[2].as_deref(), Some("Creator cannot buy"));
    // South's draw window is 45 from height 2.
    assert!(errors[5].as_deref().is_some_and(|e| e.starts_with("Invalid phase")));
    assert_eq!(
        errors.iter().filter(|e| e.is_none()).count(),
        5,
        "unexpected rejections: {errors:?}"
    );
    // No create in this script, so no lottery summary.
    assert!(report.lotteries.is_empty());

    for id in [&north, &south] {
        let info = node.lottery_info(id).unwrap();
        assert_eq!(info.phase, LotteryPhase::Drawed);
        assert_eq!(info.round, 1);
        let draws = node
            .history()
            .list_draws(&HistoryQuery::draws(id.as_str()))
            .unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].number, info.lucky_number);
    }

    let bob = node
        .history()
        .list_buys(&HistoryQuery::buys(north.as_str(), "bob"))
        .unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!((bob[0].number, bob[0].way, bob[0].time), (9, 3, 1020));
    assert_eq!(bob[0].index, 300_000);
}

#[test]
fn test_report_serializes_outcomes() {
    let mut node = LotteryNode::in_memory(&config(&[("LOTTERY_CREATORS", "north,south")])).unwrap();
    let (north, _) = create_two(&mut node);

    let report = run_script(
        &mut node,
        &script(json!({
            "blocks": [{ "height": 5, "txs": [
                buy("alice", &north, 1, 100_000, 1),
                buy("alice", &north, 1, 5, 1)
            ]}]
        })),
    )
    .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    let outcomes = value["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["action"], "buy");
    assert_eq!(outcomes[0]["error"], "Invalid number: 100000");
    assert!(outcomes[1]["error"].is_null());
    assert_eq!(outcomes[1]["index"], 1);
    assert!(outcomes[1]["tx_hash"].as_str().unwrap().starts_with("0x"));

    let back: ScriptReport = serde_json::from_value(value).unwrap();
    assert_eq!(back, report);
}

#[test]
fn test_close_rejected_when_disabled() {
    let mut node = LotteryNode::in_memory(&config(&[
        ("LOTTERY_CREATORS", "north,south"),
        ("LOTTERY_CLOSE_ENABLED", "false"),
    ]))
    .unwrap();
    let (north, _) = create_two(&mut node);
    let alice_before = node.balance(&Address::from("alice")).unwrap();

    let report = run_script(
        &mut node,
        &script(json!({
            "blocks": [
                { "height": 2, "txs": [ buy("alice", &north, 30, 1, 2) ] },
                { "height": 3, "txs": [
                    { "from": "north", "action": { "action": "close", "lottery_id": north } }
                ]}
            ]
        })),
    )
    .unwrap();

    assert_eq!(errors(&report), vec![None, Some("Close disabled".to_string())]);
    let info = node.lottery_info(&north).unwrap();
    assert_eq!(info.phase, LotteryPhase::Purchase);
    assert_eq!(info.fund_pool, 30);

    let alice_after = node.balance(&Address::from("alice")).unwrap();
    assert_eq!(
        alice_before.balance - alice_after.balance,
        30 * node.coin_precision()
    );
}

#[test]
fn test_unknown_action_fails_to_parse() {
    let result: Result<Script, _> = serde_json::from_value(json!({
        "blocks": [{ "height": 1, "txs": [
            { "from": "north", "action": { "action": "withdraw", "lottery_id": "0x00" } }
        ]}]
    }));
    assert!(result.is_err());
}
