//! Integration test: the replay law.
//!
//! Feeding the input-typed records of an event log into a fresh engine with
//! the same symbol configuration must reproduce the output-typed records —
//! identical types, order, and field values.

use std::path::PathBuf;

use tickmatch_book::compute_trade_digest;
use tickmatch_engine::{EventLog, LogEntry, LogEntryKind, MatchingEngine};
use tickmatch_types::{
    CancelRequest, NewOrderRequest, OrderId, OrderType, ReplaceRequest, Side, StpPolicy,
    SymbolConfig, TimeInForce, TradeEvent, TraderId,
};

fn temp_log(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "tickmatch-replay-{tag}-{}.jsonl",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn symbols() -> Vec<SymbolConfig> {
    let alpha = SymbolConfig::with_defaults("ALPHA");
    let mut beta = SymbolConfig::with_defaults("BETA");
    beta.stp_policy = StpPolicy::CancelResting;
    vec![alpha, beta]
}

fn order(
    id: u64,
    symbol: &str,
    side: Side,
    price: i64,
    quantity: u64,
    tif: TimeInForce,
) -> NewOrderRequest {
    NewOrderRequest {
        order_id: OrderId(id),
        trader_id: TraderId(1 + id % 4),
        symbol: symbol.into(),
        side,
        order_type: OrderType::Limit,
        price,
        quantity,
        time_in_force: tif,
        timestamp: 0,
    }
}

/// A session that exercises accepts, rejects, partial fills, IOC, FOK,
/// market orders, cancels, and replaces across two symbols.
fn drive_session(engine: &mut MatchingEngine) {
    use Side::{Buy, Sell};
    use TimeInForce::{Day, Fok, Ioc};

    engine.handle_new_order(&order(1, "ALPHA", Sell, 10_000, 100, Day));
    engine.handle_new_order(&order(2, "ALPHA", Sell, 10_001, 50, Day));
    engine.handle_new_order(&order(3, "ALPHA", Buy, 10_001, 120, Day));
    engine.handle_new_order(&order(4, "ALPHA", Buy, 9_999, 40, Day));

    // Rejections are part of the journal too.
    engine.handle_new_order(&order(5, "MISSING", Buy, 10_000, 10, Day));
    engine.handle_new_order(&order(6, "ALPHA", Buy, 0, 10, Day));

    let mut market = order(7, "BETA", Buy, -1, 30, Day);
    market.order_type = OrderType::Market;
    engine.handle_new_order(&market);

    engine.handle_new_order(&order(8, "BETA", Sell, 20_000, 80, Day));
    engine.handle_new_order(&order(9, "BETA", Buy, 20_000, 200, Ioc));
    engine.handle_new_order(&order(10, "BETA", Buy, 20_000, 500, Fok));

    engine.handle_replace(&ReplaceRequest {
        order_id: OrderId(4),
        symbol: "ALPHA".into(),
        new_price: 10_002,
        new_quantity: 60,
        timestamp: 0,
    });

    engine.handle_cancel(&CancelRequest {
        order_id: OrderId(2),
        symbol: "ALPHA".into(),
        timestamp: 0,
    });
    engine.handle_cancel(&CancelRequest {
        order_id: OrderId(999),
        symbol: "ALPHA".into(),
        timestamp: 0,
    });
}

fn replay_inputs(engine: &mut MatchingEngine, entries: &[LogEntry]) {
    for entry in entries.iter().filter(|e| e.kind.is_input()) {
        match entry.kind {
            LogEntryKind::NewOrder => {
                let request: NewOrderRequest = entry.decode().unwrap();
                engine.handle_new_order(&request);
            }
            LogEntryKind::Cancel => {
                let request: CancelRequest = entry.decode().unwrap();
                engine.handle_cancel(&request);
            }
            LogEntryKind::Replace => {
                let request: ReplaceRequest = entry.decode().unwrap();
                engine.handle_replace(&request);
            }
            _ => unreachable!("filtered to inputs"),
        }
    }
}

fn outputs(entries: &[LogEntry]) -> Vec<(LogEntryKind, serde_json::Value)> {
    entries
        .iter()
        .filter(|e| !e.kind.is_input())
        .map(|e| (e.kind, e.data.clone()))
        .collect()
}

#[test]
fn replaying_inputs_reproduces_outputs_exactly() {
    let original_path = temp_log("original");
    let replayed_path = temp_log("replayed");

    let mut original = MatchingEngine::deterministic(&original_path);
    for config in symbols() {
        assert!(original.add_symbol(config));
    }
    drive_session(&mut original);
    original.event_log_mut().flush();

    let original_entries = EventLog::load_log(&original_path).unwrap();
    assert!(
        original_entries.iter().any(|e| e.kind.is_input()),
        "journal has no inputs"
    );
    assert!(
        original_entries.iter().any(|e| !e.kind.is_input()),
        "journal has no outputs"
    );

    let mut replayed = MatchingEngine::deterministic(&replayed_path);
    for config in symbols() {
        assert!(replayed.add_symbol(config));
    }
    replay_inputs(&mut replayed, &original_entries);
    replayed.event_log_mut().flush();

    let replayed_entries = EventLog::load_log(&replayed_path).unwrap();

    let original_outputs = outputs(&original_entries);
    let replayed_outputs = outputs(&replayed_entries);

    assert_eq!(
        original_outputs.len(),
        replayed_outputs.len(),
        "output record count diverged"
    );
    for (i, ((kind_a, data_a), (kind_b, data_b))) in original_outputs
        .iter()
        .zip(replayed_outputs.iter())
        .enumerate()
    {
        assert_eq!(kind_a, kind_b, "output {i} kind diverged");
        assert_eq!(data_a, data_b, "output {i} payload diverged");
    }

    let _ = std::fs::remove_file(&original_path);
    let _ = std::fs::remove_file(&replayed_path);
}

#[test]
fn replayed_trade_stream_has_identical_digest() {
    let original_path = temp_log("digest-a");
    let replayed_path = temp_log("digest-b");

    let mut original = MatchingEngine::deterministic(&original_path);
    for config in symbols() {
        original.add_symbol(config);
    }
    drive_session(&mut original);
    original.event_log_mut().flush();

    let entries = EventLog::load_log(&original_path).unwrap();

    let mut replayed = MatchingEngine::deterministic(&replayed_path);
    for config in symbols() {
        replayed.add_symbol(config);
    }
    replay_inputs(&mut replayed, &entries);
    replayed.event_log_mut().flush();

    let decode_trades = |entries: &[LogEntry]| -> Vec<TradeEvent> {
        entries
            .iter()
            .filter(|e| e.kind == LogEntryKind::Trade)
            .map(|e| e.decode().unwrap())
            .collect()
    };

    let original_trades = decode_trades(&entries);
    let replayed_trades = decode_trades(&EventLog::load_log(&replayed_path).unwrap());

    assert!(!original_trades.is_empty(), "session produced no trades");
    assert_eq!(
        compute_trade_digest(&original_trades),
        compute_trade_digest(&replayed_trades)
    );

    let _ = std::fs::remove_file(&original_path);
    let _ = std::fs::remove_file(&replayed_path);
}

#[test]
fn non_deterministic_engine_journals_nothing() {
    let path = temp_log("nondet");
    let mut engine = MatchingEngine::new();
    engine.event_log_mut().set_log_path(&path);
    engine.add_symbol(SymbolConfig::with_defaults("ALPHA"));
    engine.handle_new_order(&order(1, "ALPHA", Side::Buy, 10_000, 10, TimeInForce::Day));
    engine.event_log_mut().flush();

    assert!(!engine.is_deterministic());
    assert!(!path.exists() || std::fs::read_to_string(&path).unwrap().is_empty());
    let _ = std::fs::remove_file(&path);
}
