//! Integration test: cross-engine equivalence.
//!
//! The optimized book and the brute-force reference oracle must produce
//! identical trade streams and identical externally observable state for any
//! legal request stream. A fixed-seed random stream keeps the run
//! reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tickmatch_book::{compute_trade_digest, BookValidator};
use tickmatch_types::{Order, OrderId, OrderType, Side, StpPolicy, TimeInForce, TraderId};

fn random_order(rng: &mut StdRng, order_id: u64) -> Order {
    let side = if rng.gen_bool(0.5) {
        Side::Buy
    } else {
        Side::Sell
    };
    let order_type = if rng.gen_bool(0.9) {
        OrderType::Limit
    } else {
        OrderType::Market
    };
    let time_in_force = match rng.gen_range(0..10) {
        0 => TimeInForce::Ioc,
        1 => TimeInForce::Fok,
        2 => TimeInForce::Gtc,
        _ => TimeInForce::Day,
    };

    let mut order = Order::limit(
        order_id,
        rng.gen_range(1..=8),
        "FUZZ",
        side,
        10_000 + rng.gen_range(-50..=50),
        rng.gen_range(1..=500),
    )
    .with_tif(time_in_force);
    if order_type == OrderType::Market {
        order.order_type = OrderType::Market;
        order.price = -1;
    }
    order
}

fn run_fuzz(seed: u64, stp_policy: StpPolicy) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut validator = BookValidator::new("FUZZ", stp_policy);

    let mut resting_ids: Vec<u64> = Vec::new();

    for step in 0..1_000u64 {
        let now = step + 1;
        let action = rng.gen_range(0..10);

        let result = if action < 7 || resting_ids.is_empty() {
            let order_id = step + 1;
            let order = random_order(&mut rng, order_id);
            if order.is_limit()
                && order.time_in_force != TimeInForce::Ioc
                && order.time_in_force != TimeInForce::Fok
            {
                resting_ids.push(order_id);
            }
            validator.add_order(order, now)
        } else if action < 9 {
            let idx = rng.gen_range(0..resting_ids.len());
            let order_id = resting_ids.swap_remove(idx);
            validator.cancel_order(OrderId(order_id))
        } else {
            let idx = rng.gen_range(0..resting_ids.len());
            let order_id = resting_ids[idx];
            let new_price = 10_000 + rng.gen_range(-50..=50);
            let new_quantity = rng.gen_range(1..=500);
            validator.replace_order(OrderId(order_id), new_price, new_quantity, now)
        };

        assert!(
            result.passed(),
            "divergence at step {step} under {stp_policy}:\n{}",
            result.summary()
        );

        let state = validator.compare_states();
        assert!(
            state.passed(),
            "state divergence at step {step} under {stp_policy}:\n{}",
            state.summary()
        );
    }
}

#[test]
fn fuzz_cancel_incoming() {
    run_fuzz(0x5EED_0001, StpPolicy::CancelIncoming);
}

#[test]
fn fuzz_cancel_resting() {
    run_fuzz(0x5EED_0002, StpPolicy::CancelResting);
}

#[test]
fn fuzz_cancel_both() {
    run_fuzz(0x5EED_0003, StpPolicy::CancelBoth);
}

#[test]
fn fuzz_stp_none() {
    run_fuzz(0x5EED_0004, StpPolicy::None);
}

#[test]
fn identical_streams_produce_identical_digests() {
    use tickmatch_book::{OrderBook, ReferenceBook};

    let mut rng = StdRng::seed_from_u64(0xD16E_57);
    let mut optimized = OrderBook::new("FUZZ", StpPolicy::CancelIncoming);
    let mut reference = ReferenceBook::new("FUZZ", StpPolicy::CancelIncoming);

    let mut optimized_stream = Vec::new();
    let mut reference_stream = Vec::new();

    for step in 0..1_000u64 {
        let order = random_order(&mut rng, step + 1);
        let now = step + 1;
        optimized_stream.extend(optimized.add_order(order.clone(), now));
        reference_stream.extend(reference.add_order(order, now));
    }

    assert!(!optimized_stream.is_empty(), "fuzz produced no trades");
    assert_eq!(
        compute_trade_digest(&optimized_stream),
        compute_trade_digest(&reference_stream),
        "trade streams diverged"
    );
}

#[test]
fn fuzz_respects_trader_isolation_under_stp() {
    // With CANCEL_* policies no trade may ever cross the same trader.
    let mut rng = StdRng::seed_from_u64(0x0A11_CE);
    let mut book = tickmatch_book::OrderBook::new("FUZZ", StpPolicy::CancelResting);

    for step in 0..1_000u64 {
        let order = random_order(&mut rng, step + 1);
        for trade in book.add_order(order, step + 1) {
            assert_ne!(
                trade.aggressive_trader_id, trade.passive_trader_id,
                "self-trade produced at step {step}"
            );
        }
    }
}

#[test]
fn fuzz_trader_ids_valid_in_trades() {
    let mut rng = StdRng::seed_from_u64(0x7AB5);
    let mut book = tickmatch_book::OrderBook::new("FUZZ", StpPolicy::None);

    for step in 0..500u64 {
        let order = random_order(&mut rng, step + 1);
        for trade in book.add_order(order, step + 1) {
            assert!(TraderId(trade.aggressive_trader_id.0).is_valid());
            assert!(trade.quantity > 0);
            assert!(trade.price > 0);
        }
    }
}
