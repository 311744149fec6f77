//! Determinism verification over trade streams.
//!
//! Two runs that are supposed to be identical — an engine and its replay, or
//! the optimized book and the reference oracle — can be compared cheaply by
//! hashing their ordered trade streams and comparing the digests.

use sha2::{Digest, Sha256};
use tickmatch_types::{Side, TradeEvent};

/// Compute a SHA-256 digest over an ordered trade stream.
///
/// The digest covers the fields the cross-engine law fixes: trade id, price,
/// quantity, aggressor side, and both order and trader ids — in stream
/// order. Engine-level sequence numbers and timestamps are excluded so the
/// digest is stable across wall-clock runs.
#[must_use]
pub fn compute_trade_digest(trades: &[TradeEvent]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"tickmatch:trade_digest:v1:");
    hasher.update((trades.len() as u64).to_le_bytes());

    for trade in trades {
        hasher.update(trade.trade_id.0.to_le_bytes());
        hasher.update(trade.symbol.as_bytes());
        hasher.update(trade.price.to_le_bytes());
        hasher.update(trade.quantity.to_le_bytes());
        hasher.update([match trade.aggressor_side {
            Side::Buy => 0u8,
            Side::Sell => 1u8,
        }]);
        hasher.update(trade.aggressive_order_id.0.to_le_bytes());
        hasher.update(trade.passive_order_id.0.to_le_bytes());
        hasher.update(trade.aggressive_trader_id.0.to_le_bytes());
        hasher.update(trade.passive_trader_id.0.to_le_bytes());
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Recompute the digest from `trades` and compare with `expected`.
#[must_use]
pub fn verify_trade_digest(trades: &[TradeEvent], expected: &[u8; 32]) -> bool {
    compute_trade_digest(trades) == *expected
}

/// Hex rendering of a trade-stream digest, for logs and summaries.
#[must_use]
pub fn trade_digest_hex(trades: &[TradeEvent]) -> String {
    hex::encode(compute_trade_digest(trades))
}

#[cfg(test)]
mod tests {
    use tickmatch_types::{OrderId, TradeId, TraderId};

    use super::*;

    fn make_trade(trade_id: u64, price: i64, quantity: u64) -> TradeEvent {
        TradeEvent {
            trade_id: TradeId(trade_id),
            symbol: "TEST".into(),
            price,
            quantity,
            aggressor_side: Side::Buy,
            aggressive_order_id: OrderId(2),
            passive_order_id: OrderId(1),
            aggressive_trader_id: TraderId(101),
            passive_trader_id: TraderId(100),
            timestamp: 0,
            sequence_number: 0,
        }
    }

    #[test]
    fn empty_stream_is_deterministic() {
        assert_eq!(compute_trade_digest(&[]), compute_trade_digest(&[]));
    }

    #[test]
    fn same_trades_same_digest() {
        let trades = vec![make_trade(1, 10_000, 5), make_trade(2, 10_001, 3)];
        assert_eq!(compute_trade_digest(&trades), compute_trade_digest(&trades));
    }

    #[test]
    fn different_trades_different_digest() {
        let a = vec![make_trade(1, 10_000, 5)];
        let b = vec![make_trade(1, 10_000, 6)];
        assert_ne!(compute_trade_digest(&a), compute_trade_digest(&b));
    }

    #[test]
    fn order_matters() {
        let t1 = make_trade(1, 10_000, 5);
        let t2 = make_trade(2, 10_001, 3);
        let ab = compute_trade_digest(&[t1.clone(), t2.clone()]);
        let ba = compute_trade_digest(&[t2, t1]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn timestamps_and_sequence_numbers_are_ignored() {
        let mut a = make_trade(1, 10_000, 5);
        let mut b = a.clone();
        a.timestamp = 111;
        a.sequence_number = 7;
        b.timestamp = 999;
        b.sequence_number = 42;
        assert_eq!(compute_trade_digest(&[a]), compute_trade_digest(&[b]));
    }

    #[test]
    fn verify_matches_compute() {
        let trades = vec![make_trade(1, 10_000, 5)];
        let digest = compute_trade_digest(&trades);
        assert!(verify_trade_digest(&trades, &digest));
        assert!(!verify_trade_digest(&trades, &[0xAB; 32]));
    }

    #[test]
    fn hex_rendering_is_64_chars() {
        assert_eq!(trade_digest_hex(&[]).len(), 64);
    }
}
