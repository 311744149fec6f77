//! Cross-validation harness.
//!
//! Drives the same operation stream through the optimized [`OrderBook`] and
//! the [`ReferenceBook`] oracle and diffs every externally observable
//! output: trade streams, top of book, and depth.

use tickmatch_types::{Order, OrderId, Price, Quantity, StpPolicy, Timestamp, TradeEvent};

use crate::{OrderBook, ReferenceBook};

/// Outcome of one validated operation or state comparison.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub mismatches: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn add_mismatch(&mut self, mismatch: impl Into<String>) {
        self.mismatches.push(mismatch.into());
    }

    #[must_use]
    pub fn summary(&self) -> String {
        if self.passed() {
            return "PASSED".to_string();
        }
        let mut out = String::from("FAILED:\n");
        for mismatch in &self.mismatches {
            out.push_str("  - ");
            out.push_str(mismatch);
            out.push('\n');
        }
        out
    }
}

/// Runs both book implementations in lockstep.
#[derive(Debug)]
pub struct BookValidator {
    optimized: OrderBook,
    reference: ReferenceBook,
}

impl BookValidator {
    #[must_use]
    pub fn new(symbol: impl Into<String>, stp_policy: StpPolicy) -> Self {
        let symbol = symbol.into();
        Self {
            optimized: OrderBook::new(symbol.clone(), stp_policy),
            reference: ReferenceBook::new(symbol, stp_policy),
        }
    }

    pub fn add_order(&mut self, order: Order, now: Timestamp) -> ValidationResult {
        let mut result = ValidationResult::default();

        let optimized_trades = self.optimized.add_order(order.clone(), now);
        let reference_trades = self.reference.add_order(order, now);

        compare_trades(&optimized_trades, &reference_trades, &mut result);
        self.compare_top_of_book(&mut result);

        result
    }

    pub fn cancel_order(&mut self, order_id: OrderId) -> ValidationResult {
        let mut result = ValidationResult::default();

        let optimized_cancelled = self.optimized.cancel_order(order_id);
        let reference_cancelled = self.reference.cancel_order(order_id);

        if optimized_cancelled != reference_cancelled {
            result.add_mismatch(format!(
                "cancel result mismatch for {order_id}: optimized={optimized_cancelled}, reference={reference_cancelled}"
            ));
        }
        self.compare_top_of_book(&mut result);

        result
    }

    pub fn replace_order(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
        now: Timestamp,
    ) -> ValidationResult {
        let mut result = ValidationResult::default();

        let optimized_trades = self
            .optimized
            .replace_order(order_id, new_price, new_quantity, now);
        let reference_trades = self
            .reference
            .replace_order(order_id, new_price, new_quantity, now);

        compare_trades(&optimized_trades, &reference_trades, &mut result);
        self.compare_top_of_book(&mut result);

        result
    }

    /// Full state diff: top of book plus ten levels of depth.
    #[must_use]
    pub fn compare_states(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        self.compare_top_of_book(&mut result);
        self.compare_depth(&mut result);
        result
    }

    #[must_use]
    pub fn optimized(&self) -> &OrderBook {
        &self.optimized
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceBook {
        &self.reference
    }

    fn compare_top_of_book(&self, result: &mut ValidationResult) {
        let opt_bid = self.optimized.best_bid();
        let ref_bid = self.reference.best_bid();
        if opt_bid != ref_bid {
            result.add_mismatch(format!(
                "best bid mismatch: optimized={opt_bid:?}, reference={ref_bid:?}"
            ));
        }

        let opt_ask = self.optimized.best_ask();
        let ref_ask = self.reference.best_ask();
        if opt_ask != ref_ask {
            result.add_mismatch(format!(
                "best ask mismatch: optimized={opt_ask:?}, reference={ref_ask:?}"
            ));
        }

        let opt_tob = self.optimized.top_of_book(0);
        let ref_tob = self.reference.top_of_book(0);
        if opt_tob.bid_size != ref_tob.bid_size {
            result.add_mismatch(format!(
                "bid size mismatch: optimized={}, reference={}",
                opt_tob.bid_size, ref_tob.bid_size
            ));
        }
        if opt_tob.ask_size != ref_tob.ask_size {
            result.add_mismatch(format!(
                "ask size mismatch: optimized={}, reference={}",
                opt_tob.ask_size, ref_tob.ask_size
            ));
        }
    }

    fn compare_depth(&self, result: &mut ValidationResult) {
        let opt = self.optimized.depth_snapshot(10, 0);
        let reference = self.reference.depth_snapshot(10, 0);

        if opt.bids.len() != reference.bids.len() {
            result.add_mismatch(format!(
                "bid level count mismatch: optimized={}, reference={}",
                opt.bids.len(),
                reference.bids.len()
            ));
        }
        if opt.asks.len() != reference.asks.len() {
            result.add_mismatch(format!(
                "ask level count mismatch: optimized={}, reference={}",
                opt.asks.len(),
                reference.asks.len()
            ));
        }

        for (i, (o, r)) in opt.bids.iter().zip(reference.bids.iter()).enumerate() {
            if o.price != r.price || o.quantity != r.quantity || o.order_count != r.order_count {
                result.add_mismatch(format!(
                    "bid level {i} mismatch: optimized={o:?}, reference={r:?}"
                ));
            }
        }
        for (i, (o, r)) in opt.asks.iter().zip(reference.asks.iter()).enumerate() {
            if o.price != r.price || o.quantity != r.quantity || o.order_count != r.order_count {
                result.add_mismatch(format!(
                    "ask level {i} mismatch: optimized={o:?}, reference={r:?}"
                ));
            }
        }
    }
}

/// Field-level diff of two trade streams. Sequence numbers and timestamps
/// are engine concerns and excluded here.
fn compare_trades(optimized: &[TradeEvent], reference: &[TradeEvent], result: &mut ValidationResult) {
    if optimized.len() != reference.len() {
        result.add_mismatch(format!(
            "trade count mismatch: optimized={}, reference={}",
            optimized.len(),
            reference.len()
        ));
        return;
    }

    for (i, (opt, r)) in optimized.iter().zip(reference.iter()).enumerate() {
        if opt.trade_id != r.trade_id {
            result.add_mismatch(format!(
                "trade {i} id mismatch: optimized={}, reference={}",
                opt.trade_id, r.trade_id
            ));
        }
        if opt.price != r.price {
            result.add_mismatch(format!(
                "trade {i} price mismatch: optimized={}, reference={}",
                opt.price, r.price
            ));
        }
        if opt.quantity != r.quantity {
            result.add_mismatch(format!(
                "trade {i} quantity mismatch: optimized={}, reference={}",
                opt.quantity, r.quantity
            ));
        }
        if opt.aggressor_side != r.aggressor_side {
            result.add_mismatch(format!("trade {i} aggressor side mismatch"));
        }
        if opt.aggressive_order_id != r.aggressive_order_id {
            result.add_mismatch(format!("trade {i} aggressive order id mismatch"));
        }
        if opt.passive_order_id != r.passive_order_id {
            result.add_mismatch(format!("trade {i} passive order id mismatch"));
        }
    }
}

#[cfg(test)]
mod tests {
    use tickmatch_types::{Order, Side, StpPolicy};

    use super::*;

    #[test]
    fn identical_streams_pass() {
        let mut validator = BookValidator::new("TEST", StpPolicy::CancelIncoming);

        let result = validator.add_order(Order::limit(1, 100, "TEST", Side::Sell, 10_000, 60), 1);
        assert!(result.passed(), "{}", result.summary());

        let result = validator.add_order(Order::limit(2, 101, "TEST", Side::Buy, 10_000, 40), 2);
        assert!(result.passed(), "{}", result.summary());

        let result = validator.compare_states();
        assert!(result.passed(), "{}", result.summary());
    }

    #[test]
    fn cancel_and_replace_stay_in_lockstep() {
        let mut validator = BookValidator::new("TEST", StpPolicy::CancelIncoming);

        validator.add_order(Order::limit(1, 100, "TEST", Side::Buy, 10_000, 60), 1);
        validator.add_order(Order::limit(2, 101, "TEST", Side::Buy, 9_999, 40), 2);

        let result = validator.replace_order(OrderId(1), 9_998, 30, 3);
        assert!(result.passed(), "{}", result.summary());

        let result = validator.cancel_order(OrderId(2));
        assert!(result.passed(), "{}", result.summary());

        let result = validator.cancel_order(OrderId(404));
        assert!(result.passed(), "{}", result.summary());
    }

    #[test]
    fn summary_lists_mismatches() {
        let mut result = ValidationResult::default();
        assert_eq!(result.summary(), "PASSED");

        result.add_mismatch("trade 0 price mismatch");
        assert!(!result.passed());
        assert!(result.summary().contains("trade 0 price mismatch"));
    }
}
