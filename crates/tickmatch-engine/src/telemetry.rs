//! Engine-wide counters, latency tracking, and per-symbol statistics.
//!
//! Updates happen inline on the matching path; reads are on-demand views.

use std::collections::HashMap;

use serde_json::json;
use tickmatch_types::{Quantity, SymbolStats};

/// Inline telemetry for one engine instance.
#[derive(Debug)]
pub struct Telemetry {
    orders_processed: u64,
    orders_accepted: u64,
    orders_rejected: u64,
    orders_cancelled: u64,
    total_trades: u64,

    total_latency_ns: u64,
    latency_count: u64,
    max_latency_ns: u64,
    min_latency_ns: u64,

    symbol_stats: HashMap<String, SymbolStats>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders_processed: 0,
            orders_accepted: 0,
            orders_rejected: 0,
            orders_cancelled: 0,
            total_trades: 0,
            total_latency_ns: 0,
            latency_count: 0,
            max_latency_ns: 0,
            min_latency_ns: u64::MAX,
            symbol_stats: HashMap::new(),
        }
    }

    // =================================================================
    // Recording
    // =================================================================

    pub fn record_order_processed(&mut self) {
        self.orders_processed += 1;
    }

    pub fn record_order_accepted(&mut self) {
        self.orders_accepted += 1;
    }

    pub fn record_order_rejected(&mut self) {
        self.orders_rejected += 1;
    }

    pub fn record_order_cancelled(&mut self) {
        self.orders_cancelled += 1;
    }

    pub fn record_trade(&mut self, symbol: &str, quantity: Quantity) {
        self.total_trades += 1;
        let stats = self.symbol_stats.entry(symbol.to_string()).or_default();
        stats.trade_count += 1;
        stats.trade_volume += quantity;
    }

    pub fn record_latency(&mut self, latency_ns: u64) {
        self.total_latency_ns += latency_ns;
        self.latency_count += 1;
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }
        if latency_ns < self.min_latency_ns {
            self.min_latency_ns = latency_ns;
        }
    }

    /// Overwrite a symbol's book statistics after a handled request.
    pub fn update_symbol_stats(&mut self, symbol: &str, stats: SymbolStats) {
        self.symbol_stats.insert(symbol.to_string(), stats);
    }

    // =================================================================
    // Views
    // =================================================================

    #[must_use]
    pub fn orders_processed(&self) -> u64 {
        self.orders_processed
    }

    #[must_use]
    pub fn orders_accepted(&self) -> u64 {
        self.orders_accepted
    }

    #[must_use]
    pub fn orders_rejected(&self) -> u64 {
        self.orders_rejected
    }

    #[must_use]
    pub fn orders_cancelled(&self) -> u64 {
        self.orders_cancelled
    }

    #[must_use]
    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    #[must_use]
    pub fn avg_latency_ns(&self) -> u64 {
        if self.latency_count > 0 {
            self.total_latency_ns / self.latency_count
        } else {
            0
        }
    }

    #[must_use]
    pub fn max_latency_ns(&self) -> u64 {
        self.max_latency_ns
    }

    #[must_use]
    pub fn min_latency_ns(&self) -> u64 {
        if self.min_latency_ns == u64::MAX {
            0
        } else {
            self.min_latency_ns
        }
    }

    #[must_use]
    pub fn symbol_stats(&self, symbol: &str) -> Option<&SymbolStats> {
        self.symbol_stats.get(symbol)
    }

    /// All metrics as one JSON document.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut symbols = serde_json::Map::new();
        for (symbol, stats) in &self.symbol_stats {
            symbols.insert(symbol.clone(), stats.to_json());
        }

        json!({
            "orders_processed": self.orders_processed,
            "orders_accepted": self.orders_accepted,
            "orders_rejected": self.orders_rejected,
            "orders_cancelled": self.orders_cancelled,
            "total_trades": self.total_trades,
            "avg_latency_ns": self.avg_latency_ns(),
            "max_latency_ns": self.max_latency_ns,
            "min_latency_ns": self.min_latency_ns(),
            "symbols": serde_json::Value::Object(symbols),
        })
    }

    /// Zero every counter and drop per-symbol stats.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut telemetry = Telemetry::new();
        telemetry.record_order_processed();
        telemetry.record_order_processed();
        telemetry.record_order_accepted();
        telemetry.record_order_rejected();
        telemetry.record_trade("TEST", 40);
        telemetry.record_trade("TEST", 10);

        assert_eq!(telemetry.orders_processed(), 2);
        assert_eq!(telemetry.orders_accepted(), 1);
        assert_eq!(telemetry.orders_rejected(), 1);
        assert_eq!(telemetry.total_trades(), 2);

        let stats = telemetry.symbol_stats("TEST").unwrap();
        assert_eq!(stats.trade_count, 2);
        assert_eq!(stats.trade_volume, 50);
    }

    #[test]
    fn latency_min_max_avg() {
        let mut telemetry = Telemetry::new();
        assert_eq!(telemetry.min_latency_ns(), 0);
        assert_eq!(telemetry.avg_latency_ns(), 0);

        telemetry.record_latency(100);
        telemetry.record_latency(300);
        assert_eq!(telemetry.avg_latency_ns(), 200);
        assert_eq!(telemetry.min_latency_ns(), 100);
        assert_eq!(telemetry.max_latency_ns(), 300);
    }

    #[test]
    fn json_includes_symbols() {
        let mut telemetry = Telemetry::new();
        telemetry.record_trade("A", 5);
        let json = telemetry.to_json();
        assert_eq!(json["total_trades"], 1);
        assert_eq!(json["symbols"]["A"]["trade_count"], 1);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut telemetry = Telemetry::new();
        telemetry.record_order_processed();
        telemetry.record_trade("A", 5);
        telemetry.record_latency(10);

        telemetry.reset();
        assert_eq!(telemetry.orders_processed(), 0);
        assert_eq!(telemetry.total_trades(), 0);
        assert_eq!(telemetry.min_latency_ns(), 0);
        assert!(telemetry.symbol_stats("A").is_none());
    }
}
