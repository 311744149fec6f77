//! Bounded per-symbol trade history.

use std::collections::VecDeque;
use std::fmt::Write as _;

use tickmatch_types::constants::DEFAULT_TRADE_TAPE_CAPACITY;
use tickmatch_types::TradeEvent;

/// Rolling window of the most recent trades for one symbol.
#[derive(Debug)]
pub struct TradeTape {
    trades: VecDeque<TradeEvent>,
    max_history: usize,
}

impl Default for TradeTape {
    fn default() -> Self {
        Self::new(DEFAULT_TRADE_TAPE_CAPACITY)
    }
}

impl TradeTape {
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            trades: VecDeque::new(),
            max_history,
        }
    }

    pub fn add_trade(&mut self, trade: TradeEvent) {
        self.trades.push_back(trade);
        while self.trades.len() > self.max_history {
            self.trades.pop_front();
        }
    }

    /// The most recent `max_count` trades, oldest first.
    #[must_use]
    pub fn recent_trades(&self, max_count: usize) -> Vec<TradeEvent> {
        let count = max_count.min(self.trades.len());
        self.trades
            .iter()
            .skip(self.trades.len() - count)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    /// Render the retained trades as CSV, header row included.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::from(
            "trade_id,symbol,timestamp,price,quantity,side,\
             aggressive_order_id,passive_order_id,aggressive_trader_id,passive_trader_id\n",
        );
        for trade in &self.trades {
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{}",
                trade.trade_id,
                trade.symbol,
                trade.timestamp,
                trade.price,
                trade.quantity,
                trade.aggressor_side,
                trade.aggressive_order_id,
                trade.passive_order_id,
                trade.aggressive_trader_id,
                trade.passive_trader_id,
            );
        }
        out
    }
}
