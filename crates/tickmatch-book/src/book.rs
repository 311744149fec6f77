//! The order book and matching state machine for a single symbol.
//!
//! Uses `BTreeMap` for price-level ordering:
//! - **Bids** (buys): `BTreeMap<Reverse<Price>, PriceLevelQueue>` -- highest price first
//! - **Asks** (sells): `BTreeMap<Price, PriceLevelQueue>` -- lowest price first
//!
//! The book owns order storage in a `HashMap<OrderId, Order>`; ladders hold
//! order-id handles, so removal updates the queue and the index together.
//!
//! All operations are total: `cancel_order` of an unknown id returns `false`,
//! `replace_order` of an unknown id returns an empty trade list, and
//! `add_order` never rejects — request validation belongs to the engine.
//! The book never reads a clock; the caller supplies `now` for trade stamps.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use tickmatch_types::constants::INVALID_PRICE;
use tickmatch_types::{
    DepthSnapshot, Order, OrderId, Price, PriceLevel, Quantity, Side, StpPolicy, SymbolStats,
    Timestamp, TopOfBook, TradeEvent, TradeId,
};

use crate::price_level::PriceLevelQueue;

/// Outcome of sweeping one price level.
#[derive(Debug, PartialEq, Eq)]
enum Sweep {
    /// Move on to the next best level.
    Continue,
    /// Matching is over for this incoming order.
    Halt,
}

/// Price-time-priority order book for a single symbol.
#[derive(Debug)]
pub struct OrderBook {
    symbol: String,
    stp_policy: StpPolicy,
    /// Buy side: highest price first (`Reverse` key).
    bids: BTreeMap<Reverse<Price>, PriceLevelQueue>,
    /// Sell side: lowest price first.
    asks: BTreeMap<Price, PriceLevelQueue>,
    /// Order storage; ladders reference entries here by id.
    orders: HashMap<OrderId, Order>,
    next_trade_id: u64,
    trade_count: u64,
    total_volume: u64,
}

impl OrderBook {
    /// Create a new empty order book.
    #[must_use]
    pub fn new(symbol: impl Into<String>, stp_policy: StpPolicy) -> Self {
        Self {
            symbol: symbol.into(),
            stp_policy,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: HashMap::new(),
            next_trade_id: 0,
            trade_count: 0,
            total_volume: 0,
        }
    }

    // =================================================================
    // Order operations
    // =================================================================

    /// Execute an incoming order, returning the trades it produced in strict
    /// price-then-time priority order. A DAY/GTC remainder rests on the
    /// book; IOC and FOK remainders never rest, and MARKET orders never
    /// rest regardless of time in force.
    ///
    /// FOK orders run a fillability pre-check: if the opposing side cannot
    /// fill the entire quantity at acceptable prices, nothing is matched and
    /// no trade is produced.
    pub fn add_order(&mut self, order: Order, now: Timestamp) -> Vec<TradeEvent> {
        let mut incoming = order;

        if incoming.is_fok() && !self.is_fully_fillable(&incoming) {
            return Vec::new();
        }

        let trades = self.match_order(&mut incoming, now);

        if incoming.remaining_quantity > 0
            && incoming.is_limit()
            && !incoming.is_ioc()
            && !incoming.is_fok()
        {
            self.rest(incoming);
        }

        trades
    }

    /// Remove a resting order. Returns `false` if the id is unknown.
    pub fn cancel_order(&mut self, order_id: OrderId) -> bool {
        let Some(order) = self.orders.remove(&order_id) else {
            return false;
        };
        self.unlink(&order);
        true
    }

    /// Cancel-and-re-add with a new price and quantity. The replacement
    /// keeps the original id and all other attributes but loses time
    /// priority, and may trade immediately. Returns an empty list and makes
    /// no change if the id is unknown.
    pub fn replace_order(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
        now: Timestamp,
    ) -> Vec<TradeEvent> {
        let Some(mut order) = self.orders.remove(&order_id) else {
            return Vec::new();
        };
        self.unlink(&order);

        order.price = new_price;
        order.quantity = new_quantity;
        order.remaining_quantity = new_quantity;

        self.add_order(order, now)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Best prices with the aggregated sizes at those levels.
    #[must_use]
    pub fn top_of_book(&self, timestamp: Timestamp) -> TopOfBook {
        let mut tob = TopOfBook::empty(self.symbol.clone(), timestamp);

        if let Some((&Reverse(price), level)) = self.bids.first_key_value() {
            tob.best_bid = price;
            tob.bid_size = level.total_quantity();
        }
        if let Some((&price, level)) = self.asks.first_key_value() {
            tob.best_ask = price;
            tob.ask_size = level.total_quantity();
        }

        tob
    }

    /// Up to `depth_levels` best levels per side; bids descending, asks
    /// ascending.
    #[must_use]
    pub fn depth_snapshot(&self, depth_levels: usize, timestamp: Timestamp) -> DepthSnapshot {
        let bids = self
            .bids
            .values()
            .take(depth_levels)
            .map(level_view)
            .collect();
        let asks = self
            .asks
            .values()
            .take(depth_levels)
            .map(level_view)
            .collect();

        DepthSnapshot {
            symbol: self.symbol.clone(),
            bids,
            asks,
            timestamp,
            sequence_number: self.trade_count,
        }
    }

    /// Look up a live order by id.
    #[must_use]
    pub fn find_order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Number of orders currently resting in the book.
    #[must_use]
    pub fn active_order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of distinct bid price levels.
    #[must_use]
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[must_use]
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Cumulative statistics snapshot for telemetry.
    #[must_use]
    pub fn stats(&self) -> SymbolStats {
        let max_bid_depth = self
            .bids
            .values()
            .map(PriceLevelQueue::total_quantity)
            .max()
            .unwrap_or(0);
        let max_ask_depth = self
            .asks
            .values()
            .map(PriceLevelQueue::total_quantity)
            .max()
            .unwrap_or(0);

        SymbolStats {
            active_orders: self.orders.len() as u64,
            bid_levels: self.bids.len() as u64,
            ask_levels: self.asks.len() as u64,
            trade_volume: self.total_volume,
            trade_count: self.trade_count,
            max_bid_depth,
            max_ask_depth,
            best_bid: self.best_bid().unwrap_or(INVALID_PRICE),
            best_ask: self.best_ask().unwrap_or(INVALID_PRICE),
        }
    }

    // =================================================================
    // Matching
    // =================================================================

    /// Crossable quantity check for FOK: can the opposing side fill the
    /// whole order at acceptable prices?
    fn is_fully_fillable(&self, order: &Order) -> bool {
        let mut needed = order.remaining_quantity;
        match order.side {
            Side::Buy => {
                for (price, level) in &self.asks {
                    if needed == 0 || !order.crosses(*price) {
                        break;
                    }
                    needed = needed.saturating_sub(level.total_quantity());
                }
            }
            Side::Sell => {
                for (&Reverse(price), level) in &self.bids {
                    if needed == 0 || !order.crosses(price) {
                        break;
                    }
                    needed = needed.saturating_sub(level.total_quantity());
                }
            }
        }
        needed == 0
    }

    fn match_order(&mut self, incoming: &mut Order, now: Timestamp) -> Vec<TradeEvent> {
        let mut trades = Vec::new();

        while incoming.remaining_quantity > 0 {
            let best = match incoming.side {
                Side::Buy => self.best_ask(),
                Side::Sell => self.best_bid(),
            };
            let Some(level_price) = best else {
                break;
            };
            if !incoming.crosses(level_price) {
                break;
            }
            if self.sweep_level(incoming, level_price, now, &mut trades) == Sweep::Halt {
                break;
            }
        }

        trades
    }

    /// Trade the incoming order against the FIFO queue at `level_price`
    /// until one of them is exhausted or self-trade prevention halts
    /// matching. Removes the level from its ladder if it empties.
    fn sweep_level(
        &mut self,
        incoming: &mut Order,
        level_price: Price,
        now: Timestamp,
        trades: &mut Vec<TradeEvent>,
    ) -> Sweep {
        let mut halt = false;

        let level = match incoming.side {
            Side::Buy => self.asks.get_mut(&level_price),
            Side::Sell => self.bids.get_mut(&Reverse(level_price)),
        };
        let Some(level) = level else {
            return Sweep::Continue;
        };

        while incoming.remaining_quantity > 0 {
            let Some(resting_id) = level.front() else {
                break;
            };
            let Some(resting) = self.orders.get_mut(&resting_id) else {
                // Stale handle; the index is authoritative.
                level.pop_front();
                continue;
            };

            if self.stp_policy != StpPolicy::None
                && incoming.trader_id == resting.trader_id
                && incoming.trader_id.is_valid()
            {
                let resting_remaining = resting.remaining_quantity;
                match self.stp_policy {
                    StpPolicy::CancelIncoming => {
                        incoming.remaining_quantity = 0;
                        halt = true;
                        break;
                    }
                    StpPolicy::CancelResting => {
                        level.reduce(resting_remaining);
                        level.pop_front();
                        self.orders.remove(&resting_id);
                        continue;
                    }
                    StpPolicy::CancelBoth => {
                        incoming.remaining_quantity = 0;
                        level.reduce(resting_remaining);
                        level.pop_front();
                        self.orders.remove(&resting_id);
                        halt = true;
                        break;
                    }
                    StpPolicy::None => {}
                }
            }

            let fill = incoming.remaining_quantity.min(resting.remaining_quantity);
            self.next_trade_id += 1;
            trades.push(TradeEvent {
                trade_id: TradeId(self.next_trade_id),
                symbol: self.symbol.clone(),
                price: level_price,
                quantity: fill,
                aggressor_side: incoming.side,
                aggressive_order_id: incoming.order_id,
                passive_order_id: resting.order_id,
                aggressive_trader_id: incoming.trader_id,
                passive_trader_id: resting.trader_id,
                timestamp: now,
                sequence_number: 0, // stamped by the engine
            });

            incoming.remaining_quantity -= fill;
            resting.remaining_quantity -= fill;
            level.reduce(fill);
            self.trade_count += 1;
            self.total_volume += fill;

            if resting.remaining_quantity == 0 {
                level.pop_front();
                self.orders.remove(&resting_id);
            }
        }

        let emptied = level.is_empty();
        if emptied {
            match incoming.side {
                Side::Buy => {
                    self.asks.remove(&level_price);
                }
                Side::Sell => {
                    self.bids.remove(&Reverse(level_price));
                }
            }
        }

        if halt {
            Sweep::Halt
        } else {
            Sweep::Continue
        }
    }

    // =================================================================
    // Book maintenance
    // =================================================================

    /// Park a remainder on its side, creating the level if absent.
    fn rest(&mut self, order: Order) {
        let price = order.price;
        let order_id = order.order_id;
        let remaining = order.remaining_quantity;

        match order.side {
            Side::Buy => self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevelQueue::new(price))
                .push_back(order_id, remaining),
            Side::Sell => self
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevelQueue::new(price))
                .push_back(order_id, remaining),
        }

        self.orders.insert(order_id, order);
    }

    /// Remove an order's queue entry, dropping its level if it empties.
    /// The caller has already removed the order from the index.
    fn unlink(&mut self, order: &Order) {
        match order.side {
            Side::Buy => {
                if let Some(level) = self.bids.get_mut(&Reverse(order.price)) {
                    level.remove(order.order_id, order.remaining_quantity);
                    if level.is_empty() {
                        self.bids.remove(&Reverse(order.price));
                    }
                }
            }
            Side::Sell => {
                if let Some(level) = self.asks.get_mut(&order.price) {
                    level.remove(order.order_id, order.remaining_quantity);
                    if level.is_empty() {
                        self.asks.remove(&order.price);
                    }
                }
            }
        }
    }
}

fn level_view(level: &PriceLevelQueue) -> PriceLevel {
    PriceLevel {
        price: level.price,
        quantity: level.total_quantity(),
        order_count: level.order_count() as u32,
    }
}
