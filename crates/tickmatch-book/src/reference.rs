//! Brute-force correctness oracle.
//!
//! Same external contract as [`crate::OrderBook`], deliberately naive
//! representation: a flat vector of live orders in arrival order. Matching
//! scans the whole vector for the best opposing order (best price first,
//! earliest arrival on ties), trades against it, and repeats. Best-bid /
//! best-ask are linear scans; depth aggregates per price in ordered maps at
//! query time.
//!
//! For any legal input stream this book must produce exactly the same
//! ordered trade sequence and the same externally observable state as the
//! optimized book. Used only in tests and by the replay validator.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tickmatch_types::{
    DepthSnapshot, Order, OrderId, Price, PriceLevel, Quantity, Side, StpPolicy, Timestamp,
    TopOfBook, TradeEvent, TradeId,
};

/// Linear-scan reference book for a single symbol.
#[derive(Debug)]
pub struct ReferenceBook {
    symbol: String,
    stp_policy: StpPolicy,
    /// Live orders in arrival order; arrival position is the time priority.
    orders: Vec<Order>,
    next_trade_id: u64,
}

impl ReferenceBook {
    #[must_use]
    pub fn new(symbol: impl Into<String>, stp_policy: StpPolicy) -> Self {
        Self {
            symbol: symbol.into(),
            stp_policy,
            orders: Vec::new(),
            next_trade_id: 0,
        }
    }

    // =================================================================
    // Order operations
    // =================================================================

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
            self.orders.push(incoming);
        }

        trades
    }

    pub fn cancel_order(&mut self, order_id: OrderId) -> bool {
        match self.orders.iter().position(|o| o.order_id == order_id) {
            Some(pos) => {
                self.orders.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Cancel-and-re-add, inheriting every attribute of the original order
    /// except price and quantity. Arrival order restarts, so the
    /// replacement loses time priority.
    pub fn replace_order(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
        now: Timestamp,
    ) -> Vec<TradeEvent> {
        let Some(pos) = self.orders.iter().position(|o| o.order_id == order_id) else {
            return Vec::new();
        };
        let mut order = self.orders.remove(pos);

        order.price = new_price;
        order.quantity = new_quantity;
        order.remaining_quantity = new_quantity;

        self.add_order(order, now)
    }

    // =================================================================
    // Queries (all linear)
    // =================================================================

    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.orders
            .iter()
            .filter(|o| o.is_buy() && o.remaining_quantity > 0)
            .map(|o| o.price)
            .max()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.orders
            .iter()
            .filter(|o| o.is_sell() && o.remaining_quantity > 0)
            .map(|o| o.price)
            .min()
    }

    #[must_use]
    pub fn top_of_book(&self, timestamp: Timestamp) -> TopOfBook {
        let mut tob = TopOfBook::empty(self.symbol.clone(), timestamp);

        if let Some(best_bid) = self.best_bid() {
            tob.best_bid = best_bid;
            tob.bid_size = self
                .orders
                .iter()
                .filter(|o| o.is_buy() && o.price == best_bid)
                .map(|o| o.remaining_quantity)
                .sum();
        }
        if let Some(best_ask) = self.best_ask() {
            tob.best_ask = best_ask;
            tob.ask_size = self
                .orders
                .iter()
                .filter(|o| o.is_sell() && o.price == best_ask)
                .map(|o| o.remaining_quantity)
                .sum();
        }

        tob
    }

    #[must_use]
    pub fn depth_snapshot(&self, depth_levels: usize, timestamp: Timestamp) -> DepthSnapshot {
        let mut bid_map: BTreeMap<Reverse<Price>, (Quantity, u32)> = BTreeMap::new();
        let mut ask_map: BTreeMap<Price, (Quantity, u32)> = BTreeMap::new();

        for order in &self.orders {
            if order.remaining_quantity == 0 {
                continue;
            }
            match order.side {
                Side::Buy => {
                    let entry = bid_map.entry(Reverse(order.price)).or_insert((0, 0));
                    entry.0 += order.remaining_quantity;
                    entry.1 += 1;
                }
                Side::Sell => {
                    let entry = ask_map.entry(order.price).or_insert((0, 0));
                    entry.0 += order.remaining_quantity;
                    entry.1 += 1;
                }
            }
        }

        let bids = bid_map
            .iter()
            .take(depth_levels)
            .map(|(&Reverse(price), &(quantity, order_count))| PriceLevel {
                price,
                quantity,
                order_count,
            })
            .collect();
        let asks = ask_map
            .iter()
            .take(depth_levels)
            .map(|(&price, &(quantity, order_count))| PriceLevel {
                price,
                quantity,
                order_count,
            })
            .collect();

        DepthSnapshot {
            symbol: self.symbol.clone(),
            bids,
            asks,
            timestamp,
            sequence_number: 0,
        }
    }

    #[must_use]
    pub fn find_order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    #[must_use]
    pub fn active_order_count(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    // =================================================================
    // Matching (naive)
    // =================================================================

    fn is_fully_fillable(&self, incoming: &Order) -> bool {
        let available: Quantity = self
            .orders
            .iter()
            .filter(|o| o.side != incoming.side && incoming.crosses(o.price))
            .map(|o| o.remaining_quantity)
            .sum();
        available >= incoming.remaining_quantity
    }

    fn match_order(&mut self, incoming: &mut Order, now: Timestamp) -> Vec<TradeEvent> {
        let mut trades = Vec::new();

        while incoming.remaining_quantity > 0 {
            let Some(best_idx) = self.find_best_match(incoming) else {
                break;
            };

            let (resting_id, resting_trader, resting_price, resting_remaining) = {
                let resting = &self.orders[best_idx];
                (
                    resting.order_id,
                    resting.trader_id,
                    resting.price,
                    resting.remaining_quantity,
                )
            };

            if self.stp_policy != StpPolicy::None
                && incoming.trader_id == resting_trader
                && incoming.trader_id.is_valid()
            {
                match self.stp_policy {
                    StpPolicy::CancelIncoming => {
                        incoming.remaining_quantity = 0;
                        break;
                    }
                    StpPolicy::CancelResting => {
                        self.orders.remove(best_idx);
                        continue;
                    }
                    StpPolicy::CancelBoth => {
                        incoming.remaining_quantity = 0;
                        self.orders.remove(best_idx);
                        break;
                    }
                    StpPolicy::None => {}
                }
            }

            let fill = incoming.remaining_quantity.min(resting_remaining);
            self.next_trade_id += 1;
            trades.push(TradeEvent {
                trade_id: TradeId(self.next_trade_id),
                symbol: self.symbol.clone(),
                price: resting_price,
                quantity: fill,
                aggressor_side: incoming.side,
                aggressive_order_id: incoming.order_id,
                passive_order_id: resting_id,
                aggressive_trader_id: incoming.trader_id,
                passive_trader_id: resting_trader,
                timestamp: now,
                sequence_number: 0,
            });

            incoming.remaining_quantity -= fill;
            self.orders[best_idx].remaining_quantity -= fill;
            if self.orders[best_idx].remaining_quantity == 0 {
                self.orders.remove(best_idx);
            }
        }

        trades
    }

    /// Linear scan for the best opposing order: best price first; on equal
    /// prices the earliest arrival (lowest index) wins.
    fn find_best_match(&self, incoming: &Order) -> Option<usize> {
        let mut best: Option<(usize, Price)> = None;

        for (idx, order) in self.orders.iter().enumerate() {
            if order.side == incoming.side || order.remaining_quantity == 0 {
                continue;
            }
            if !incoming.crosses(order.price) {
                continue;
            }

            let better = match best {
                None => true,
                Some((_, best_price)) => match incoming.side {
                    Side::Buy => order.price < best_price,
                    Side::Sell => order.price > best_price,
                },
            };
            if better {
                best = Some((idx, order.price));
            }
        }

        best.map(|(idx, _)| idx)
    }
}
