//! Engine output events.
//!
//! Every event carries an engine-assigned `sequence_number` (monotone across
//! all events of one engine instance) and a timestamp. Trade events are
//! produced by the book; the engine stamps the sequence number afterwards.

use serde::{Deserialize, Serialize};

use crate::{OrderId, Price, Quantity, ResultCode, Side, Timestamp, TradeId, TraderId};

/// Immutable record of a single fill.
///
/// `price` is always the resting (passive) order's price, never the
/// incoming order's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub trade_id: TradeId,
    pub symbol: String,
    pub price: Price,
    pub quantity: Quantity,
    pub aggressor_side: Side,
    pub aggressive_order_id: OrderId,
    pub passive_order_id: OrderId,
    pub aggressive_trader_id: TraderId,
    pub passive_trader_id: TraderId,
    pub timestamp: Timestamp,
    pub sequence_number: u64,
}

/// A new order passed validation and was handed to the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAcceptedEvent {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
    pub sequence_number: u64,
}

/// A request failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRejectedEvent {
    pub order_id: OrderId,
    pub symbol: String,
    pub reason: ResultCode,
    pub message: String,
    pub timestamp: Timestamp,
    pub sequence_number: u64,
}

/// A resting order was removed by a cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order_id: OrderId,
    pub symbol: String,
    pub remaining_quantity: Quantity,
    pub timestamp: Timestamp,
    pub sequence_number: u64,
}

/// An order was replaced. The replacement keeps the original id but loses
/// time priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReplacedEvent {
    pub old_order_id: OrderId,
    pub new_order_id: OrderId,
    pub symbol: String,
    pub new_price: Price,
    pub new_quantity: Quantity,
    pub timestamp: Timestamp,
    pub sequence_number: u64,
}

/// Aggregated change at one price level, for market data feeds.
/// `quantity == 0` means the level was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdateEvent {
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
    pub sequence_number: u64,
}
