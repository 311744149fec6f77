//! Engine request and response messages.

use serde::{Deserialize, Serialize};

use crate::{
    Order, OrderAcceptedEvent, OrderCancelledEvent, OrderId, OrderRejectedEvent,
    OrderReplacedEvent, OrderType, Price, Quantity, ResultCode, Side, TimeInForce, Timestamp,
    TradeEvent, TraderId,
};

/// Request to submit a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub order_id: OrderId,
    pub trader_id: TraderId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub time_in_force: TimeInForce,
    /// `0` asks the engine to stamp its own timestamp.
    pub timestamp: Timestamp,
}

impl NewOrderRequest {
    /// Materialize the order the book will own.
    #[must_use]
    pub fn to_order(&self) -> Order {
        Order {
            order_id: self.order_id,
            trader_id: self.trader_id,
            symbol: self.symbol.clone(),
            side: self.side,
            order_type: self.order_type,
            price: self.price,
            quantity: self.quantity,
            remaining_quantity: self.quantity,
            time_in_force: self.time_in_force,
            timestamp: self.timestamp,
            post_only: false,
            hidden: false,
            display_quantity: 0,
        }
    }
}

/// Request to cancel a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub order_id: OrderId,
    pub symbol: String,
    /// `0` asks the engine to stamp its own timestamp.
    pub timestamp: Timestamp,
}

/// Request to replace a resting order's price and quantity. The replacement
/// keeps the original id and loses time priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRequest {
    pub order_id: OrderId,
    pub symbol: String,
    pub new_price: Price,
    pub new_quantity: Quantity,
    /// `0` asks the engine to stamp its own timestamp.
    pub timestamp: Timestamp,
}

/// Complete synchronous outcome of one `handle` call: the result code plus
/// every event the request produced, in emission order within each list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub result: ResultCode,
    pub message: String,
    pub order_id: OrderId,
    pub accepts: Vec<OrderAcceptedEvent>,
    pub rejects: Vec<OrderRejectedEvent>,
    pub cancels: Vec<OrderCancelledEvent>,
    pub replaces: Vec<OrderReplacedEvent>,
    pub trades: Vec<TradeEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewOrderRequest {
        NewOrderRequest {
            order_id: OrderId(1),
            trader_id: TraderId(100),
            symbol: "TEST".into(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            price: 10_000,
            quantity: 50,
            time_in_force: TimeInForce::Day,
            timestamp: 123,
        }
    }

    #[test]
    fn to_order_copies_fields_and_fills_remaining() {
        let order = request().to_order();
        assert_eq!(order.order_id, OrderId(1));
        assert_eq!(order.quantity, 50);
        assert_eq!(order.remaining_quantity, 50);
        assert_eq!(order.timestamp, 123);
        assert!(!order.post_only);
    }

    #[test]
    fn response_defaults_to_success_with_empty_lists() {
        let response = OrderResponse::default();
        assert_eq!(response.result, ResultCode::Success);
        assert!(response.trades.is_empty());
        assert!(response.rejects.is_empty());
    }

    #[test]
    fn request_serde_roundtrip() {
        let req = request();
        let json = serde_json::to_string(&req).unwrap();
        let back: NewOrderRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }
}
