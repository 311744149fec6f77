//! Order model: sides, order types, time in force, self-trade prevention
//! policies, and the [`Order`] struct owned by the book while an order is
//! resting or being matched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OrderId, Price, Quantity, Timestamp, TraderId};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// The type of order. LIMIT orders carry a price; MARKET orders cross every
/// level regardless of price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
        }
    }
}

/// Time-in-force. `Day` and `Gtc` behave identically in the core: rest until
/// cancelled. `Gtd` is carried but treated like `Gtc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TimeInForce {
    Day,
    Ioc,
    Fok,
    Gtc,
    Gtd,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "DAY"),
            Self::Ioc => write!(f, "IOC"),
            Self::Fok => write!(f, "FOK"),
            Self::Gtc => write!(f, "GTC"),
            Self::Gtd => write!(f, "GTD"),
        }
    }
}

/// Self-trade prevention policy, applied per book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StpPolicy {
    /// Same-trader matches trade normally.
    None,
    /// Cancel the remainder of the incoming order.
    CancelIncoming,
    /// Remove the resting order and keep matching the incoming one.
    CancelResting,
    /// Remove the resting order and cancel the incoming remainder.
    CancelBoth,
}

impl fmt::Display for StpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::CancelIncoming => write!(f, "CANCEL_INCOMING"),
            Self::CancelResting => write!(f, "CANCEL_RESTING"),
            Self::CancelBoth => write!(f, "CANCEL_BOTH"),
        }
    }
}

/// Core order struct. Owned by its resident book from the moment matching
/// begins until it is fully filled or cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub trader_id: TraderId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Ignored for MARKET orders.
    pub price: Price,
    /// Original quantity; never changes after submission.
    pub quantity: Quantity,
    /// Decreases monotonically to zero as fills occur.
    pub remaining_quantity: Quantity,
    pub time_in_force: TimeInForce,
    pub timestamp: Timestamp,

    // Carried for wire compatibility; not honored by the matcher.
    #[serde(default)]
    pub post_only: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub display_quantity: Quantity,
}

impl Order {
    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    #[must_use]
    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    #[must_use]
    pub fn is_limit(&self) -> bool {
        self.order_type == OrderType::Limit
    }

    #[must_use]
    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }

    #[must_use]
    pub fn is_fully_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    #[must_use]
    pub fn is_ioc(&self) -> bool {
        self.time_in_force == TimeInForce::Ioc
    }

    #[must_use]
    pub fn is_fok(&self) -> bool {
        self.time_in_force == TimeInForce::Fok
    }

    #[must_use]
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    /// True if a LIMIT order at this price would trade against a resting
    /// level at `level_price`. MARKET orders cross every level.
    #[must_use]
    pub fn crosses(&self, level_price: Price) -> bool {
        match (self.order_type, self.side) {
            (OrderType::Market, _) => true,
            (OrderType::Limit, Side::Buy) => self.price >= level_price,
            (OrderType::Limit, Side::Sell) => self.price <= level_price,
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn limit(
        order_id: u64,
        trader_id: u64,
        symbol: &str,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            order_id: OrderId(order_id),
            trader_id: TraderId(trader_id),
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Limit,
            price,
            quantity,
            remaining_quantity: quantity,
            time_in_force: TimeInForce::Day,
            timestamp: order_id,
            post_only: false,
            hidden: false,
            display_quantity: 0,
        }
    }

    pub fn market(order_id: u64, trader_id: u64, symbol: &str, side: Side, quantity: Quantity) -> Self {
        Self {
            order_type: OrderType::Market,
            price: crate::constants::INVALID_PRICE,
            ..Self::limit(order_id, trader_id, symbol, side, 0, quantity)
        }
    }

    pub fn with_tif(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }
}
