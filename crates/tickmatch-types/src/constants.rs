//! System-wide sentinel values and defaults.

use crate::{OrderId, Price, Quantity, TraderId};

/// Sentinel for "no price" in views and events.
pub const INVALID_PRICE: Price = -1;

/// Sentinel for "no quantity".
pub const INVALID_QUANTITY: Quantity = 0;

/// Sentinel order id; never matches a live order.
pub const INVALID_ORDER_ID: OrderId = OrderId(0);

/// Sentinel trader id; self-trade prevention ignores it.
pub const INVALID_TRADER_ID: TraderId = TraderId(0);

/// Default number of trades retained per symbol by the trade tape.
pub const DEFAULT_TRADE_TAPE_CAPACITY: usize = 10_000;

/// Default capacity of the market-data publisher ring (rounded up to a
/// power of two).
pub const DEFAULT_PUBLISHER_QUEUE_CAPACITY: usize = 65_536;

/// Upper bound on per-side level counts accepted by the binary snapshot
/// decoder. Counts above this are treated as corruption.
pub const MAX_SNAPSHOT_LEVELS: u32 = 1_000_000;
