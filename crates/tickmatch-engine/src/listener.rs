//! Listener interface for engine events.
//!
//! Listeners run synchronously on the matching thread and must not re-enter
//! the engine. Every method has a no-op default body, so implementations
//! override only what they need.

use tickmatch_types::{
    BookUpdateEvent, OrderAcceptedEvent, OrderCancelledEvent, OrderRejectedEvent,
    OrderReplacedEvent, TradeEvent,
};

/// Handle returned by `MatchingEngine::add_listener`, used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Receives engine events synchronously on the matching thread.
pub trait EngineListener {
    fn on_order_accepted(&mut self, _event: &OrderAcceptedEvent) {}
    fn on_order_rejected(&mut self, _event: &OrderRejectedEvent) {}
    fn on_order_cancelled(&mut self, _event: &OrderCancelledEvent) {}
    fn on_order_replaced(&mut self, _event: &OrderReplacedEvent) {}
    fn on_trade(&mut self, _event: &TradeEvent) {}
    fn on_book_update(&mut self, _event: &BookUpdateEvent) {}
}
