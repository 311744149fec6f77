//! Multi-symbol matching engine front-end.
//!
//! Every `handle_*` call runs the full validate -> match -> emit -> log ->
//! notify pipeline synchronously and returns the complete [`OrderResponse`]
//! before the next request is handled. A single monotone sequence counter is
//! advanced once per emitted event (accept, reject, cancel, replace, trade),
//! so all events of one engine instance are totally ordered.
//!
//! Timestamps come from the wall clock unless the caller supplied one;
//! deterministic mode substitutes a logical counter so replays reproduce
//! every field.

use std::collections::HashMap;
use std::time::Instant;

use tickmatch_book::OrderBook;
use tickmatch_types::{
    CancelRequest, DepthSnapshot, NewOrderRequest, OrderAcceptedEvent, OrderCancelledEvent,
    OrderRejectedEvent, OrderReplacedEvent, OrderResponse, OrderType, ReplaceRequest, ResultCode,
    SymbolConfig, Timestamp, TopOfBook, TradeEvent,
};
use tracing::{debug, info, warn};

use crate::event_log::EventLog;
use crate::listener::{EngineListener, ListenerId};
use crate::telemetry::Telemetry;
use crate::trade_tape::TradeTape;

fn wall_clock_ns() -> Timestamp {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as Timestamp
}

/// Routes requests to per-symbol books and fans events out to listeners,
/// the event log, the trade tapes, and telemetry.
pub struct MatchingEngine {
    symbol_configs: HashMap<String, SymbolConfig>,
    books: HashMap<String, OrderBook>,
    trade_tapes: HashMap<String, TradeTape>,

    listeners: Vec<(ListenerId, Box<dyn EngineListener>)>,
    next_listener_id: u64,

    event_log: EventLog,
    telemetry: Telemetry,

    sequence_number: u64,
    logical_clock: u64,
    deterministic: bool,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            symbol_configs: HashMap::new(),
            books: HashMap::new(),
            trade_tapes: HashMap::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
            event_log: EventLog::new(),
            telemetry: Telemetry::new(),
            sequence_number: 0,
            logical_clock: 0,
            deterministic: false,
        }
    }

    /// Engine with deterministic mode on and the event log writing to
    /// `log_path`.
    #[must_use]
    pub fn deterministic(log_path: impl Into<std::path::PathBuf>) -> Self {
        let mut engine = Self::new();
        engine.event_log.set_log_path(log_path);
        engine.set_deterministic(true);
        engine
    }

    // =================================================================
    // Symbol management
    // =================================================================

    /// Register a symbol. Rejects invalid configs and duplicates.
    pub fn add_symbol(&mut self, config: SymbolConfig) -> bool {
        if !config.is_valid() {
            warn!(symbol = %config.symbol, "rejected invalid symbol config");
            return false;
        }
        if self.symbol_configs.contains_key(&config.symbol) {
            return false;
        }

        info!(symbol = %config.symbol, stp = %config.stp_policy, "symbol registered");
        self.books.insert(
            config.symbol.clone(),
            OrderBook::new(config.symbol.clone(), config.stp_policy),
        );
        self.trade_tapes
            .insert(config.symbol.clone(), TradeTape::default());
        self.symbol_configs.insert(config.symbol.clone(), config);
        true
    }

    #[must_use]
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbol_configs.contains_key(symbol)
    }

    // =================================================================
    // Request handling
    // =================================================================

    pub fn handle_new_order(&mut self, request: &NewOrderRequest) -> OrderResponse {
        let started = Instant::now();
        self.telemetry.record_order_processed();
        self.event_log.log_new_order(request);

        let mut response = OrderResponse {
            order_id: request.order_id,
            ..OrderResponse::default()
        };

        let validation = self.validate_new_order(request);
        if !validation.is_success() {
            self.reject(request.order_id, &request.symbol, validation, &mut response);
            return response;
        }

        let now = self.stamp();
        let mut order = request.to_order();
        if order.timestamp == 0 {
            order.timestamp = now;
        }

        let trades = match self.books.get_mut(&request.symbol) {
            Some(book) => book.add_order(order, now),
            None => Vec::new(),
        };

        self.telemetry.record_order_accepted();
        let accept_event = OrderAcceptedEvent {
            order_id: request.order_id,
            symbol: request.symbol.clone(),
            side: request.side,
            price: request.price,
            quantity: request.quantity,
            timestamp: now,
            sequence_number: self.next_sequence(),
        };
        response.accepts.push(accept_event.clone());
        self.notify_order_accepted(&accept_event);
        self.event_log.log_accepted(&accept_event);

        self.emit_trades(trades, &mut response);

        if let Some(book) = self.books.get(&request.symbol) {
            self.telemetry
                .update_symbol_stats(&request.symbol, book.stats());
        }
        self.telemetry
            .record_latency(started.elapsed().as_nanos() as u64);

        response.result = ResultCode::Success;
        response
    }

    pub fn handle_cancel(&mut self, request: &CancelRequest) -> OrderResponse {
        self.telemetry.record_order_processed();
        self.event_log.log_cancel(request);

        let mut response = OrderResponse {
            order_id: request.order_id,
            ..OrderResponse::default()
        };

        if !self.has_symbol(&request.symbol) {
            self.reject(
                request.order_id,
                &request.symbol,
                ResultCode::RejectedInvalidSymbol,
                &mut response,
            );
            return response;
        }

        let now = self.stamp();
        let (cancelled, remaining) = match self.books.get_mut(&request.symbol) {
            Some(book) => {
                let remaining = book
                    .find_order(request.order_id)
                    .map(|o| o.remaining_quantity)
                    .unwrap_or_default();
                (book.cancel_order(request.order_id), remaining)
            }
            None => (false, 0),
        };

        if cancelled {
            self.telemetry.record_order_cancelled();
            let cancel_event = OrderCancelledEvent {
                order_id: request.order_id,
                symbol: request.symbol.clone(),
                remaining_quantity: remaining,
                timestamp: now,
                sequence_number: self.next_sequence(),
            };
            response.cancels.push(cancel_event.clone());
            self.notify_order_cancelled(&cancel_event);
            self.event_log.log_cancelled(&cancel_event);
            response.result = ResultCode::Success;
        } else {
            debug!(order_id = %request.order_id, symbol = %request.symbol, "cancel of unknown order");
            response.result = ResultCode::RejectedOrderNotFound;
            response.message = "Order not found".to_string();
        }

        response
    }

    pub fn handle_replace(&mut self, request: &ReplaceRequest) -> OrderResponse {
        self.telemetry.record_order_processed();
        self.event_log.log_replace(request);

        let mut response = OrderResponse {
            order_id: request.order_id,
            ..OrderResponse::default()
        };

        let validation = self.validate_replace(request);
        if !validation.is_success() {
            // Replace rejections carry only the result code; no reject
            // event is emitted for them.
            self.telemetry.record_order_rejected();
            response.result = validation;
            response.message = validation.as_str().to_string();
            return response;
        }

        let now = self.stamp();
        let trades = match self.books.get_mut(&request.symbol) {
            Some(book) => {
                book.replace_order(request.order_id, request.new_price, request.new_quantity, now)
            }
            None => Vec::new(),
        };

        // The replacement keeps the original id.
        let replace_event = OrderReplacedEvent {
            old_order_id: request.order_id,
            new_order_id: request.order_id,
            symbol: request.symbol.clone(),
            new_price: request.new_price,
            new_quantity: request.new_quantity,
            timestamp: now,
            sequence_number: self.next_sequence(),
        };
        response.replaces.push(replace_event.clone());
        self.notify_order_replaced(&replace_event);
        self.event_log.log_replaced(&replace_event);

        self.emit_trades(trades, &mut response);

        response.result = ResultCode::Success;
        response
    }

    // =================================================================
    // Market data queries
    // =================================================================

    #[must_use]
    pub fn top_of_book(&self, symbol: &str, timestamp: Timestamp) -> Option<TopOfBook> {
        let book = self.books.get(symbol)?;
        let ts = if timestamp == 0 {
            wall_clock_ns()
        } else {
            timestamp
        };
        Some(book.top_of_book(ts))
    }

    #[must_use]
    pub fn depth_snapshot(
        &self,
        symbol: &str,
        depth_levels: usize,
        timestamp: Timestamp,
    ) -> Option<DepthSnapshot> {
        let book = self.books.get(symbol)?;
        let ts = if timestamp == 0 {
            wall_clock_ns()
        } else {
            timestamp
        };
        Some(book.depth_snapshot(depth_levels, ts))
    }

    #[must_use]
    pub fn recent_trades(&self, symbol: &str, max_count: usize) -> Vec<TradeEvent> {
        self.trade_tapes
            .get(symbol)
            .map(|tape| tape.recent_trades(max_count))
            .unwrap_or_default()
    }

    // =================================================================
    // Listeners
    // =================================================================

    pub fn add_listener(&mut self, listener: Box<dyn EngineListener>) -> ListenerId {
        self.next_listener_id += 1;
        let id = ListenerId(self.next_listener_id);
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // =================================================================
    // Telemetry and event log access
    // =================================================================

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut Telemetry {
        &mut self.telemetry
    }

    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn event_log_mut(&mut self) -> &mut EventLog {
        &mut self.event_log
    }

    /// Toggle deterministic mode: journaling plus logical timestamps.
    pub fn set_deterministic(&mut self, enabled: bool) {
        self.deterministic = enabled;
        self.event_log.set_deterministic(enabled);
    }

    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    // =================================================================
    // Internals
    // =================================================================

    fn validate_new_order(&self, request: &NewOrderRequest) -> ResultCode {
        if !self.has_symbol(&request.symbol) {
            return ResultCode::RejectedInvalidSymbol;
        }
        if request.order_type == OrderType::Limit && request.price <= 0 {
            return ResultCode::RejectedInvalidPrice;
        }
        if request.quantity == 0 {
            return ResultCode::RejectedInvalidQuantity;
        }
        ResultCode::Success
    }

    fn validate_replace(&self, request: &ReplaceRequest) -> ResultCode {
        if !self.has_symbol(&request.symbol) {
            return ResultCode::RejectedInvalidSymbol;
        }
        if request.new_price <= 0 {
            return ResultCode::RejectedInvalidPrice;
        }
        if request.new_quantity == 0 {
            return ResultCode::RejectedInvalidQuantity;
        }
        ResultCode::Success
    }

    /// Shared rejection path: event, listeners, log, response.
    fn reject(
        &mut self,
        order_id: tickmatch_types::OrderId,
        symbol: &str,
        reason: ResultCode,
        response: &mut OrderResponse,
    ) {
        self.telemetry.record_order_rejected();
        debug!(%order_id, symbol, %reason, "request rejected");

        response.result = reason;
        response.message = reason.as_str().to_string();

        let reject_event = OrderRejectedEvent {
            order_id,
            symbol: symbol.to_string(),
            reason,
            message: response.message.clone(),
            timestamp: self.stamp(),
            sequence_number: self.next_sequence(),
        };
        response.rejects.push(reject_event.clone());
        self.notify_order_rejected(&reject_event);
        self.event_log.log_rejected(&reject_event);
    }

    /// Stamp, tape, notify, and log each trade in emission order.
    fn emit_trades(&mut self, trades: Vec<TradeEvent>, response: &mut OrderResponse) {
        for mut trade in trades {
            trade.sequence_number = self.next_sequence();

            self.telemetry.record_trade(&trade.symbol, trade.quantity);
            if let Some(tape) = self.trade_tapes.get_mut(&trade.symbol) {
                tape.add_trade(trade.clone());
            }

            self.notify_trade(&trade);
            self.event_log.log_trade(&trade);
            response.trades.push(trade);
        }
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence_number += 1;
        self.sequence_number
    }

    /// Event timestamp: logical counter in deterministic mode, wall clock
    /// otherwise.
    fn stamp(&mut self) -> Timestamp {
        if self.deterministic {
            self.logical_clock += 1;
            self.logical_clock
        } else {
            wall_clock_ns()
        }
    }

    fn notify_order_accepted(&mut self, event: &OrderAcceptedEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_order_accepted(event);
        }
    }

    fn notify_order_rejected(&mut self, event: &OrderRejectedEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_order_rejected(event);
        }
    }

    fn notify_order_cancelled(&mut self, event: &OrderCancelledEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_order_cancelled(event);
        }
    }

    fn notify_order_replaced(&mut self, event: &OrderReplacedEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_order_replaced(event);
        }
    }

    fn notify_trade(&mut self, event: &TradeEvent) {
        for (_, listener) in &mut self.listeners {
            listener.on_trade(event);
        }
    }
}
