//! # tickmatch-engine
//!
//! **Multi-symbol front-end for the tickmatch matching core.**
//!
//! The [`MatchingEngine`] validates incoming requests, routes them to
//! per-symbol [`tickmatch_book::OrderBook`]s, stamps every emitted event with
//! a process-wide monotone sequence number, and fans events out to
//! listeners, the event log, the per-symbol trade tape, and telemetry —
//! all synchronously on the calling thread.
//!
//! In deterministic mode every input request and output event is journaled
//! to a JSON-lines [`EventLog`]; replaying the input records on a fresh
//! engine with the same symbol configuration reproduces the output records
//! exactly.
//!
//! The only cross-thread collaborator is the optional
//! [`MarketDataPublisher`], which decouples slow consumers from the matching
//! thread over a bounded wait-free ring.

pub mod engine;
pub mod event_log;
pub mod listener;
pub mod publisher;
pub mod telemetry;
pub mod trade_tape;

pub use engine::MatchingEngine;
pub use event_log::{EventLog, LogEntry, LogEntryKind};
pub use listener::{EngineListener, ListenerId};
pub use publisher::MarketDataPublisher;
pub use telemetry::Telemetry;
pub use trade_tape::TradeTape;
