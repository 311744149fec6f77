//! # tickmatch-book
//!
//! **Deterministic price-time-priority matching for tickmatch.**
//!
//! This crate is the compute plane — a single-symbol [`OrderBook`] that
//! executes incoming orders against two price-ordered ladders with FIFO
//! queues. It has:
//!
//! - **Zero side effects**: no clocks, no I/O, no logging — the caller
//!   supplies timestamps and consumes the returned trade events
//! - **Deterministic output**: same operation sequence -> same trade stream
//! - **Self-trade prevention**: configurable per-book policy applied at the
//!   match level
//! - **A correctness oracle**: [`ReferenceBook`] reproduces the externally
//!   observable semantics with a brute-force linear scan, and
//!   [`BookValidator`] diffs the two

pub mod book;
pub mod digest;
pub mod price_level;
pub mod reference;
pub mod validator;

pub use book::OrderBook;
pub use digest::{compute_trade_digest, trade_digest_hex, verify_trade_digest};
pub use price_level::PriceLevelQueue;
pub use reference::ReferenceBook;
pub use validator::{BookValidator, ValidationResult};
