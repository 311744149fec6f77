//! # tickmatch-types
//!
//! Shared types, errors, and configuration for the **tickmatch** matching
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Scalars**: [`Price`], [`Quantity`], [`Timestamp`]
//! - **Identifiers**: [`OrderId`], [`TraderId`], [`TradeId`]
//! - **Order model**: [`Order`], [`Side`], [`OrderType`], [`TimeInForce`], [`StpPolicy`]
//! - **Events**: [`TradeEvent`] and the order lifecycle events
//! - **Messages**: [`NewOrderRequest`], [`CancelRequest`], [`ReplaceRequest`], [`OrderResponse`]
//! - **Market data views**: [`TopOfBook`], [`DepthSnapshot`], [`SymbolStats`] and the binary snapshot codec
//! - **Configuration**: [`SymbolConfig`]
//! - **Errors**: [`TickmatchError`] with `TM_ERR_` prefix codes, and [`ResultCode`]
//! - **Constants**: sentinel values and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod ids;
pub mod market_data;
pub mod messages;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use tickmatch_types::{Order, Side, TradeEvent, SymbolConfig, ...};

pub use config::*;
pub use error::*;
pub use events::*;
pub use ids::*;
pub use market_data::*;
pub use messages::*;
pub use order::*;

// Constants are accessed via `tickmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
