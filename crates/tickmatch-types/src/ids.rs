//! Identifiers and scalar aliases used throughout tickmatch.
//!
//! Every identifier is a caller-supplied 64-bit unsigned integer; `0` is the
//! "invalid" sentinel for order and trader ids. Prices are signed fixed-point
//! ticks, quantities unsigned.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-point price in ticks (e.g. cents). `-1` is the invalid sentinel.
pub type Price = i64;

/// Order / fill quantity. `0` is the invalid sentinel.
pub type Quantity = u64;

/// Nanoseconds since an epoch, or a logical counter in deterministic mode.
/// Treated as opaque by the engine.
pub type Timestamp = u64;

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Caller-assigned order identifier. `0` means "no order".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Returns `true` unless this is the `0` sentinel.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TraderId
// ---------------------------------------------------------------------------

/// Caller-assigned trader / account identifier. `0` means "anonymous";
/// self-trade prevention never triggers for it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TraderId(pub u64);

impl TraderId {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TradeId
// ---------------------------------------------------------------------------

/// Book-local trade identifier, assigned by each book's monotone counter
/// starting at 1.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TradeId(pub u64);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_ids_are_invalid() {
        assert!(!OrderId(0).is_valid());
        assert!(OrderId(1).is_valid());
        assert!(!TraderId(0).is_valid());
        assert!(TraderId(42).is_valid());
    }

    #[test]
    fn id_ordering_follows_value() {
        assert!(OrderId(1) < OrderId(2));
        assert!(TradeId(9) < TradeId(10));
    }

    #[test]
    fn serde_roundtrips_as_bare_integers() {
        let id = OrderId(77);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "77");
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
