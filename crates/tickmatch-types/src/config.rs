//! Per-symbol configuration.

use serde::{Deserialize, Serialize};

use crate::{Price, Quantity, StpPolicy};

/// Configuration registered with the engine before orders for a symbol are
/// accepted.
///
/// `tick_size`, `lot_size` and `min_quantity` are validated for positivity at
/// registration but are not enforced against individual orders by the
/// request validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub symbol: String,
    /// Minimum price increment.
    pub tick_size: Price,
    /// Minimum quantity increment.
    pub lot_size: Quantity,
    /// Minimum order quantity.
    pub min_quantity: Quantity,
    pub stp_policy: StpPolicy,
}

impl SymbolConfig {
    /// Config with unit tick/lot sizes and `CANCEL_INCOMING` self-trade
    /// prevention, as used by the replay utility for auto-registered symbols.
    #[must_use]
    pub fn with_defaults(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size: 1,
            lot_size: 1,
            min_quantity: 1,
            stp_policy: StpPolicy::CancelIncoming,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty() && self.tick_size > 0 && self.lot_size > 0 && self.min_quantity > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SymbolConfig::with_defaults("TEST");
        assert!(cfg.is_valid());
        assert_eq!(cfg.symbol, "TEST");
        assert_eq!(cfg.stp_policy, StpPolicy::CancelIncoming);
    }

    #[test]
    fn invalid_configs_rejected() {
        let mut cfg = SymbolConfig::with_defaults("");
        assert!(!cfg.is_valid());

        cfg = SymbolConfig::with_defaults("TEST");
        cfg.tick_size = 0;
        assert!(!cfg.is_valid());

        cfg = SymbolConfig::with_defaults("TEST");
        cfg.lot_size = 0;
        assert!(!cfg.is_valid());

        cfg = SymbolConfig::with_defaults("TEST");
        cfg.min_quantity = 0;
        assert!(!cfg.is_valid());
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = SymbolConfig::with_defaults("BTCUSD");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SymbolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
