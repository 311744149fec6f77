//! Market data views computed on demand from a book, and the binary
//! depth-snapshot codec.
//!
//! ## Binary wire format
//!
//! Big-endian throughout. A fixed 32-byte header:
//!
//! ```text
//! magic:u32 ('LOB1')  version:u16  symbol_len:u8  reserved:u8
//! num_bids:u32  num_asks:u32  timestamp:u64  sequence_number:u64
//! ```
//!
//! followed by `symbol_len` symbol bytes, `num_bids` then `num_asks`
//! 16-byte level records (`price:i64, quantity:u64`), terminated by a 4-byte
//! checksum slot (written zero, reserved). `order_count` is not carried on
//! the wire and decodes as 0.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::{INVALID_PRICE, MAX_SNAPSHOT_LEVELS};
use crate::{Price, Quantity, Result, TickmatchError, Timestamp};

/// Snapshot magic: ASCII `LOB1`.
pub const SNAPSHOT_MAGIC: u32 = 0x4C4F_4231;
/// Current snapshot codec version.
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_LEN: usize = 32;
const LEVEL_LEN: usize = 16;
const CHECKSUM_LEN: usize = 4;

/// One aggregated price level in a depth snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: u32,
}

/// Best bid and ask with aggregated sizes at the best levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub symbol: String,
    pub best_bid: Price,
    pub best_ask: Price,
    pub bid_size: Quantity,
    pub ask_size: Quantity,
    pub timestamp: Timestamp,
}

impl TopOfBook {
    /// An empty view for `symbol` with both sides vacant.
    #[must_use]
    pub fn empty(symbol: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            symbol: symbol.into(),
            best_bid: INVALID_PRICE,
            best_ask: INVALID_PRICE,
            bid_size: 0,
            ask_size: 0,
            timestamp,
        }
    }

    #[must_use]
    pub fn has_bid(&self) -> bool {
        self.best_bid != INVALID_PRICE
    }

    #[must_use]
    pub fn has_ask(&self) -> bool {
        self.best_ask != INVALID_PRICE
    }

    /// Midpoint of the best prices, or `INVALID_PRICE` if either side is
    /// empty.
    #[must_use]
    pub fn mid_price(&self) -> Price {
        if self.has_bid() && self.has_ask() {
            (self.best_bid + self.best_ask) / 2
        } else {
            INVALID_PRICE
        }
    }

    /// `best_ask - best_bid`, or `INVALID_PRICE` if either side is empty.
    #[must_use]
    pub fn spread(&self) -> Price {
        if self.has_bid() && self.has_ask() {
            self.best_ask - self.best_bid
        } else {
            INVALID_PRICE
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "symbol": self.symbol,
            "best_bid": self.best_bid,
            "best_ask": self.best_ask,
            "bid_size": self.bid_size,
            "ask_size": self.ask_size,
            "timestamp": self.timestamp,
        })
    }
}

/// Up to N best levels per side; bids in descending, asks in ascending
/// price order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub timestamp: Timestamp,
    pub sequence_number: u64,
}

impl DepthSnapshot {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let levels = |side: &[PriceLevel]| -> Vec<serde_json::Value> {
            side.iter()
                .map(|l| json!([l.price, l.quantity, l.order_count]))
                .collect()
        };
        json!({
            "symbol": self.symbol,
            "bids": levels(&self.bids),
            "asks": levels(&self.asks),
            "timestamp": self.timestamp,
            "sequence_number": self.sequence_number,
        })
    }

    /// Encode into the binary wire format described in the module docs.
    #[must_use]
    pub fn to_binary(&self) -> Vec<u8> {
        let symbol_bytes = self.symbol.as_bytes();
        let symbol_len = symbol_bytes.len().min(u8::MAX as usize);
        let total = HEADER_LEN
            + symbol_len
            + (self.bids.len() + self.asks.len()) * LEVEL_LEN
            + CHECKSUM_LEN;

        let mut buf = Vec::with_capacity(total);
        buf.extend_from_slice(&SNAPSHOT_MAGIC.to_be_bytes());
        buf.extend_from_slice(&SNAPSHOT_VERSION.to_be_bytes());
        buf.push(symbol_len as u8);
        buf.push(0); // reserved
        buf.extend_from_slice(&(self.bids.len() as u32).to_be_bytes());
        buf.extend_from_slice(&(self.asks.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.sequence_number.to_be_bytes());

        buf.extend_from_slice(&symbol_bytes[..symbol_len]);

        for level in self.bids.iter().chain(self.asks.iter()) {
            buf.extend_from_slice(&level.price.to_be_bytes());
            buf.extend_from_slice(&level.quantity.to_be_bytes());
        }

        // Checksum slot, reserved.
        buf.extend_from_slice(&0u32.to_be_bytes());

        buf
    }

    /// Decode a binary snapshot, validating magic, version, and declared
    /// sizes against the buffer before reading any field.
    pub fn from_binary(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(TickmatchError::SnapshotTruncated {
                expected: HEADER_LEN + CHECKSUM_LEN,
                actual: data.len(),
            });
        }

        let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        if magic != SNAPSHOT_MAGIC {
            return Err(TickmatchError::SnapshotBadMagic(magic));
        }

        let version = u16::from_be_bytes([data[4], data[5]]);
        if version != SNAPSHOT_VERSION {
            return Err(TickmatchError::SnapshotBadVersion(version));
        }

        let symbol_len = data[6] as usize;
        let num_bids = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
        let num_asks = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);

        if num_bids > MAX_SNAPSHOT_LEVELS {
            return Err(TickmatchError::SnapshotBadLevelCount(num_bids));
        }
        if num_asks > MAX_SNAPSHOT_LEVELS {
            return Err(TickmatchError::SnapshotBadLevelCount(num_asks));
        }

        let expected =
            HEADER_LEN + symbol_len + (num_bids + num_asks) as usize * LEVEL_LEN + CHECKSUM_LEN;
        if data.len() != expected {
            return Err(TickmatchError::SnapshotSizeMismatch {
                reason: format!(
                    "declared {} bids / {} asks / symbol_len {} imply {} bytes, buffer has {}",
                    num_bids,
                    num_asks,
                    symbol_len,
                    expected,
                    data.len()
                ),
            });
        }

        let timestamp = u64::from_be_bytes([
            data[16], data[17], data[18], data[19], data[20], data[21], data[22], data[23],
        ]);
        let sequence_number = u64::from_be_bytes([
            data[24], data[25], data[26], data[27], data[28], data[29], data[30], data[31],
        ]);

        let mut offset = HEADER_LEN;
        let symbol = String::from_utf8_lossy(&data[offset..offset + symbol_len]).into_owned();
        offset += symbol_len;

        let mut read_levels = |count: u32| -> Vec<PriceLevel> {
            let mut levels = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let price = i64::from_be_bytes([
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                    data[offset + 4],
                    data[offset + 5],
                    data[offset + 6],
                    data[offset + 7],
                ]);
                let quantity = u64::from_be_bytes([
                    data[offset + 8],
                    data[offset + 9],
                    data[offset + 10],
                    data[offset + 11],
                    data[offset + 12],
                    data[offset + 13],
                    data[offset + 14],
                    data[offset + 15],
                ]);
                levels.push(PriceLevel {
                    price,
                    quantity,
                    order_count: 0,
                });
                offset += LEVEL_LEN;
            }
            levels
        };

        let bids = read_levels(num_bids);
        let asks = read_levels(num_asks);

        Ok(Self {
            symbol,
            bids,
            asks,
            timestamp,
            sequence_number,
        })
    }
}

/// Per-symbol statistics published into telemetry after every handled
/// request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStats {
    pub active_orders: u64,
    pub bid_levels: u64,
    pub ask_levels: u64,
    pub trade_volume: u64,
    pub trade_count: u64,
    pub max_bid_depth: u64,
    pub max_ask_depth: u64,
    pub best_bid: Price,
    pub best_ask: Price,
}

impl SymbolStats {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "active_orders": self.active_orders,
            "bid_levels": self.bid_levels,
            "ask_levels": self.ask_levels,
            "trade_volume": self.trade_volume,
            "trade_count": self.trade_count,
            "max_bid_depth": self.max_bid_depth,
            "max_ask_depth": self.max_ask_depth,
            "best_bid": self.best_bid,
            "best_ask": self.best_ask,
        })
    }
}
