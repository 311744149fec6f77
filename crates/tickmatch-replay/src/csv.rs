//! CSV order ingestion.
//!
//! Columns, in order:
//! `timestamp,symbol,side,order_type,price,quantity,order_id,trader_id`
//!
//! `side` and `order_type` are case-sensitive (`BUY`/`SELL`,
//! `LIMIT`/`MARKET`); `price` is a decimal string multiplied by 100 to
//! obtain ticks; the remaining columns are decimal integers. A header row is
//! optional and detected by the literal `timestamp` in the first line.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tickmatch_types::{
    NewOrderRequest, OrderId, OrderType, Price, Result, Side, TickmatchError, TimeInForce,
    TraderId,
};

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOrder {
    pub timestamp: u64,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price_ticks: Price,
    pub quantity: u64,
    pub order_id: u64,
    pub trader_id: u64,
}

impl CsvOrder {
    /// Convert into the engine request. CSV replays rest until cancelled.
    #[must_use]
    pub fn to_request(&self) -> NewOrderRequest {
        NewOrderRequest {
            order_id: OrderId(self.order_id),
            trader_id: TraderId(self.trader_id),
            symbol: self.symbol.clone(),
            side: self.side,
            order_type: self.order_type,
            price: self.price_ticks,
            quantity: self.quantity,
            time_in_force: TimeInForce::Day,
            timestamp: self.timestamp,
        }
    }
}

/// True if the first line of the file is a header row.
#[must_use]
pub fn is_header(first_line: &str) -> bool {
    first_line.contains("timestamp")
}

/// Parse one data row. `line_number` is 1-based, for diagnostics.
pub fn parse_line(line: &str, line_number: usize) -> Result<CsvOrder> {
    let fail = |reason: String| TickmatchError::CsvParse {
        line: line_number,
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 8 {
        return Err(fail(format!("expected 8 columns, found {}", fields.len())));
    }

    let timestamp = fields[0]
        .parse::<u64>()
        .map_err(|e| fail(format!("bad timestamp {:?}: {e}", fields[0])))?;

    let symbol = fields[1].to_string();
    if symbol.is_empty() {
        return Err(fail("empty symbol".to_string()));
    }

    let side = match fields[2] {
        "BUY" => Side::Buy,
        "SELL" => Side::Sell,
        other => return Err(fail(format!("bad side {other:?}"))),
    };

    let order_type = match fields[3] {
        "LIMIT" => OrderType::Limit,
        "MARKET" => OrderType::Market,
        other => return Err(fail(format!("bad order type {other:?}"))),
    };

    let price = Decimal::from_str(fields[4])
        .map_err(|e| fail(format!("bad price {:?}: {e}", fields[4])))?;
    let price_ticks = (price * Decimal::from(100))
        .trunc()
        .to_i64()
        .ok_or_else(|| fail(format!("price {:?} out of tick range", fields[4])))?;

    let quantity = fields[5]
        .parse::<u64>()
        .map_err(|e| fail(format!("bad quantity {:?}: {e}", fields[5])))?;
    let order_id = fields[6]
        .parse::<u64>()
        .map_err(|e| fail(format!("bad order id {:?}: {e}", fields[6])))?;
    let trader_id = fields[7]
        .parse::<u64>()
        .map_err(|e| fail(format!("bad trader id {:?}: {e}", fields[7])))?;

    Ok(CsvOrder {
        timestamp,
        symbol,
        side,
        order_type,
        price_ticks,
        quantity,
        order_id,
        trader_id,
    })
}
