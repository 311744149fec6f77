//! Append-only event log for deterministic replay.
//!
//! One JSON record per line, envelope `{type, seq, ts, data}`. Types are the
//! union of input requests (`NEW_ORDER`, `CANCEL`, `REPLACE`) and output
//! events (`ORDER_ACCEPTED`, `ORDER_REJECTED`, `ORDER_CANCELLED`,
//! `ORDER_REPLACED`, `TRADE`). Writes are buffered and flushed on demand and
//! on drop. Logging is active only in deterministic mode.
//!
//! Replaying the input-typed records of a log into a fresh engine with the
//! same symbol configuration reproduces the output-typed records exactly.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::json;
use tickmatch_types::{
    CancelRequest, NewOrderRequest, OrderAcceptedEvent, OrderCancelledEvent, OrderRejectedEvent,
    OrderReplacedEvent, ReplaceRequest, Result, TickmatchError, TradeEvent,
};
use tracing::warn;

/// Record type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntryKind {
    NewOrder,
    Cancel,
    Replace,
    OrderAccepted,
    OrderRejected,
    OrderCancelled,
    OrderReplaced,
    Trade,
}

impl LogEntryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewOrder => "NEW_ORDER",
            Self::Cancel => "CANCEL",
            Self::Replace => "REPLACE",
            Self::OrderAccepted => "ORDER_ACCEPTED",
            Self::OrderRejected => "ORDER_REJECTED",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::OrderReplaced => "ORDER_REPLACED",
            Self::Trade => "TRADE",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW_ORDER" => Some(Self::NewOrder),
            "CANCEL" => Some(Self::Cancel),
            "REPLACE" => Some(Self::Replace),
            "ORDER_ACCEPTED" => Some(Self::OrderAccepted),
            "ORDER_REJECTED" => Some(Self::OrderRejected),
            "ORDER_CANCELLED" => Some(Self::OrderCancelled),
            "ORDER_REPLACED" => Some(Self::OrderReplaced),
            "TRADE" => Some(Self::Trade),
            _ => None,
        }
    }

    /// Input records are the ones fed back into an engine on replay.
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(self, Self::NewOrder | Self::Cancel | Self::Replace)
    }
}

/// One loaded log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub kind: LogEntryKind,
    pub seq: u64,
    pub ts: i64,
    pub data: serde_json::Value,
}

impl LogEntry {
    /// Decode the `data` payload into a request or event type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| TickmatchError::LogDecode(e.to_string()))
    }
}

/// Buffered JSON-lines journal of engine inputs and outputs.
#[derive(Debug, Default)]
pub struct EventLog {
    deterministic: bool,
    log_path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    sequence_number: u64,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>, deterministic: bool) -> Self {
        let mut log = Self {
            deterministic,
            log_path: Some(path.into()),
            writer: None,
            sequence_number: 0,
        };
        if deterministic {
            log.ensure_open();
        }
        log
    }

    pub fn set_deterministic(&mut self, enabled: bool) {
        self.deterministic = enabled;
        if enabled {
            self.ensure_open();
        }
    }

    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn set_log_path(&mut self, path: impl Into<PathBuf>) {
        self.log_path = Some(path.into());
        self.writer = None;
        if self.deterministic {
            self.ensure_open();
        }
    }

    // =================================================================
    // Input records
    // =================================================================

    pub fn log_new_order(&mut self, request: &NewOrderRequest) {
        self.write_record(LogEntryKind::NewOrder, serde_json::to_value(request));
    }

    pub fn log_cancel(&mut self, request: &CancelRequest) {
        self.write_record(LogEntryKind::Cancel, serde_json::to_value(request));
    }

    pub fn log_replace(&mut self, request: &ReplaceRequest) {
        self.write_record(LogEntryKind::Replace, serde_json::to_value(request));
    }

    // =================================================================
    // Output records
    // =================================================================

    pub fn log_accepted(&mut self, event: &OrderAcceptedEvent) {
        self.write_record(LogEntryKind::OrderAccepted, serde_json::to_value(event));
    }

    pub fn log_rejected(&mut self, event: &OrderRejectedEvent) {
        self.write_record(LogEntryKind::OrderRejected, serde_json::to_value(event));
    }

    pub fn log_cancelled(&mut self, event: &OrderCancelledEvent) {
        self.write_record(LogEntryKind::OrderCancelled, serde_json::to_value(event));
    }

    pub fn log_replaced(&mut self, event: &OrderReplacedEvent) {
        self.write_record(LogEntryKind::OrderReplaced, serde_json::to_value(event));
    }

    pub fn log_trade(&mut self, event: &TradeEvent) {
        self.write_record(LogEntryKind::Trade, serde_json::to_value(event));
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!(error = %e, "event log flush failed");
            }
        }
    }

    /// Load a log file for replay, in file order, skipping malformed lines.
    pub fn load_log(path: impl AsRef<Path>) -> Result<Vec<LogEntry>> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let Ok(value) = serde_json::from_str::<serde_json::Value>(&line) else {
                continue;
            };
            let Some(kind) = value
                .get("type")
                .and_then(|t| t.as_str())
                .and_then(LogEntryKind::parse)
            else {
                continue;
            };
            let (Some(seq), Some(ts)) = (
                value.get("seq").and_then(serde_json::Value::as_u64),
                value.get("ts").and_then(serde_json::Value::as_i64),
            ) else {
                continue;
            };
            let Some(data) = value.get("data") else {
                continue;
            };
            entries.push(LogEntry {
                kind,
                seq,
                ts,
                data: data.clone(),
            });
        }

        Ok(entries)
    }

    // =================================================================
    // Internals
    // =================================================================

    fn ensure_open(&mut self) {
        if self.writer.is_some() {
            return;
        }
        let Some(path) = self.log_path.clone() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(path = %path.display(), error = %e, "cannot create log directory");
                    return;
                }
            }
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => self.writer = Some(BufWriter::new(file)),
            Err(e) => warn!(path = %path.display(), error = %e, "cannot open event log"),
        }
    }

    fn write_record(
        &mut self,
        kind: LogEntryKind,
        data: std::result::Result<serde_json::Value, serde_json::Error>,
    ) {
        if !self.deterministic {
            return;
        }
        self.ensure_open();
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let data = match data {
            Ok(data) => data,
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "event log serialization failed");
                return;
            }
        };

        self.sequence_number += 1;
        let record = json!({
            "type": kind.as_str(),
            "seq": self.sequence_number,
            "ts": chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            "data": data,
        });

        if let Err(e) = writeln!(writer, "{record}") {
            warn!(kind = kind.as_str(), error = %e, "event log write failed");
        }
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use tickmatch_types::{OrderId, OrderType, Side, TimeInForce, TraderId};

    use super::*;

    fn temp_log_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "tickmatch-event-log-{tag}-{}.jsonl",
            std::process::id()
        ))
    }

    fn new_order() -> NewOrderRequest {
        NewOrderRequest {
            order_id: OrderId(1),
            trader_id: TraderId(100),
            symbol: "TEST".into(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            price: 10_000,
            quantity: 50,
            time_in_force: TimeInForce::Day,
            timestamp: 7,
        }
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let path = temp_log_path("disabled");
        let _ = std::fs::remove_file(&path);

        let mut log = EventLog::with_path(&path, false);
        log.log_new_order(&new_order());
        log.flush();

        assert!(!path.exists() || std::fs::read_to_string(&path).unwrap().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn writes_and_loads_records_in_order() {
        let path = temp_log_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let mut log = EventLog::with_path(&path, true);
        let request = new_order();
        log.log_new_order(&request);
        log.log_cancel(&CancelRequest {
            order_id: OrderId(1),
            symbol: "TEST".into(),
            timestamp: 8,
        });
        log.flush();

        let entries = EventLog::load_log(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, LogEntryKind::NewOrder);
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[1].kind, LogEntryKind::Cancel);
        assert_eq!(entries[1].seq, 2);

        let decoded: NewOrderRequest = entries[0].decode().unwrap();
        assert_eq!(decoded, request);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_log_path("malformed");
        let mut content = String::new();
        content.push_str("not json at all\n");
        content.push_str("{\"type\":\"MYSTERY\",\"seq\":1,\"ts\":0,\"data\":{}}\n");
        content.push_str("{\"type\":\"CANCEL\",\"seq\":2,\"ts\":5,\"data\":{\"order_id\":9,\"symbol\":\"T\",\"timestamp\":0}}\n");
        content.push_str("{\"type\":\"TRADE\",\"seq\":3}\n");
        std::fs::write(&path, content).unwrap();

        let entries = EventLog::load_log(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogEntryKind::Cancel);
        assert_eq!(entries[0].ts, 5);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let missing = temp_log_path("does-not-exist");
        let _ = std::fs::remove_file(&missing);
        assert!(EventLog::load_log(&missing).is_err());
    }

    #[test]
    fn input_kinds_are_flagged() {
        assert!(LogEntryKind::NewOrder.is_input());
        assert!(LogEntryKind::Cancel.is_input());
        assert!(LogEntryKind::Replace.is_input());
        assert!(!LogEntryKind::Trade.is_input());
        assert!(!LogEntryKind::OrderAccepted.is_input());
    }

    #[test]
    fn kind_string_roundtrip() {
        for kind in [
            LogEntryKind::NewOrder,
            LogEntryKind::Cancel,
            LogEntryKind::Replace,
            LogEntryKind::OrderAccepted,
            LogEntryKind::OrderRejected,
            LogEntryKind::OrderCancelled,
            LogEntryKind::OrderReplaced,
            LogEntryKind::Trade,
        ] {
            assert_eq!(LogEntryKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(LogEntryKind::parse("NOPE"), None);
    }
}
