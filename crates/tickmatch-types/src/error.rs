//! Error types and rejection codes.
//!
//! Two distinct tiers, kept deliberately separate:
//!
//! - [`ResultCode`] — the *request rejection* vocabulary carried inside
//!   [`crate::OrderResponse`]. Rejections are expected, observable outcomes,
//!   not errors.
//! - [`TickmatchError`] — genuine failures (decoding, I/O, parsing). All use
//!   the `TM_ERR_` prefix convention for easy grepping in logs, grouped by
//!   subsystem: 1xx codec, 2xx event log, 3xx replay/CSV, 9xx general.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a request, reported in the [`crate::OrderResponse`] and in
/// [`crate::OrderRejectedEvent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    #[default]
    Success,
    RejectedInvalidSymbol,
    RejectedInvalidPrice,
    RejectedInvalidQuantity,
    RejectedOrderNotFound,
    RejectedSelfTrade,
    RejectedFokNotFillable,
    RejectedRiskLimit,
    RejectedUnknownError,
}

impl ResultCode {
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::RejectedInvalidSymbol => "REJECTED_INVALID_SYMBOL",
            Self::RejectedInvalidPrice => "REJECTED_INVALID_PRICE",
            Self::RejectedInvalidQuantity => "REJECTED_INVALID_QUANTITY",
            Self::RejectedOrderNotFound => "REJECTED_ORDER_NOT_FOUND",
            Self::RejectedSelfTrade => "REJECTED_SELF_TRADE",
            Self::RejectedFokNotFillable => "REJECTED_FOK_NOT_FILLABLE",
            Self::RejectedRiskLimit => "REJECTED_RISK_LIMIT",
            Self::RejectedUnknownError => "REJECTED_UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Central error enum for tickmatch failures.
#[derive(Debug, Error)]
pub enum TickmatchError {
    // =================================================================
    // Binary snapshot codec (1xx)
    // =================================================================
    /// The buffer is shorter than the fixed header.
    #[error("TM_ERR_100: snapshot buffer truncated: {actual} bytes, need at least {expected}")]
    SnapshotTruncated { expected: usize, actual: usize },

    /// The magic bytes did not match `LOB1`.
    #[error("TM_ERR_101: bad snapshot magic: {0:#010x}")]
    SnapshotBadMagic(u32),

    /// Unsupported codec version.
    #[error("TM_ERR_102: unsupported snapshot version: {0}")]
    SnapshotBadVersion(u16),

    /// Declared symbol length or level counts do not fit the buffer.
    #[error("TM_ERR_103: snapshot size mismatch: {reason}")]
    SnapshotSizeMismatch { reason: String },

    /// A level count exceeded the sanity bound.
    #[error("TM_ERR_104: unreasonable snapshot level count: {0}")]
    SnapshotBadLevelCount(u32),

    // =================================================================
    // Event log (2xx)
    // =================================================================
    /// A log record could not be decoded into the expected payload type.
    #[error("TM_ERR_200: event log record decode failed: {0}")]
    LogDecode(String),

    // =================================================================
    // Replay / CSV ingestion (3xx)
    // =================================================================
    /// A CSV line failed to parse.
    #[error("TM_ERR_300: CSV parse error at line {line}: {reason}")]
    CsvParse { line: usize, reason: String },

    // =================================================================
    // General / internal (9xx)
    // =================================================================
    /// I/O error (disk).
    #[error("TM_ERR_900: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization / deserialization error.
    #[error("TM_ERR_901: serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TickmatchError>;
