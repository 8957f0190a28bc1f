//! Trade record representation.

use chrono::NaiveDateTime;
use std::fmt;

/// Timestamp layout used in every trade file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column headers of a trade file, in order.
pub const TRADE_COLUMNS: [&str; 6] = [
    "Trade_ID",
    "Timestamp",
    "Instrument",
    "Price",
    "Quantity",
    "Trade_Status",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TradeStatus {
    Success,
    Failed,
    Cancelled,
    /// A status read from a file that is not one of the three known values.
    Unknown(String),
}

impl TradeStatus {
    /// The three statuses a trade may legitimately carry.
    pub const VALID: [TradeStatus; 3] = [
        TradeStatus::Success,
        TradeStatus::Failed,
        TradeStatus::Cancelled,
    ];

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "SUCCESS" => TradeStatus::Success,
            "FAILED" => TradeStatus::Failed,
            "CANCELLED" => TradeStatus::Cancelled,
            other => TradeStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TradeStatus::Success => "SUCCESS",
            TradeStatus::Failed => "FAILED",
            TradeStatus::Cancelled => "CANCELLED",
            TradeStatus::Unknown(s) => s,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, TradeStatus::Unknown(_))
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub trade_id: String,
    pub timestamp: NaiveDateTime,
    pub instrument: String,
    /// `None` when the price is missing.
    pub price: Option<f64>,
    pub quantity: i64,
    pub status: TradeStatus,
}

impl TradeRecord {
    pub fn has_valid_price(&self) -> bool {
        matches!(self.price, Some(p) if p > 0.0)
    }
}

/// Zero-padded sequential identifier: `T000001`, `T000002`, ...
pub fn format_trade_id(seq: usize) -> String {
    format!("T{:06}", seq)
}

/// Round to 2 decimal places, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
