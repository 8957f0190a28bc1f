//! Validation rules applied to a trade record set.

use super::trade::TradeRecord;
use std::collections::HashMap;
use std::fmt;

/// A data-quality rule. Each rule is checked independently; one trade may
/// violate several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorType {
    MissingPrice,
    DuplicateTradeId,
    InvalidQuantity,
    InvalidStatus,
}

impl ErrorType {
    /// All rules, in the order their matches appear in the error log.
    pub const ALL: [ErrorType; 4] = [
        ErrorType::MissingPrice,
        ErrorType::DuplicateTradeId,
        ErrorType::InvalidQuantity,
        ErrorType::InvalidStatus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ErrorType::MissingPrice => "Missing Price",
            ErrorType::DuplicateTradeId => "Duplicate Trade_ID",
            ErrorType::InvalidQuantity => "Invalid Quantity",
            ErrorType::InvalidStatus => "Invalid Trade_Status",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of occurrences of each trade identifier in `trades`.
pub fn id_counts(trades: &[TradeRecord]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(trades.len());
    for t in trades {
        *counts.entry(t.trade_id.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Evaluates the four rules against one record set.
///
/// The duplicate rule needs the whole set, so identifier counts are taken
/// once up front; the other rules only look at the row itself.
pub struct RuleSet<'a> {
    id_counts: HashMap<&'a str, usize>,
}

impl<'a> RuleSet<'a> {
    pub fn new(trades: &'a [TradeRecord]) -> Self {
        Self {
            id_counts: id_counts(trades),
        }
    }

    pub fn violates(&self, rule: ErrorType, trade: &TradeRecord) -> bool {
        match rule {
            ErrorType::MissingPrice => trade.price.is_none(),
            ErrorType::DuplicateTradeId => self
                .id_counts
                .get(trade.trade_id.as_str())
                .is_some_and(|&n| n > 1),
            ErrorType::InvalidQuantity => trade.quantity <= 0,
            ErrorType::InvalidStatus => !trade.status.is_valid(),
        }
    }

    /// Rules violated by `trade`, in log order.
    pub fn violations(&self, trade: &TradeRecord) -> Vec<ErrorType> {
        ErrorType::ALL
            .into_iter()
            .filter(|&r| self.violates(r, trade))
            .collect()
    }
}
