//! Clean-set reduction.

use super::trade::TradeRecord;
use std::collections::HashSet;

/// Records passing every check, in input order.
///
/// Duplicate identifiers are dropped first, keeping the first occurrence.
/// The remaining filters run on what survives, so a duplicated identifier
/// whose first occurrence is itself invalid has no clean representative.
pub fn clean_subset(trades: &[TradeRecord]) -> Vec<TradeRecord> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(trades.len());

    trades
        .iter()
        .filter(|&t| seen.insert(t.trade_id.as_str()))
        .filter(|t| t.has_valid_price())
        .filter(|t| t.quantity > 0)
        .filter(|t| t.status.is_valid())
        .cloned()
        .collect()
}
