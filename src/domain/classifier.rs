//! Error classification: one error-log entry per violated rule.

use super::rule::{ErrorType, RuleSet};
use super::trade::TradeRecord;
use std::collections::BTreeMap;

/// A trade tagged with the rule it violated.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub trade: TradeRecord,
    pub error_type: ErrorType,
}

/// Concatenation of the per-rule subsets, in [`ErrorType::ALL`] order.
///
/// Entries are not deduplicated: a trade failing two rules is logged twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorLog {
    pub entries: Vec<ErrorRecord>,
}

impl ErrorLog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries logged under `error_type`, in input order.
    pub fn of_type(&self, error_type: ErrorType) -> impl Iterator<Item = &ErrorRecord> {
        self.entries
            .iter()
            .filter(move |e| e.error_type == error_type)
    }

    /// Entry count per rule. Rules with no matches are reported as zero.
    pub fn count_by_type(&self) -> BTreeMap<ErrorType, usize> {
        let mut counts: BTreeMap<ErrorType, usize> =
            ErrorType::ALL.into_iter().map(|t| (t, 0)).collect();
        for e in &self.entries {
            *counts.entry(e.error_type).or_insert(0) += 1;
        }
        counts
    }
}

/// Trades in `trades` that violate `rule`, in input order.
pub fn matching<'a>(
    rules: &RuleSet<'_>,
    trades: &'a [TradeRecord],
    rule: ErrorType,
) -> Vec<&'a TradeRecord> {
    trades.iter().filter(|t| rules.violates(rule, t)).collect()
}

/// Apply every rule to `trades` and build the combined error log.
pub fn classify(trades: &[TradeRecord]) -> ErrorLog {
    let rules = RuleSet::new(trades);
    let mut entries = Vec::new();

    for rule in ErrorType::ALL {
        let subset = matching(&rules, trades, rule);
        tracing::debug!(rule = %rule, count = subset.len(), "rule evaluated");
        entries.extend(subset.into_iter().map(|t| ErrorRecord {
            trade: t.clone(),
            error_type: rule,
        }));
    }

    ErrorLog { entries }
}
