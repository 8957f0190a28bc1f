//! Summary data-quality metrics.

use super::error::TradeQaError;
use super::trade::round2;

/// Metric labels, in the order they are written.
pub const METRIC_LABELS: [&str; 4] = [
    "Total Trades",
    "Clean Trades",
    "Error Records",
    "Data Accuracy (%)",
];

/// How an empty input set is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Accuracy over zero trades is reported as NaN.
    #[default]
    Permissive,
    /// An empty input set is an error.
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityMetrics {
    pub total_trades: usize,
    pub clean_trades: usize,
    pub error_records: usize,
    /// `round(100 * clean / total, 2)`.
    pub accuracy_pct: f64,
}

impl QualityMetrics {
    pub fn compute(
        total_trades: usize,
        clean_trades: usize,
        error_records: usize,
        mode: ValidationMode,
    ) -> Result<Self, TradeQaError> {
        if total_trades == 0 && mode == ValidationMode::Strict {
            return Err(TradeQaError::EmptyDataset);
        }

        // 0/0 is NaN in permissive mode.
        let accuracy_pct = round2(clean_trades as f64 / total_trades as f64 * 100.0);

        Ok(Self {
            total_trades,
            clean_trades,
            error_records,
            accuracy_pct,
        })
    }

    /// `(label, value)` rows in [`METRIC_LABELS`] order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            (METRIC_LABELS[0], self.total_trades.to_string()),
            (METRIC_LABELS[1], self.clean_trades.to_string()),
            (METRIC_LABELS[2], self.error_records.to_string()),
            (METRIC_LABELS[3], format_accuracy(self.accuracy_pct)),
        ]
    }
}

/// Accuracy always carries a decimal point (`97.0`, `96.55`); NaN is `NaN`.
pub fn format_accuracy(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
