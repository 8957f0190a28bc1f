//! Validation output port.

use crate::domain::classifier::ErrorLog;
use crate::domain::error::TradeQaError;
use crate::domain::metrics::QualityMetrics;
use crate::domain::pipeline::ValidationReport;
use crate::domain::trade::TradeRecord;

/// Port for persisting the products of a validation pass.
pub trait ReportPort {
    fn write_error_log(&self, log: &ErrorLog) -> Result<(), TradeQaError>;

    fn write_clean_trades(&self, trades: &[TradeRecord]) -> Result<(), TradeQaError>;

    fn write_metrics(&self, metrics: &QualityMetrics) -> Result<(), TradeQaError>;

    /// Default implementation: writes the three outputs in turn.
    fn write_report(&self, report: &ValidationReport) -> Result<(), TradeQaError> {
        self.write_error_log(&report.error_log)?;
        self.write_clean_trades(&report.clean)?;
        self.write_metrics(&report.metrics)
    }
}
