//! Stage composition: generation, then classification, reduction and
//! metrics over an in-memory record set.

use super::classifier::{classify, ErrorLog};
use super::clean::clean_subset;
use super::error::TradeQaError;
use super::generator::{
    generate, inject_defects, DefectPositions, GeneratorConfig, InjectionPlan,
};
use super::metrics::{QualityMetrics, ValidationMode};
use super::trade::TradeRecord;
use rand::Rng;

/// Generated trades plus the rows that were corrupted.
#[derive(Debug, Clone)]
pub struct GeneratedDataset {
    pub trades: Vec<TradeRecord>,
    pub defects: DefectPositions,
}

/// Everything the validation pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub error_log: ErrorLog,
    pub clean: Vec<TradeRecord>,
    pub metrics: QualityMetrics,
}

/// Generate trades and inject the planned defects with one RNG.
pub fn build_dataset<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    plan: &InjectionPlan,
    rng: &mut R,
) -> Result<GeneratedDataset, TradeQaError> {
    let mut trades = generate(config, rng)?;
    let defects = inject_defects(&mut trades, plan, rng)?;
    Ok(GeneratedDataset { trades, defects })
}

/// Classify `trades`, reduce them to the clean subset and compute metrics.
pub fn validate(
    trades: &[TradeRecord],
    mode: ValidationMode,
) -> Result<ValidationReport, TradeQaError> {
    if trades.is_empty() && mode == ValidationMode::Strict {
        return Err(TradeQaError::EmptyDataset);
    }

    let error_log = classify(trades);
    let clean = clean_subset(trades);
    let metrics = QualityMetrics::compute(trades.len(), clean.len(), error_log.len(), mode)?;

    tracing::info!(
        total = metrics.total_trades,
        clean = metrics.clean_trades,
        errors = metrics.error_records,
        accuracy = metrics.accuracy_pct,
        "validation complete"
    );

    Ok(ValidationReport {
        error_log,
        clean,
        metrics,
    })
}
