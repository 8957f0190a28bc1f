#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use tradeqa::domain::classifier::ErrorLog;
use tradeqa::domain::error::TradeQaError;
use tradeqa::domain::generator::GeneratorConfig;
use tradeqa::domain::metrics::QualityMetrics;
pub use tradeqa::domain::trade::{TradeRecord, TradeStatus};
use tradeqa::ports::data_port::DataPort;
use tradeqa::ports::report_port::ReportPort;

/// In-memory trade store.
pub struct MockDataPort {
    pub trades: RefCell<Vec<TradeRecord>>,
    pub fail_load: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            trades: RefCell::new(Vec::new()),
            fail_load: None,
        }
    }

    pub fn with_trades(self, trades: Vec<TradeRecord>) -> Self {
        *self.trades.borrow_mut() = trades;
        self
    }

    pub fn with_load_error(mut self, reason: &str) -> Self {
        self.fail_load = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_trades(&self) -> Result<Vec<TradeRecord>, TradeQaError> {
        if let Some(reason) = &self.fail_load {
            return Err(TradeQaError::Io(std::io::Error::other(reason.clone())));
        }
        Ok(self.trades.borrow().clone())
    }

    fn save_trades(&self, trades: &[TradeRecord]) -> Result<(), TradeQaError> {
        *self.trades.borrow_mut() = trades.to_vec();
        Ok(())
    }
}

/// Captures whatever the pipeline writes.
#[derive(Default)]
pub struct MockReportPort {
    pub error_log: RefCell<Option<ErrorLog>>,
    pub clean: RefCell<Option<Vec<TradeRecord>>>,
    pub metrics: RefCell<Option<QualityMetrics>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportPort for MockReportPort {
    fn write_error_log(&self, log: &ErrorLog) -> Result<(), TradeQaError> {
        *self.error_log.borrow_mut() = Some(log.clone());
        Ok(())
    }

    fn write_clean_trades(&self, trades: &[TradeRecord]) -> Result<(), TradeQaError> {
        *self.clean.borrow_mut() = Some(trades.to_vec());
        Ok(())
    }

    fn write_metrics(&self, metrics: &QualityMetrics) -> Result<(), TradeQaError> {
        *self.metrics.borrow_mut() = Some(metrics.clone());
        Ok(())
    }
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_trade(id: &str, price: Option<f64>, quantity: i64, status: &str) -> TradeRecord {
    TradeRecord {
        trade_id: id.to_string(),
        timestamp: base_time() + chrono::Duration::minutes(quantity.abs() + 1),
        instrument: "AAPL".to_string(),
        price,
        quantity,
        status: TradeStatus::parse(status),
    }
}

/// `count` clean trades with sequential identifiers.
pub fn clean_trades(count: usize) -> Vec<TradeRecord> {
    (1..=count)
        .map(|i| make_trade(&format!("T{:06}", i), Some(100.0 + i as f64), 10, "SUCCESS"))
        .collect()
}

pub fn generator_config(record_count: usize) -> GeneratorConfig {
    GeneratorConfig {
        record_count,
        base_time: base_time(),
        ..GeneratorConfig::default()
    }
}
