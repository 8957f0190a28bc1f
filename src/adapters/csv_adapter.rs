//! CSV file adapter for trade data and validation outputs.

use crate::domain::classifier::ErrorLog;
use crate::domain::error::TradeQaError;
use crate::domain::metrics::QualityMetrics;
use crate::domain::trade::{TradeRecord, TradeStatus, TIMESTAMP_FORMAT, TRADE_COLUMNS};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const TRADES_FILE: &str = "mock_trade_data.csv";
pub const ERROR_LOG_FILE: &str = "error_log.csv";
pub const CLEAN_TRADES_FILE: &str = "clean_trades.csv";
pub const METRICS_FILE: &str = "metrics_summary.csv";

#[derive(Debug, Serialize, Deserialize)]
struct TradeRow {
    #[serde(rename = "Trade_ID")]
    trade_id: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Instrument")]
    instrument: String,
    #[serde(rename = "Price")]
    price: Option<f64>,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "Trade_Status")]
    status: String,
}

#[derive(Debug, Serialize)]
struct ErrorRow<'a> {
    #[serde(rename = "Trade_ID")]
    trade_id: &'a str,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Instrument")]
    instrument: &'a str,
    #[serde(rename = "Price")]
    price: Option<f64>,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "Trade_Status")]
    status: &'a str,
    #[serde(rename = "Error_Type")]
    error_type: &'static str,
}

#[derive(Debug, Serialize)]
struct MetricRow<'a> {
    #[serde(rename = "Metric")]
    metric: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
}

impl From<&TradeRecord> for TradeRow {
    fn from(t: &TradeRecord) -> Self {
        Self {
            trade_id: t.trade_id.clone(),
            timestamp: t.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            instrument: t.instrument.clone(),
            price: t.price,
            quantity: t.quantity,
            status: t.status.as_str().to_string(),
        }
    }
}

/// Reads and writes the pipeline's flat files under one data directory.
pub struct CsvAdapter {
    data_dir: PathBuf,
    trades_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(data_dir: PathBuf) -> Self {
        let trades_path = data_dir.join(TRADES_FILE);
        Self {
            data_dir,
            trades_path,
        }
    }

    /// Read trades from `path` instead of the data directory's trade file.
    pub fn with_trades_path(mut self, path: PathBuf) -> Self {
        self.trades_path = path;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn trades_path(&self) -> &Path {
        &self.trades_path
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    fn writer(&self, file_name: &str) -> Result<(csv::Writer<File>, PathBuf), TradeQaError> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.output_path(file_name);
        Ok((open_writer(&path)?, path))
    }
}

fn csv_error(path: &Path, err: csv::Error) -> TradeQaError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => TradeQaError::Io(io),
        _ => TradeQaError::Csv {
            file: path.display().to_string(),
            reason,
        },
    }
}

/// Accepts whole-second timestamps and the fractional and `T`-separated
/// forms other tools emit.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    [TIMESTAMP_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

/// Headers are written explicitly so that an empty table still has one.
fn open_writer(path: &Path) -> Result<csv::Writer<File>, TradeQaError> {
    let file = File::create(path)?;
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file))
}

fn write_trades_to(
    mut wtr: csv::Writer<File>,
    path: &Path,
    trades: &[TradeRecord],
) -> Result<(), TradeQaError> {
    wtr.write_record(TRADE_COLUMNS)
        .map_err(|e| csv_error(path, e))?;
    for t in trades {
        wtr.serialize(TradeRow::from(t))
            .map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

impl DataPort for CsvAdapter {
    fn load_trades(&self) -> Result<Vec<TradeRecord>, TradeQaError> {
        let path = &self.trades_path;
        let file = File::open(path)?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut trades = Vec::new();

        for (i, result) in rdr.deserialize::<TradeRow>().enumerate() {
            let row = result.map_err(|e| csv_error(path, e))?;
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| TradeQaError::Csv {
                file: path.display().to_string(),
                reason: format!("row {}: invalid timestamp {:?}", i + 1, row.timestamp),
            })?;

            trades.push(TradeRecord {
                trade_id: row.trade_id,
                timestamp,
                instrument: row.instrument,
                price: row.price.filter(|p| !p.is_nan()),
                quantity: row.quantity,
                status: TradeStatus::parse(&row.status),
            });
        }

        tracing::debug!(path = %path.display(), count = trades.len(), "trades loaded");
        Ok(trades)
    }

    fn save_trades(&self, trades: &[TradeRecord]) -> Result<(), TradeQaError> {
        if let Some(parent) = self.trades_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let wtr = open_writer(&self.trades_path)?;
        write_trades_to(wtr, &self.trades_path, trades)
    }
}

impl ReportPort for CsvAdapter {
    fn write_error_log(&self, log: &ErrorLog) -> Result<(), TradeQaError> {
        let (mut wtr, path) = self.writer(ERROR_LOG_FILE)?;

        let mut header = TRADE_COLUMNS.to_vec();
        header.push("Error_Type");
        wtr.write_record(&header)
            .map_err(|e| csv_error(&path, e))?;
        for e in &log.entries {
            let t = &e.trade;
            wtr.serialize(ErrorRow {
                trade_id: &t.trade_id,
                timestamp: t.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                instrument: &t.instrument,
                price: t.price,
                quantity: t.quantity,
                status: t.status.as_str(),
                error_type: e.error_type.label(),
            })
            .map_err(|e| csv_error(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_clean_trades(&self, trades: &[TradeRecord]) -> Result<(), TradeQaError> {
        let (wtr, path) = self.writer(CLEAN_TRADES_FILE)?;
        write_trades_to(wtr, &path, trades)
    }

    fn write_metrics(&self, metrics: &QualityMetrics) -> Result<(), TradeQaError> {
        let (mut wtr, path) = self.writer(METRICS_FILE)?;
        wtr.write_record(["Metric", "Value"])
            .map_err(|e| csv_error(&path, e))?;
        for (metric, value) in metrics.rows() {
            wtr.serialize(MetricRow {
                metric,
                value: &value,
            })
            .map_err(|e| csv_error(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
