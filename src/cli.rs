//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{
    CsvAdapter, CLEAN_TRADES_FILE, ERROR_LOG_FILE, METRICS_FILE,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{validate_config, validate_defect_counts};
use crate::domain::error::TradeQaError;
use crate::domain::generator::{
    default_base_time, seeded_rng, GeneratorConfig, InjectionPlan, DEFAULT_INSTRUMENTS,
    DEFAULT_RECORD_COUNT, DEFAULT_STATUS_WEIGHTS,
};
use crate::domain::metrics::{format_accuracy, ValidationMode};
use crate::domain::pipeline::{build_dataset, validate, GeneratedDataset, ValidationReport};
use crate::domain::trade::TIMESTAMP_FORMAT;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "tradeqa", about = "Synthetic trade data quality pipeline")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate mock trades with injected defects
    Generate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Validate a trade file and write the error log, clean set and metrics
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long)]
        strict: bool,
    },
    /// Generate and validate in one pass
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short = 'n', long)]
        count: Option<usize>,
        #[arg(long)]
        strict: bool,
    },
    /// Validate a configuration file
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Everything a run needs, resolved from config and command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub generator: GeneratorConfig,
    pub plan: InjectionPlan,
    pub seed: Option<u64>,
    pub data_dir: PathBuf,
    pub mode: ValidationMode,
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            config,
            data_dir,
            seed,
            count,
        } => run_generate(config.as_deref(), data_dir, seed, count),
        Command::Validate {
            config,
            data_dir,
            input,
            strict,
        } => run_validate(config.as_deref(), data_dir, input, strict),
        Command::Run {
            config,
            data_dir,
            seed,
            count,
            strict,
        } => run_all(config.as_deref(), data_dir, seed, count, strict),
        Command::CheckConfig { config } => run_check_config(&config),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Keeps any subscriber already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, TradeQaError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_generator_config(adapter: &dyn ConfigPort) -> Result<GeneratorConfig, TradeQaError> {
    let base_time = match adapter.get_string("generator", "base_time") {
        Some(s) => NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map_err(|_| {
            TradeQaError::ConfigInvalid {
                section: "generator".into(),
                key: "base_time".into(),
                reason: "invalid base_time format, expected YYYY-MM-DD HH:MM:SS".into(),
            }
        })?,
        None => default_base_time(),
    };

    Ok(GeneratorConfig {
        record_count: non_negative(
            adapter,
            "generator",
            "record_count",
            DEFAULT_RECORD_COUNT as i64,
        )?,
        instruments: adapter
            .get_list("generator", "instruments")
            .unwrap_or_else(|| DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect()),
        price_min: adapter.get_double("generator", "price_min", 100.0),
        price_max: adapter.get_double("generator", "price_max", 3500.0),
        quantity_min: adapter.get_int("generator", "quantity_min", 1),
        quantity_max: adapter.get_int("generator", "quantity_max", 1000),
        window_minutes: adapter.get_int("generator", "window_minutes", 10_000),
        status_weights: [
            adapter.get_double("generator", "weight_success", DEFAULT_STATUS_WEIGHTS[0]),
            adapter.get_double("generator", "weight_failed", DEFAULT_STATUS_WEIGHTS[1]),
            adapter.get_double("generator", "weight_cancelled", DEFAULT_STATUS_WEIGHTS[2]),
        ],
        base_time,
    })
}

pub fn build_injection_plan(adapter: &dyn ConfigPort) -> Result<InjectionPlan, TradeQaError> {
    let defaults = InjectionPlan::default();
    Ok(InjectionPlan {
        missing_price: non_negative(
            adapter,
            "defects",
            "missing_price",
            defaults.missing_price as i64,
        )?,
        negative_quantity: non_negative(
            adapter,
            "defects",
            "negative_quantity",
            defaults.negative_quantity as i64,
        )?,
        duplicate_id: non_negative(
            adapter,
            "defects",
            "duplicate_id",
            defaults.duplicate_id as i64,
        )?,
        disjoint: adapter.get_bool("defects", "disjoint", defaults.disjoint),
    })
}

fn non_negative(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<usize, TradeQaError> {
    let value = adapter.get_int(section, key, default);
    usize::try_from(value).map_err(|_| TradeQaError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{key} must be non-negative"),
    })
}

pub fn resolve_seed(adapter: &dyn ConfigPort) -> Result<Option<u64>, TradeQaError> {
    adapter
        .get_string("generator", "seed")
        .map(|s| {
            s.trim().parse::<u64>().map_err(|_| TradeQaError::ConfigInvalid {
                section: "generator".into(),
                key: "seed".into(),
                reason: "seed must be a non-negative integer".into(),
            })
        })
        .transpose()
}

pub fn resolve_mode(adapter: &dyn ConfigPort, strict_flag: bool) -> ValidationMode {
    if strict_flag || adapter.get_bool("validation", "strict", false) {
        ValidationMode::Strict
    } else {
        ValidationMode::Permissive
    }
}

pub fn resolve_data_dir(data_dir_override: Option<PathBuf>, adapter: &dyn ConfigPort) -> PathBuf {
    data_dir_override
        .or_else(|| adapter.get_string("output", "data_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Validate the config, then apply command-line overrides.
pub fn build_settings(
    adapter: &dyn ConfigPort,
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    count: Option<usize>,
    strict: bool,
) -> Result<RunSettings, TradeQaError> {
    validate_config(adapter)?;

    let mut generator = build_generator_config(adapter)?;
    if let Some(n) = count {
        validate_defect_counts(adapter, i64::try_from(n).unwrap_or(i64::MAX))?;
        generator.record_count = n;
    }

    Ok(RunSettings {
        generator,
        plan: build_injection_plan(adapter)?,
        seed: seed.or(resolve_seed(adapter)?),
        data_dir: resolve_data_dir(data_dir, adapter),
        mode: resolve_mode(adapter, strict),
    })
}

/// Generate, corrupt and persist a trade set.
pub fn run_generate_pipeline(
    data_port: &dyn DataPort,
    settings: &RunSettings,
) -> Result<GeneratedDataset, TradeQaError> {
    let (seed, mut rng) = seeded_rng(settings.seed);
    eprintln!(
        "Generating {} trades (seed {})",
        settings.generator.record_count, seed
    );
    let dataset = build_dataset(&settings.generator, &settings.plan, &mut rng)?;
    eprintln!(
        "Injected defects: {} missing prices, {} negative quantities, {} duplicate ids",
        dataset.defects.missing_price.len(),
        dataset.defects.negative_quantity.len(),
        dataset.defects.duplicate_id.len(),
    );
    data_port.save_trades(&dataset.trades)?;
    Ok(dataset)
}

/// Load a persisted trade set, validate it and write every output.
pub fn run_validate_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    mode: ValidationMode,
) -> Result<ValidationReport, TradeQaError> {
    let trades = data_port.load_trades()?;
    eprintln!("Validating {} trades", trades.len());
    let report = validate(&trades, mode)?;
    report_port.write_report(&report)?;
    Ok(report)
}

/// Generate, persist, validate the in-memory set and write every output.
pub fn run_full_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    settings: &RunSettings,
) -> Result<ValidationReport, TradeQaError> {
    let dataset = run_generate_pipeline(data_port, settings)?;
    eprintln!("Validating {} trades", dataset.trades.len());
    let report = validate(&dataset.trades, settings.mode)?;
    report_port.write_report(&report)?;
    Ok(report)
}

pub fn print_summary(report: &ValidationReport) {
    eprintln!("\n=== Error Log ===");
    for (error_type, count) in report.error_log.count_by_type() {
        eprintln!("  {:<22}{}", format!("{}:", error_type), count);
    }

    let m = &report.metrics;
    eprintln!("\n=== Metrics ===");
    eprintln!("Total Trades:      {}", m.total_trades);
    eprintln!("Clean Trades:      {}", m.clean_trades);
    eprintln!("Error Records:     {}", m.error_records);
    eprintln!("Data Accuracy:     {}%", format_accuracy(m.accuracy_pct));
}

fn print_outputs(adapter: &CsvAdapter) {
    eprintln!("\nOutputs in {}:", adapter.data_dir().display());
    for file in [ERROR_LOG_FILE, CLEAN_TRADES_FILE, METRICS_FILE] {
        eprintln!("  {file}");
    }
}

fn fail(err: &TradeQaError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_generate(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    count: Option<usize>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let settings = match build_settings(&adapter, data_dir, seed, count, false) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let csv = CsvAdapter::new(settings.data_dir.clone());
    match run_generate_pipeline(&csv, &settings) {
        Ok(_) => {
            eprintln!("Mock trade data written to: {}", csv.trades_path().display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
    input: Option<PathBuf>,
    strict: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let mode = resolve_mode(&adapter, strict);

    let mut csv = CsvAdapter::new(resolve_data_dir(data_dir, &adapter));
    if let Some(path) = input {
        csv = csv.with_trades_path(path);
    }
    eprintln!("Reading trades from {}", csv.trades_path().display());

    match run_validate_pipeline(&csv, &csv, mode) {
        Ok(report) => {
            print_summary(&report);
            print_outputs(&csv);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_all(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    count: Option<usize>,
    strict: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let settings = match build_settings(&adapter, data_dir, seed, count, strict) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let csv = CsvAdapter::new(settings.data_dir.clone());
    match run_full_pipeline(&csv, &csv, &settings) {
        Ok(report) => {
            print_summary(&report);
            eprintln!("\nWritten: {}", csv.trades_path().display());
            print_outputs(&csv);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_check_config(config_path: &Path) -> ExitCode {
    let adapter = match load_config(Some(config_path)) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let settings = match build_settings(&adapter, None, None, None, false) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let g = &settings.generator;
    let p = &settings.plan;
    eprintln!("\nGenerator:");
    eprintln!("  records:     {}", g.record_count);
    eprintln!("  instruments: {}", g.instruments.join(", "));
    eprintln!("  price:       {} to {}", g.price_min, g.price_max);
    eprintln!("  quantity:    {} to {}", g.quantity_min, g.quantity_max);
    eprintln!(
        "  seed:        {}",
        settings
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string())
    );
    eprintln!("\nDefects:");
    eprintln!("  missing price:     {}", p.missing_price);
    eprintln!("  negative quantity: {}", p.negative_quantity);
    eprintln!("  duplicate id:      {}", p.duplicate_id);
    eprintln!("  disjoint:          {}", p.disjoint);
    eprintln!("\nOutput: {}", settings.data_dir.display());
    eprintln!("Mode:   {:?}", settings.mode);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
