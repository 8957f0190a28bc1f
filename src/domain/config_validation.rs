//! Configuration validation.
//!
//! Checks every generator and defect setting before a run starts. Missing
//! keys fall back to their defaults, so only present-but-bad values fail.

use crate::domain::error::TradeQaError;
use crate::domain::generator::{DEFAULT_RECORD_COUNT, MAX_WINDOW_MINUTES};
use crate::domain::trade::TIMESTAMP_FORMAT;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDateTime;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    validate_generator_config(config)?;
    validate_defect_config(config)?;
    Ok(())
}

pub fn validate_generator_config(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    validate_record_count(config)?;
    validate_seed(config)?;
    validate_instruments(config)?;
    validate_price_range(config)?;
    validate_quantity_range(config)?;
    validate_window(config)?;
    validate_status_weights(config)?;
    validate_base_time(config)?;
    Ok(())
}

pub fn validate_defect_config(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    let record_count = config.get_int("generator", "record_count", DEFAULT_RECORD_COUNT as i64);
    validate_defect_counts(config, record_count)
}

/// Check the `[defects]` counts against `record_count`, which may come from
/// a command-line override rather than the config.
pub fn validate_defect_counts(
    config: &dyn ConfigPort,
    record_count: i64,
) -> Result<(), TradeQaError> {
    if record_count <= 0 {
        return Err(invalid(
            "generator",
            "record_count",
            "record_count must be positive".to_string(),
        ));
    }

    let mut total = 0i64;
    for (key, default) in [
        ("missing_price", 30),
        ("negative_quantity", 20),
        ("duplicate_id", 10),
    ] {
        let value = config.get_int("defects", key, default);
        if value < 0 {
            return Err(invalid("defects", key, format!("{key} must be non-negative")));
        }
        if value > record_count {
            return Err(invalid(
                "defects",
                key,
                format!("{key} must not exceed record_count ({record_count})"),
            ));
        }
        total += value;
    }

    let duplicate_id = config.get_int("defects", "duplicate_id", 10);
    if duplicate_id > 0 && duplicate_id >= record_count {
        return Err(invalid(
            "defects",
            "duplicate_id",
            "duplicate_id must be less than record_count".to_string(),
        ));
    }

    if config.get_bool("defects", "disjoint", false) && total >= record_count && total > 0 {
        return Err(invalid(
            "defects",
            "disjoint",
            format!("disjoint defects ({total}) need more than {record_count} records"),
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: String) -> TradeQaError {
    TradeQaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

fn validate_record_count(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    let value = config.get_int("generator", "record_count", DEFAULT_RECORD_COUNT as i64);
    if value <= 0 {
        return Err(invalid(
            "generator",
            "record_count",
            "record_count must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    match config.get_string("generator", "seed") {
        Some(s) if s.trim().parse::<u64>().is_err() => Err(invalid(
            "generator",
            "seed",
            "seed must be a non-negative integer".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_instruments(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    match config.get_list("generator", "instruments") {
        Some(list) if list.is_empty() => Err(invalid(
            "generator",
            "instruments",
            "at least one instrument is required".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_price_range(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    let min = config.get_double("generator", "price_min", 100.0);
    let max = config.get_double("generator", "price_max", 3500.0);
    for (key, value) in [("price_min", min), ("price_max", max)] {
        if !value.is_finite() {
            return Err(invalid("generator", key, format!("{key} must be a finite number")));
        }
    }
    if min <= 0.0 {
        return Err(invalid(
            "generator",
            "price_min",
            "price_min must be positive".to_string(),
        ));
    }
    if min > max {
        return Err(invalid(
            "generator",
            "price_min",
            "price_min must not exceed price_max".to_string(),
        ));
    }
    Ok(())
}

fn validate_quantity_range(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    let min = config.get_int("generator", "quantity_min", 1);
    let max = config.get_int("generator", "quantity_max", 1000);
    if min < 1 {
        return Err(invalid(
            "generator",
            "quantity_min",
            "quantity_min must be at least 1".to_string(),
        ));
    }
    if min > max {
        return Err(invalid(
            "generator",
            "quantity_min",
            "quantity_min must not exceed quantity_max".to_string(),
        ));
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    let window = config.get_int("generator", "window_minutes", 10_000);
    if !(1..=MAX_WINDOW_MINUTES).contains(&window) {
        return Err(invalid(
            "generator",
            "window_minutes",
            format!("window_minutes must be between 1 and {MAX_WINDOW_MINUTES}"),
        ));
    }
    Ok(())
}

fn validate_status_weights(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    let weights = [
        ("weight_success", config.get_double("generator", "weight_success", 0.85)),
        ("weight_failed", config.get_double("generator", "weight_failed", 0.10)),
        ("weight_cancelled", config.get_double("generator", "weight_cancelled", 0.05)),
    ];
    for (key, w) in weights {
        if !(w >= 0.0 && w.is_finite()) {
            return Err(invalid(
                "generator",
                key,
                format!("{key} must be a non-negative number"),
            ));
        }
    }
    if weights.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
        return Err(invalid(
            "generator",
            "weight_success",
            "status weights must not all be zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_base_time(config: &dyn ConfigPort) -> Result<(), TradeQaError> {
    match config.get_string("generator", "base_time") {
        Some(s) if NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).is_err() => {
            Err(invalid(
                "generator",
                "base_time",
                "invalid base_time format, expected YYYY-MM-DD HH:MM:SS".to_string(),
            ))
        }
        _ => Ok(()),
    }
}
