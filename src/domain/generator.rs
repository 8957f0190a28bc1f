//! Synthetic trade generation and defect injection.
//!
//! Both stages draw from one caller-supplied RNG, so a run is reproducible
//! from its seed.

use super::error::TradeQaError;
use super::trade::{format_trade_id, round2, TradeRecord, TradeStatus};
use chrono::{Duration, NaiveDateTime, Timelike};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};

pub const DEFAULT_RECORD_COUNT: usize = 2000;
pub const DEFAULT_INSTRUMENTS: [&str; 7] =
    ["AAPL", "MSFT", "GOOG", "AMZN", "TSLA", "INFY", "TCS"];
pub const DEFAULT_STATUS_WEIGHTS: [f64; 3] = [0.85, 0.10, 0.05];
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
/// Upper bound on `window_minutes`: one hundred years.
pub const MAX_WINDOW_MINUTES: i64 = 100 * 366 * 24 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub record_count: usize,
    pub instruments: Vec<String>,
    pub price_min: f64,
    pub price_max: f64,
    pub quantity_min: i64,
    pub quantity_max: i64,
    /// Timestamps fall 1..=window_minutes after `base_time`.
    pub window_minutes: i64,
    /// Weights for SUCCESS, FAILED, CANCELLED.
    pub status_weights: [f64; 3],
    pub base_time: NaiveDateTime,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            record_count: DEFAULT_RECORD_COUNT,
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            price_min: 100.0,
            price_max: 3500.0,
            quantity_min: 1,
            quantity_max: 1000,
            window_minutes: 10_000,
            status_weights: DEFAULT_STATUS_WEIGHTS,
            base_time: default_base_time(),
        }
    }
}

/// Local time `DEFAULT_LOOKBACK_DAYS` ago, truncated to whole seconds.
pub fn default_base_time() -> NaiveDateTime {
    let t = chrono::Local::now().naive_local() - Duration::days(DEFAULT_LOOKBACK_DAYS);
    t.with_nanosecond(0).unwrap_or(t)
}

/// How many rows receive each kind of defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionPlan {
    pub missing_price: usize,
    pub negative_quantity: usize,
    pub duplicate_id: usize,
    /// When set, no row receives more than one defect.
    pub disjoint: bool,
}

impl Default for InjectionPlan {
    fn default() -> Self {
        Self {
            missing_price: 30,
            negative_quantity: 20,
            duplicate_id: 10,
            disjoint: false,
        }
    }
}

impl InjectionPlan {
    pub fn total(&self) -> usize {
        self.missing_price + self.negative_quantity + self.duplicate_id
    }
}

/// Row positions that received each defect, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefectPositions {
    pub missing_price: Vec<usize>,
    pub negative_quantity: Vec<usize>,
    pub duplicate_id: Vec<usize>,
}

/// Build an RNG from `seed`, drawing a fresh seed from entropy when absent.
/// Returns the seed actually used.
pub fn seeded_rng(seed: Option<u64>) -> (u64, StdRng) {
    let seed = seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "random seed");
    (seed, StdRng::seed_from_u64(seed))
}

fn invalid(key: &str, reason: impl Into<String>) -> TradeQaError {
    TradeQaError::ConfigInvalid {
        section: "generator".into(),
        key: key.into(),
        reason: reason.into(),
    }
}

/// Generate `config.record_count` well-formed trades.
pub fn generate<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Vec<TradeRecord>, TradeQaError> {
    if config.instruments.is_empty() {
        return Err(invalid("instruments", "at least one instrument is required"));
    }
    for (key, value) in [("price_min", config.price_min), ("price_max", config.price_max)] {
        if !value.is_finite() {
            return Err(invalid(key, format!("{key} must be a finite number")));
        }
    }
    if config.price_min > config.price_max {
        return Err(invalid("price_min", "price_min must not exceed price_max"));
    }
    if config.quantity_min > config.quantity_max {
        return Err(invalid("quantity_min", "quantity_min must not exceed quantity_max"));
    }
    if !(1..=MAX_WINDOW_MINUTES).contains(&config.window_minutes) {
        return Err(invalid(
            "window_minutes",
            format!("window_minutes must be between 1 and {MAX_WINDOW_MINUTES}"),
        ));
    }
    let status_dist = WeightedIndex::new(config.status_weights)
        .map_err(|e| invalid("weight_success", format!("invalid status weights: {e}")))?;

    let statuses = &TradeStatus::VALID;
    let mut trades = Vec::with_capacity(config.record_count);

    for seq in 1..=config.record_count {
        let offset = rng.gen_range(1..=config.window_minutes);
        let timestamp = config
            .base_time
            .checked_add_signed(Duration::minutes(offset))
            .ok_or_else(|| invalid("window_minutes", "timestamp window runs past the calendar"))?;
        let instrument = config
            .instruments
            .choose(rng)
            .cloned()
            .unwrap_or_default();
        let price = round2(rng.gen_range(config.price_min..=config.price_max));
        let quantity = rng.gen_range(config.quantity_min..=config.quantity_max);
        let status = statuses[status_dist.sample(rng)].clone();

        trades.push(TradeRecord {
            trade_id: format_trade_id(seq),
            timestamp,
            instrument,
            price: Some(price),
            quantity,
            status,
        });
    }

    tracing::debug!(count = trades.len(), "trades generated");
    Ok(trades)
}

/// Pick the rows each defect will be applied to.
///
/// Each kind is drawn without replacement, so counts are exact. Duplicate
/// targets never include row 0, whose identifier is the one copied.
pub fn choose_positions<R: Rng + ?Sized>(
    record_count: usize,
    plan: &InjectionPlan,
    rng: &mut R,
) -> Result<DefectPositions, TradeQaError> {
    let n = record_count;
    let dup_pool = n.saturating_sub(1);

    if plan.disjoint {
        if plan.total() > dup_pool {
            return Err(TradeQaError::ConfigInvalid {
                section: "defects".into(),
                key: "disjoint".into(),
                reason: format!(
                    "{} disjoint defects need more than {} records",
                    plan.total(),
                    n
                ),
            });
        }
        let mut picked: Vec<usize> = index::sample(rng, dup_pool, plan.total())
            .into_iter()
            .map(|i| i + 1)
            .collect();
        let duplicate_id = picked.split_off(plan.missing_price + plan.negative_quantity);
        let negative_quantity = picked.split_off(plan.missing_price);
        return Ok(DefectPositions {
            missing_price: sorted(picked),
            negative_quantity: sorted(negative_quantity),
            duplicate_id: sorted(duplicate_id),
        });
    }

    for (key, count, pool) in [
        ("missing_price", plan.missing_price, n),
        ("negative_quantity", plan.negative_quantity, n),
        ("duplicate_id", plan.duplicate_id, dup_pool),
    ] {
        if count > pool {
            return Err(TradeQaError::ConfigInvalid {
                section: "defects".into(),
                key: key.into(),
                reason: format!("cannot pick {} of {} rows", count, pool),
            });
        }
    }

    let missing_price = index::sample(rng, n, plan.missing_price).into_vec();
    let negative_quantity = index::sample(rng, n, plan.negative_quantity).into_vec();
    let duplicate_id = index::sample(rng, dup_pool, plan.duplicate_id)
        .into_iter()
        .map(|i| i + 1)
        .collect();

    Ok(DefectPositions {
        missing_price: sorted(missing_price),
        negative_quantity: sorted(negative_quantity),
        duplicate_id: sorted(duplicate_id),
    })
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

/// Corrupt `trades` in place: null prices, set quantities to -1, then copy
/// the first record's identifier onto the duplicate targets.
pub fn apply_defects(
    trades: &mut [TradeRecord],
    positions: &DefectPositions,
) -> Result<(), TradeQaError> {
    let n = trades.len();
    let out_of_range = positions
        .missing_price
        .iter()
        .chain(&positions.negative_quantity)
        .chain(&positions.duplicate_id)
        .find(|&&p| p >= n);
    if let Some(p) = out_of_range {
        return Err(TradeQaError::ConfigInvalid {
            section: "defects".into(),
            key: "positions".into(),
            reason: format!("row {} is out of range for {} records", p, n),
        });
    }

    for &p in &positions.missing_price {
        trades[p].price = None;
    }
    for &p in &positions.negative_quantity {
        trades[p].quantity = -1;
    }
    if let Some(first_id) = trades.first().map(|t| t.trade_id.clone()) {
        for &p in &positions.duplicate_id {
            trades[p].trade_id = first_id.clone();
        }
    }
    Ok(())
}

/// Choose defect positions per `plan` and apply them.
pub fn inject_defects<R: Rng + ?Sized>(
    trades: &mut [TradeRecord],
    plan: &InjectionPlan,
    rng: &mut R,
) -> Result<DefectPositions, TradeQaError> {
    let positions = choose_positions(trades.len(), plan, rng)?;
    apply_defects(trades, &positions)?;
    tracing::debug!(
        missing_price = ?positions.missing_price,
        negative_quantity = ?positions.negative_quantity,
        duplicate_id = ?positions.duplicate_id,
        "defects injected"
    );
    Ok(positions)
}
