//! Integration tests for the generate → classify → clean → metrics pipeline.
//!
//! Tests cover:
//! - Default-sized generation with injected defects
//! - The small disjoint scenario (100 trades, 5/3/2 defects)
//! - Clean-subset invariants, checked with proptest over arbitrary record sets
//! - Idempotence of validation over a persisted (CSV) record set
//! - Port-level pipelines with in-memory mocks

mod common;

use common::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tradeqa::adapters::csv_adapter::CsvAdapter;
use tradeqa::cli::{run_full_pipeline, run_validate_pipeline, RunSettings};
use tradeqa::domain::classifier::classify;
use tradeqa::domain::clean::clean_subset;
use tradeqa::domain::error::TradeQaError;
use tradeqa::domain::generator::{apply_defects, DefectPositions, InjectionPlan};
use tradeqa::domain::metrics::ValidationMode;
use tradeqa::domain::pipeline::{build_dataset, validate};
use tradeqa::domain::rule::{id_counts, ErrorType};
use tradeqa::ports::data_port::DataPort;

mod generation {
    use super::*;

    #[test]
    fn default_run_has_configured_count_and_defects() {
        let mut rng = StdRng::seed_from_u64(42);
        let data = build_dataset(&generator_config(2000), &InjectionPlan::default(), &mut rng)
            .unwrap();

        assert_eq!(data.trades.len(), 2000);
        assert_eq!(data.trades.iter().filter(|t| t.price.is_none()).count(), 30);
        assert_eq!(data.defects.missing_price.len(), 30);
        assert_eq!(data.defects.negative_quantity.len(), 20);
        assert_eq!(data.defects.duplicate_id.len(), 10);
    }

    #[test]
    fn seed_reproduces_dataset() {
        let plan = InjectionPlan::default();
        let a = build_dataset(&generator_config(500), &plan, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let b = build_dataset(&generator_config(500), &plan, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(a.trades, b.trades);
        assert_eq!(a.defects, b.defects);
    }
}

mod classification {
    use super::*;

    #[test]
    fn duplicate_subset_shares_identifiers() {
        let mut rng = StdRng::seed_from_u64(8);
        let data = build_dataset(&generator_config(1000), &InjectionPlan::default(), &mut rng)
            .unwrap();
        let counts = id_counts(&data.trades);
        let log = classify(&data.trades);

        let dups: Vec<_> = log.of_type(ErrorType::DuplicateTradeId).collect();
        assert!(!dups.is_empty());
        for e in dups {
            assert!(counts[e.trade.trade_id.as_str()] > 1);
        }
    }

    #[test]
    fn overlapping_defects_log_each_rule() {
        let mut trades = clean_trades(10);
        let positions = DefectPositions {
            missing_price: vec![3],
            negative_quantity: vec![3],
            duplicate_id: vec![3],
        };
        apply_defects(&mut trades, &positions).unwrap();

        let log = classify(&trades);
        let third: Vec<ErrorType> = log
            .entries
            .iter()
            .filter(|e| e.trade.price.is_none())
            .map(|e| e.error_type)
            .collect();
        assert_eq!(
            third,
            vec![
                ErrorType::MissingPrice,
                ErrorType::DuplicateTradeId,
                ErrorType::InvalidQuantity,
            ]
        );
        // Row 0 is the original of the duplicated identifier.
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn invalid_status_is_flagged() {
        let trades = vec![
            make_trade("T1", Some(10.0), 1, "SUCCESS"),
            make_trade("T2", Some(10.0), 1, "SETTLED"),
            make_trade("T3", Some(10.0), 1, ""),
        ];
        let log = classify(&trades);
        let ids: Vec<_> = log
            .of_type(ErrorType::InvalidStatus)
            .map(|e| e.trade.trade_id.as_str())
            .collect();
        assert_eq!(ids, vec!["T2", "T3"]);
    }
}

mod scenario {
    use super::*;

    #[test]
    fn hundred_trades_with_disjoint_defects() {
        let plan = InjectionPlan {
            missing_price: 5,
            negative_quantity: 3,
            duplicate_id: 2,
            disjoint: true,
        };
        let mut rng = StdRng::seed_from_u64(100);
        let data = build_dataset(&generator_config(100), &plan, &mut rng).unwrap();
        let report = validate(&data.trades, ValidationMode::Permissive).unwrap();

        assert!(report.error_log.len() >= 10);
        assert!(report.clean.len() <= 90);
        assert_eq!(report.metrics.total_trades, 100);
        assert!((report.metrics.accuracy_pct - report.clean.len() as f64).abs() < 1e-9);
    }

    #[test]
    fn accuracy_matches_clean_fraction() {
        let mut trades = clean_trades(2000);
        let positions = DefectPositions {
            missing_price: (1..=30).collect(),
            negative_quantity: (31..=50).collect(),
            duplicate_id: (51..=60).collect(),
        };
        apply_defects(&mut trades, &positions).unwrap();

        let report = validate(&trades, ValidationMode::Strict).unwrap();
        assert_eq!(report.metrics.clean_trades, 1940);
        assert_eq!(report.metrics.error_records, 30 + 20 + 11);
        assert!((report.metrics.accuracy_pct - 97.0).abs() < 1e-9);
    }
}

mod persisted {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn validation_is_idempotent_over_csv() {
        let dir = TempDir::new().unwrap();
        let csv = CsvAdapter::new(dir.path().to_path_buf());
        let mut rng = StdRng::seed_from_u64(77);
        let data = build_dataset(&generator_config(400), &InjectionPlan::default(), &mut rng)
            .unwrap();
        csv.save_trades(&data.trades).unwrap();

        let first = run_validate_pipeline(&csv, &csv, ValidationMode::Permissive).unwrap();
        let log_1 = std::fs::read_to_string(dir.path().join("error_log.csv")).unwrap();
        let second = run_validate_pipeline(&csv, &csv, ValidationMode::Permissive).unwrap();
        let log_2 = std::fs::read_to_string(dir.path().join("error_log.csv")).unwrap();

        assert_eq!(first, second);
        assert_eq!(log_1, log_2);
    }

    #[test]
    fn reread_set_validates_like_in_memory_set() {
        let dir = TempDir::new().unwrap();
        let csv = CsvAdapter::new(dir.path().to_path_buf());
        let mut rng = StdRng::seed_from_u64(12);
        let data = build_dataset(&generator_config(300), &InjectionPlan::default(), &mut rng)
            .unwrap();
        csv.save_trades(&data.trades).unwrap();

        let reread = csv.load_trades().unwrap();
        assert_eq!(reread, data.trades);
        assert_eq!(
            validate(&reread, ValidationMode::Permissive).unwrap(),
            validate(&data.trades, ValidationMode::Permissive).unwrap()
        );
    }
}

mod ports {
    use super::*;

    #[test]
    fn validate_pipeline_writes_all_outputs() {
        let mut trades = clean_trades(5);
        trades[1].price = None;
        let data = MockDataPort::new().with_trades(trades);
        let reports = MockReportPort::new();

        let report = run_validate_pipeline(&data, &reports, ValidationMode::Permissive).unwrap();

        assert_eq!(reports.error_log.borrow().as_ref().unwrap().len(), 1);
        assert_eq!(reports.clean.borrow().as_ref().unwrap().len(), 4);
        assert_eq!(reports.metrics.borrow().as_ref(), Some(&report.metrics));
        assert!((report.metrics.accuracy_pct - 80.0).abs() < 1e-9);
    }

    #[test]
    fn validate_pipeline_propagates_load_error() {
        let data = MockDataPort::new().with_load_error("file vanished");
        let reports = MockReportPort::new();
        let err = run_validate_pipeline(&data, &reports, ValidationMode::Permissive).unwrap_err();
        assert!(matches!(err, TradeQaError::Io(_)));
        assert!(reports.metrics.borrow().is_none());
    }

    #[test]
    fn strict_mode_rejects_empty_input() {
        let data = MockDataPort::new();
        let reports = MockReportPort::new();
        let err = run_validate_pipeline(&data, &reports, ValidationMode::Strict).unwrap_err();
        assert!(matches!(err, TradeQaError::EmptyDataset));
        assert!(reports.error_log.borrow().is_none());
    }

    #[test]
    fn full_pipeline_saves_generated_trades() {
        let settings = RunSettings {
            generator: generator_config(200),
            plan: InjectionPlan::default(),
            seed: Some(9),
            data_dir: "unused".into(),
            mode: ValidationMode::Permissive,
        };
        let data = MockDataPort::new();
        let reports = MockReportPort::new();

        let report = run_full_pipeline(&data, &reports, &settings).unwrap();

        assert_eq!(data.trades.borrow().len(), 200);
        assert_eq!(report.metrics.total_trades, 200);
        assert_eq!(
            report.error_log.len(),
            reports.error_log.borrow().as_ref().unwrap().len()
        );
    }
}

fn arb_trade() -> impl Strategy<Value = TradeRecord> {
    (
        0u8..20,
        prop::option::of(-10.0f64..100.0),
        -3i64..5,
        prop::sample::select(vec!["SUCCESS", "FAILED", "CANCELLED", "PENDING"]),
    )
        .prop_map(|(id, price, quantity, status)| {
            make_trade(&format!("T{:06}", id), price, quantity, status)
        })
}

proptest! {
    #[test]
    fn clean_subset_satisfies_every_rule(trades in prop::collection::vec(arb_trade(), 0..60)) {
        let clean = clean_subset(&trades);

        let mut ids = HashSet::new();
        for t in &clean {
            prop_assert!(trades.contains(t));
            prop_assert!(ids.insert(t.trade_id.clone()));
            prop_assert!(t.price.is_some_and(|p| p > 0.0));
            prop_assert!(t.quantity > 0);
            prop_assert!(t.status.is_valid());
        }
    }

    #[test]
    fn error_log_counts_every_violation(trades in prop::collection::vec(arb_trade(), 0..60)) {
        let log = classify(&trades);
        let counts = id_counts(&trades);
        let expected: usize = trades
            .iter()
            .map(|t| {
                usize::from(t.price.is_none())
                    + usize::from(counts[t.trade_id.as_str()] > 1)
                    + usize::from(t.quantity <= 0)
                    + usize::from(!t.status.is_valid())
            })
            .sum();
        prop_assert_eq!(log.len(), expected);
    }
}
