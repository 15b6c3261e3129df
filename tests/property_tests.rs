//! Property tests for backtest and label invariants.
//!
//! Uses proptest to verify:
//! 1. Accounting: final amount is capital plus the summed trade profit
//! 2. Trade log shape: exits follow entries and trades never overlap
//! 3. Summary consistency with the trade log
//! 4. Determinism of the whole ladder
//! 5. Label encoding round trips for every mapping

mod common;

use alphacross::domain::backtest::{BacktestConfig, run_backtest};
use alphacross::domain::day_record::{DayRecord, Signal};
use alphacross::domain::label_codec::{LabelMapping, decode_ternary, encode_ternary};
use common::*;
use proptest::prelude::*;

fn arb_signal() -> impl Strategy<Value = i8> {
    -1i8..=1
}

/// Signals paired with closes of the same length.
fn arb_series() -> impl Strategy<Value = Vec<DayRecord>> {
    (0usize..60).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_signal(), n),
            prop::collection::vec(50.0..150.0_f64, n),
        )
            .prop_map(|(signals, closes)| records_from_signals(&signals, &closes, 2))
    })
}

fn arb_labels() -> impl Strategy<Value = Vec<Signal>> {
    prop::collection::vec(arb_signal().prop_map(signal_of), 1..20)
}

proptest! {
    #[test]
    fn final_amount_is_capital_plus_profit(records in arb_series()) {
        let config = BacktestConfig::default();
        let result = run_backtest(&records, "P", &config);
        let profit: f64 = result.trades.iter().map(|t| t.profit).sum();
        prop_assert!((result.summary.final_amount - (config.initial_capital + profit)).abs() < 1e-6);
    }

    #[test]
    fn trades_are_ordered_and_disjoint(records in arb_series()) {
        let result = run_backtest(&records, "P", &BacktestConfig::default());
        for t in &result.trades {
            prop_assert!(t.entry_date < t.exit_date);
        }
        for pair in result.trades.windows(2) {
            prop_assert!(pair[0].exit_date <= pair[1].entry_date);
        }
    }

    #[test]
    fn summary_matches_trade_log(records in arb_series()) {
        let result = run_backtest(&records, "P", &BacktestConfig::default());
        let s = &result.summary;
        prop_assert_eq!(s.number_of_trades, result.trades.len());
        if result.trades.is_empty() {
            prop_assert_eq!(s.win_rate_pct, 0.0);
        } else {
            let wins = result.trades.iter().filter(|t| t.profit_pct > 0.0).count();
            let expected = wins as f64 / result.trades.len() as f64 * 100.0;
            prop_assert!((s.win_rate_pct - expected).abs() < 1e-9);
            prop_assert!(s.max_drawdown_pct >= 0.0);
        }
    }

    #[test]
    fn ladder_is_deterministic(records in arb_series()) {
        let config = BacktestConfig::default();
        prop_assert_eq!(
            run_backtest(&records, "P", &config),
            run_backtest(&records, "P", &config)
        );
    }

    #[test]
    fn rising_closes_have_no_drawdown(
        signals in prop::collection::vec(arb_signal(), 2..50),
        step in 0.1..5.0_f64,
    ) {
        let closes: Vec<f64> = (0..signals.len()).map(|i| 100.0 + step * i as f64).collect();
        let records = records_from_signals(&signals, &closes, 2);
        let result = run_backtest(&records, "P", &BacktestConfig::default());
        prop_assert!(result.trades.iter().all(|t| t.profit > 0.0));
        prop_assert_eq!(result.summary.max_drawdown_pct, 0.0);
    }

    #[test]
    fn mapping_round_trips_its_labels(labels in arb_labels()) {
        let mapping = LabelMapping::from_labels(&labels).unwrap();
        for &label in &labels {
            let class = mapping.encode(label).unwrap();
            prop_assert!(class < mapping.n_classes());
            prop_assert_eq!(mapping.decode(class), Some(label));
        }
    }

    #[test]
    fn ternary_round_trip(value in arb_signal()) {
        let signal = signal_of(value);
        prop_assert_eq!(encode_ternary(signal), (value + 1) as usize);
        prop_assert_eq!(decode_ternary(encode_ternary(signal)), Some(signal));
    }
}
