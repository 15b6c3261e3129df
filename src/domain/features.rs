//! Price bars to day records.
//!
//! Computes both EMAs, their slopes, RSI, simple returns and rolling return
//! volatility, then the directional signal and its look-ahead target. Rows
//! still inside any indicator's warm-up are dropped; the trailing rows keep
//! `target = None`.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::day_record::{DayRecord, Signal};
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::stddev::calculate_return_volatility;
use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub rsi_period: usize,
    pub slope_lag: usize,
    pub volatility_window: usize,
    pub target_horizon: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            fast_period: 20,
            slow_period: 50,
            rsi_period: 14,
            slope_lag: 3,
            volatility_window: 10,
            target_horizon: 2,
        }
    }
}

/// Latest values shown by the `info` command.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
}

pub fn build_day_records(bars: &[PriceBar], config: &FeatureConfig) -> Vec<DayRecord> {
    let ema_fast = calculate_ema(bars, config.fast_period);
    let ema_slow = calculate_ema(bars, config.slow_period);
    let rsi_series = calculate_rsi(bars, config.rsi_period);
    let volatility = calculate_return_volatility(bars, config.volatility_window);

    // Targets look ahead over the full series, before warm-up rows are dropped.
    let signals: Vec<Option<Signal>> = (0..bars.len())
        .map(|i| match (ema_fast.value_at(i), ema_slow.value_at(i)) {
            (Some(fast), Some(slow)) => Some(Signal::from_emas(fast, slow)),
            _ => None,
        })
        .collect();

    let mut records = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let lag = config.slope_lag;
        if i == 0 || i < lag {
            continue;
        }
        let (Some(fast), Some(slow), Some(fast_prev), Some(slow_prev), Some(rsi), Some(vol)) = (
            ema_fast.value_at(i),
            ema_slow.value_at(i),
            ema_fast.value_at(i - lag),
            ema_slow.value_at(i - lag),
            rsi_series.value_at(i),
            volatility.value_at(i),
        ) else {
            continue;
        };

        let record = DayRecord {
            date: bar.date,
            close: bar.close,
            ema_fast: fast,
            ema_slow: slow,
            ema_fast_slope: (fast - fast_prev) / fast_prev,
            ema_slow_slope: (slow - slow_prev) / slow_prev,
            rsi,
            returns: bar.return_from(bars[i - 1].close),
            volatility: vol,
            signal: Signal::from_emas(fast, slow),
            target: signals.get(i + config.target_horizon).copied().flatten(),
        };
        if record.close > 0.0 && is_finite(&record) {
            records.push(record);
        }
    }

    debug!(
        bars = bars.len(),
        records = records.len(),
        "day records built"
    );
    records
}

pub fn latest_snapshot(records: &[DayRecord]) -> Option<Snapshot> {
    records.last().map(|r| Snapshot {
        date: r.date,
        close: r.close,
        ema_fast: r.ema_fast,
        ema_slow: r.ema_slow,
        rsi: r.rsi,
    })
}

fn is_finite(r: &DayRecord) -> bool {
    [
        r.close,
        r.ema_fast,
        r.ema_slow,
        r.ema_fast_slope,
        r.ema_slow_slope,
        r.rsi,
        r.returns,
        r.volatility,
    ]
    .iter()
    .all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                close,
                volume: 1000,
            })
            .collect()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 10.0 * (i as f64 / 6.0).sin() + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn warmup_rows_are_dropped() {
        let bars = make_bars(&wave(60));
        let records = build_day_records(&bars, &FeatureConfig::default());
        // RSI(14) is the longest warm-up with the default config.
        assert_eq!(records.len(), 60 - 14);
        assert_eq!(records[0].date, bars[14].date);
    }

    #[test]
    fn trailing_rows_have_no_target() {
        let bars = make_bars(&wave(60));
        let records = build_day_records(&bars, &FeatureConfig::default());
        let n = records.len();
        assert!(records[n - 1].target.is_none());
        assert!(records[n - 2].target.is_none());
        assert_eq!(records[n - 3].target, Some(records[n - 1].signal));
    }

    #[test]
    fn signal_matches_ema_order() {
        let bars = make_bars(&wave(60));
        for r in build_day_records(&bars, &FeatureConfig::default()) {
            assert_eq!(r.signal, Signal::from_emas(r.ema_fast, r.ema_slow));
        }
    }

    #[test]
    fn dates_strictly_increase() {
        let bars = make_bars(&wave(40));
        let records = build_day_records(&bars, &FeatureConfig::default());
        assert!(records.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn slope_uses_lag() {
        let bars = make_bars(&wave(30));
        let config = FeatureConfig::default();
        let records = build_day_records(&bars, &config);
        let fast = calculate_ema(&bars, config.fast_period);
        let idx = 20;
        let rec = records.iter().find(|r| r.date == bars[idx].date).unwrap();
        let expected = (fast.values[idx].value - fast.values[idx - 3].value) / fast.values[idx - 3].value;
        assert!((rec.ema_fast_slope - expected).abs() < 1e-12);
    }

    #[test]
    fn short_series_yields_nothing() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        assert!(build_day_records(&bars, &FeatureConfig::default()).is_empty());
        assert!(build_day_records(&[], &FeatureConfig::default()).is_empty());
    }

    #[test]
    fn snapshot_is_last_record() {
        let bars = make_bars(&wave(40));
        let records = build_day_records(&bars, &FeatureConfig::default());
        let snap = latest_snapshot(&records).unwrap();
        assert_eq!(snap.date, bars[39].date);
        assert!((snap.close - bars[39].close).abs() < f64::EPSILON);
        assert!(latest_snapshot(&[]).is_none());
    }
}
