//! Single-tier trade simulation.
//!
//! Walks the record series once holding at most one long position. On each
//! record the tier's entry rule is consulted while flat and its exit rule
//! while long; a record that opens a position is not checked for exit.

use super::day_record::DayRecord;
use super::position::{Position, Trade};
use super::strategy::Tier;

/// Outcome of walking one tier over the series.
#[derive(Debug, Clone, PartialEq)]
pub struct TierRun {
    pub tier: Tier,
    /// Trades closed by the tier's exit rule, in chronological order.
    pub trades: Vec<Trade>,
    /// Position still open after the final record.
    pub open: Option<Position>,
}

impl TierRun {
    pub fn completed_trades(&self) -> usize {
        self.trades.len()
    }

    /// Consume the run, force-closing any open position at the last record.
    pub fn finish(self, records: &[DayRecord], symbol: &str) -> Vec<Trade> {
        let mut trades = self.trades;
        if let Some(trade) = self
            .open
            .and_then(|position| force_close(position, records, symbol))
        {
            trades.push(trade);
        }
        trades
    }
}

pub fn simulate_tier(records: &[DayRecord], tier: Tier, symbol: &str) -> TierRun {
    let mut trades = Vec::new();
    let mut open: Option<Position> = None;

    for (i, record) in records.iter().enumerate() {
        match open.take() {
            None => {
                if tier.should_enter(records, i) {
                    open = Some(Position {
                        entry_date: record.date,
                        entry_price: record.close,
                        entry_index: i,
                    });
                }
            }
            Some(position) => {
                if tier.should_exit(records, i, &position) {
                    trades.push(position.close(symbol, record.date, record.close));
                } else {
                    open = Some(position);
                }
            }
        }
    }

    TierRun {
        tier,
        trades,
        open,
    }
}

/// Close `position` at the final record's close. Returns `None` when the
/// series is empty or the position was opened on the final record, since a
/// trade must exit strictly after it enters.
pub fn force_close(position: Position, records: &[DayRecord], symbol: &str) -> Option<Trade> {
    let last = records.last()?;
    if last.date <= position.entry_date {
        return None;
    }
    Some(position.close(symbol, last.date, last.close))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(signals: &[i8], closes: &[f64]) -> Vec<DayRecord> {
        signals
            .iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&s, &close))| {
                let ema_slow = 100.0;
                let ema_fast = ema_slow + s as f64;
                DayRecord::from_emas(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                    close,
                    ema_fast,
                    ema_slow,
                )
            })
            .collect()
    }

    #[test]
    fn crossover_tier_round_trip() {
        let records = series(&[-1, 1, 1, -1, -1], &[10.0, 11.0, 12.0, 13.0, 14.0]);
        let run = simulate_tier(&records, Tier::Crossover { min_trades: 5 }, "TCS");
        assert_eq!(run.completed_trades(), 1);
        assert!(run.open.is_none());
        let t = &run.trades[0];
        assert_eq!(t.entry_date, records[1].date);
        assert_eq!(t.exit_date, records[3].date);
        assert!((t.profit - 2.0).abs() < 1e-12);
    }

    #[test]
    fn entry_ignored_while_open() {
        let records = series(&[-1, 1, 0, 1, -1], &[10.0, 11.0, 12.0, 13.0, 14.0]);
        let run = simulate_tier(&records, Tier::Crossover { min_trades: 5 }, "TCS");
        assert_eq!(run.completed_trades(), 1);
        assert_eq!(run.trades[0].entry_date, records[1].date);
    }

    #[test]
    fn open_position_is_reported() {
        let records = series(&[-1, 1, 1], &[10.0, 11.0, 12.0]);
        let run = simulate_tier(&records, Tier::Crossover { min_trades: 5 }, "TCS");
        assert_eq!(run.completed_trades(), 0);
        assert_eq!(run.open.as_ref().map(|p| p.entry_index), Some(1));

        let trades = run.finish(&records, "TCS");
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].exit_date, records[2].date);
        assert!((trades[0].exit_price - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_forced_close_on_entry_record() {
        let records = series(&[-1, -1, 1], &[10.0, 11.0, 12.0]);
        let run = simulate_tier(&records, Tier::Crossover { min_trades: 5 }, "TCS");
        assert!(run.open.is_some());
        assert!(run.finish(&records, "TCS").is_empty());
    }

    #[test]
    fn empty_series_produces_nothing() {
        let run = simulate_tier(&[], Tier::Crossover { min_trades: 5 }, "TCS");
        assert!(run.trades.is_empty());
        assert!(run.open.is_none());
    }

    #[test]
    fn deterministic_for_same_input() {
        let records = series(
            &[-1, 1, -1, 1, -1, 1, -1],
            &[10.0, 11.0, 10.5, 12.0, 11.0, 13.0, 12.5],
        );
        let tier = Tier::Crossover { min_trades: 5 };
        assert_eq!(
            simulate_tier(&records, tier, "X"),
            simulate_tier(&records, tier, "X")
        );
    }
}
