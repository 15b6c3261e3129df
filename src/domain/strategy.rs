//! Entry/exit rule tiers of the escalation ladder.
//!
//! Each tier is an immutable rule pair plus the minimum number of completed
//! trades it must produce to be accepted. The ladder is walked in order by
//! [`crate::domain::backtest::run_backtest`].

use crate::domain::backtest::BacktestConfig;
use crate::domain::crossover::Crossover;
use crate::domain::day_record::{DayRecord, Signal};
use crate::domain::position::Position;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tier {
    /// Enter on a bullish cross, exit on a bearish cross.
    Crossover { min_trades: usize },
    /// Same transitions, recomputed from the prior record's signal rather
    /// than the crossover event. The first record's prior is Neutral.
    SignalRescan { min_trades: usize },
    /// Crossover entry; exit on a bearish cross or after `max_hold` records.
    TimeStop { min_trades: usize, max_hold: usize },
    /// Enter while the EMAs are bullish and close together, exit when they
    /// turn bearish or drift apart. Terminal: always accepted.
    EmaProximity {
        entry_max_distance_pct: f64,
        exit_min_distance_pct: f64,
    },
}

impl Tier {
    /// The four tiers in escalation order.
    pub fn ladder(config: &BacktestConfig) -> [Tier; 4] {
        [
            Tier::Crossover {
                min_trades: config.tier1_min_trades,
            },
            Tier::SignalRescan {
                min_trades: config.tier2_min_trades,
            },
            Tier::TimeStop {
                min_trades: config.tier3_min_trades,
                max_hold: config.max_hold_records,
            },
            Tier::EmaProximity {
                entry_max_distance_pct: config.entry_proximity_pct,
                exit_min_distance_pct: config.exit_divergence_pct,
            },
        ]
    }

    pub fn number(&self) -> u8 {
        match self {
            Tier::Crossover { .. } => 1,
            Tier::SignalRescan { .. } => 2,
            Tier::TimeStop { .. } => 3,
            Tier::EmaProximity { .. } => 4,
        }
    }

    /// Completed trades required for acceptance; `None` for the terminal tier.
    pub fn min_trades(&self) -> Option<usize> {
        match *self {
            Tier::Crossover { min_trades }
            | Tier::SignalRescan { min_trades }
            | Tier::TimeStop { min_trades, .. } => Some(min_trades),
            Tier::EmaProximity { .. } => None,
        }
    }

    pub fn accepts(&self, completed_trades: usize) -> bool {
        self.min_trades().is_none_or(|min| completed_trades >= min)
    }

    pub fn should_enter(&self, records: &[DayRecord], i: usize) -> bool {
        let record = &records[i];
        match *self {
            Tier::Crossover { .. } | Tier::TimeStop { .. } => {
                Crossover::at(records, i) == Crossover::BullishCross
            }
            Tier::SignalRescan { .. } => {
                record.signal == Signal::Bullish && prior_signal(records, i) <= Signal::Neutral
            }
            Tier::EmaProximity {
                entry_max_distance_pct,
                ..
            } => {
                record.ema_fast > record.ema_slow
                    && record.ema_distance_pct() < entry_max_distance_pct
            }
        }
    }

    pub fn should_exit(&self, records: &[DayRecord], i: usize, position: &Position) -> bool {
        let record = &records[i];
        match *self {
            Tier::Crossover { .. } => Crossover::at(records, i) == Crossover::BearishCross,
            Tier::SignalRescan { .. } => {
                record.signal == Signal::Bearish && prior_signal(records, i) >= Signal::Neutral
            }
            Tier::TimeStop { max_hold, .. } => {
                Crossover::at(records, i) == Crossover::BearishCross
                    || position.records_held(i) >= max_hold
            }
            Tier::EmaProximity {
                exit_min_distance_pct,
                ..
            } => {
                record.ema_fast < record.ema_slow
                    || record.ema_distance_pct() > exit_min_distance_pct
            }
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Crossover { .. } => write!(f, "crossover"),
            Tier::SignalRescan { .. } => write!(f, "signal-rescan"),
            Tier::TimeStop { max_hold, .. } => write!(f, "time-stop({})", max_hold),
            Tier::EmaProximity { .. } => write!(f, "ema-proximity"),
        }
    }
}

/// Signal of the nearest earlier record, scanning backward from `i`.
fn prior_signal(records: &[DayRecord], i: usize) -> Signal {
    records[..i]
        .last()
        .map(|r| r.signal)
        .unwrap_or(Signal::Neutral)
}
