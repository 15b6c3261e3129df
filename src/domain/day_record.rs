//! Per-day signal records and the directional state they carry.

use chrono::NaiveDate;
use std::fmt;

/// Directional state derived from the fast/slow EMA spread.
///
/// Ordering follows the numeric encoding, so `Bearish < Neutral < Bullish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signal {
    Bearish,
    Neutral,
    Bullish,
}

impl Signal {
    /// `sign(ema_fast - ema_slow)`, Neutral only on exact equality.
    pub fn from_emas(ema_fast: f64, ema_slow: f64) -> Self {
        if ema_fast > ema_slow {
            Signal::Bullish
        } else if ema_fast < ema_slow {
            Signal::Bearish
        } else {
            Signal::Neutral
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Bearish => -1,
            Signal::Neutral => 0,
            Signal::Bullish => 1,
        }
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Signal::Bearish),
            0 => Some(Signal::Neutral),
            1 => Some(Signal::Bullish),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Bearish => write!(f, "Bearish"),
            Signal::Neutral => write!(f, "Neutral"),
            Signal::Bullish => write!(f, "Bullish"),
        }
    }
}

/// One row of the signal series. Built once by the feature pipeline and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_fast_slope: f64,
    pub ema_slow_slope: f64,
    pub rsi: f64,
    pub returns: f64,
    pub volatility: f64,
    pub signal: Signal,
    /// Signal observed a fixed number of records ahead; `None` near the end.
    pub target: Option<Signal>,
}

impl DayRecord {
    /// Record carrying only price and EMAs; the classifier-only columns are
    /// zeroed. Used where the caller already has the two averages.
    pub fn from_emas(date: NaiveDate, close: f64, ema_fast: f64, ema_slow: f64) -> Self {
        DayRecord {
            date,
            close,
            ema_fast,
            ema_slow,
            ema_fast_slope: 0.0,
            ema_slow_slope: 0.0,
            rsi: 0.0,
            returns: 0.0,
            volatility: 0.0,
            signal: Signal::from_emas(ema_fast, ema_slow),
            target: None,
        }
    }

    /// `|ema_fast - ema_slow| / ema_slow * 100`.
    pub fn ema_distance_pct(&self) -> f64 {
        (self.ema_fast - self.ema_slow).abs() / self.ema_slow * 100.0
    }
}

/// Fill `target` with the signal `horizon` records ahead.
pub fn assign_targets(records: &mut [DayRecord], horizon: usize) {
    let n = records.len();
    for i in 0..n {
        records[i].target = if i + horizon < n {
            Some(records[i + horizon].signal)
        } else {
            None
        };
    }
}
