//! Crossover detection between consecutive records.

use crate::domain::day_record::{DayRecord, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    BullishCross,
    BearishCross,
    None,
}

impl Crossover {
    /// Transition event from `previous` to `current`.
    pub fn detect(previous: &DayRecord, current: &DayRecord) -> Self {
        Self::between(previous.signal, current.signal)
    }

    pub fn between(previous: Signal, current: Signal) -> Self {
        if current == Signal::Bullish && previous <= Signal::Neutral {
            Crossover::BullishCross
        } else if current == Signal::Bearish && previous >= Signal::Neutral {
            Crossover::BearishCross
        } else {
            Crossover::None
        }
    }

    /// Event at index `i` of a series. The first record is compared against
    /// a Neutral predecessor, so a series opening Bullish or Bearish crosses
    /// on its first record.
    pub fn at(records: &[DayRecord], i: usize) -> Self {
        match i {
            _ if i >= records.len() => Crossover::None,
            0 => Self::between(Signal::Neutral, records[0].signal),
            _ => Self::detect(&records[i - 1], &records[i]),
        }
    }
}
