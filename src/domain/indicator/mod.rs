//! Technical indicators feeding the day-record pipeline.
//!
//! - `IndicatorPoint`: one dated value plus a warm-up flag
//! - `IndicatorType`: indicator identity and parameters
//! - `IndicatorSeries`: a time series of points aligned with the input bars

pub mod ema;
pub mod rsi;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    ReturnVolatility(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index` if it exists and is past warm-up.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::ReturnVolatility(window) => write!(f, "VOLATILITY({})", window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Ema(20).to_string(), "EMA(20)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(
            IndicatorType::ReturnVolatility(10).to_string(),
            "VOLATILITY(10)"
        );
    }

    #[test]
    fn value_at_skips_warmup() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Rsi(14),
            values: vec![
                IndicatorPoint {
                    date,
                    valid: false,
                    value: 0.0,
                },
                IndicatorPoint {
                    date,
                    valid: true,
                    value: 55.0,
                },
            ],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(55.0));
        assert_eq!(series.value_at(2), None);
    }
}
