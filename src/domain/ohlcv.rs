//! Daily price bar as delivered by a data port.

use chrono::NaiveDate;

/// End-of-day close for one symbol. Volume is carried through but unused by
/// the signal pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// Simple return relative to the previous close.
    pub fn return_from(&self, prev_close: f64) -> f64 {
        if prev_close == 0.0 {
            return f64::NAN;
        }
        self.close / prev_close - 1.0
    }
}
