//! Rolling volatility of simple returns.
//!
//! R[i] = C[i]/C[i-1] - 1 for i >= 1.
//! VOL(n)[i] = sample standard deviation (n - 1 denominator) of R[i-n+1..=i].
//! Warmup: first n bars are invalid (R[0] does not exist).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_return_volatility(bars: &[PriceBar], window: usize) -> IndicatorSeries {
    let returns: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                f64::NAN
            } else {
                bar.return_from(bars[i - 1].close)
            }
        })
        .collect();

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = window >= 2 && i >= window;

        let value = if valid {
            let slice = &returns[i + 1 - window..=i];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let variance = slice
                .iter()
                .map(|r| {
                    let diff = r - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (window - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: bar.date,
            valid: valid && value.is_finite(),
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::ReturnVolatility(window),
        values,
    }
}
