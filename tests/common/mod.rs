#![allow(dead_code)]

use alphacross::domain::day_record::{DayRecord, Signal, assign_targets};
use alphacross::domain::error::AlphaCrossError;
pub use alphacross::domain::ohlcv::PriceBar;
use alphacross::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

pub struct MockDataPort {
    pub data: BTreeMap<String, Vec<PriceBar>>,
    pub errors: BTreeMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, AlphaCrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(AlphaCrossError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(AlphaCrossError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, AlphaCrossError> {
        Ok(self.data.keys().cloned().collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

pub fn make_bars(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            symbol: symbol.to_string(),
            date: day(i),
            close,
            volume: 1000,
        })
        .collect()
}

/// Oscillating closes with drift; long enough series produce all three
/// EMA orderings and several crossovers.
pub fn wave_closes(n: usize, period: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 12.0 * (i as f64 / period).sin() + i as f64 * 0.05)
        .collect()
}

/// Records whose EMA spread encodes `signals` (+1 / 0 / -1) with the given
/// closes. Targets are assigned `horizon` records ahead.
pub fn records_from_signals(signals: &[i8], closes: &[f64], horizon: usize) -> Vec<DayRecord> {
    let mut records: Vec<DayRecord> = signals
        .iter()
        .zip(closes)
        .enumerate()
        .map(|(i, (&s, &close))| DayRecord::from_emas(day(i), close, 100.0 + s as f64, 100.0))
        .collect();
    assign_targets(&mut records, horizon);
    records
}

/// Records with explicit EMA pairs, for distance-band tests.
pub fn records_from_emas(pairs: &[(f64, f64)], closes: &[f64]) -> Vec<DayRecord> {
    pairs
        .iter()
        .zip(closes)
        .enumerate()
        .map(|(i, (&(fast, slow), &close))| DayRecord::from_emas(day(i), close, fast, slow))
        .collect()
}

pub fn signal_of(value: i8) -> Signal {
    Signal::from_i8(value).unwrap()
}

pub fn write_csv(dir: &Path, symbol: &str, bars: &[PriceBar]) {
    let mut content = String::from("date,close,volume\n");
    for bar in bars {
        content.push_str(&format!(
            "{},{},{}\n",
            bar.date.format("%Y-%m-%d"),
            bar.close,
            bar.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
