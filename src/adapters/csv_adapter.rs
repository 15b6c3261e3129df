//! CSV price history adapter.
//!
//! One file per symbol, `<data_dir>/<SYMBOL>.csv`, with a header naming at
//! least `date` and `close`. An optional `volume` column is read when
//! present. Dates are `YYYY-MM-DD`.

use crate::domain::error::AlphaCrossError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_error(reason: String) -> AlphaCrossError {
    AlphaCrossError::Data { reason }
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, AlphaCrossError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(AlphaCrossError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("{}: bad header: {}", path.display(), e)))?
            .clone();
        let date_col = column(&headers, "date")
            .ok_or_else(|| data_error(format!("{}: missing date column", path.display())))?;
        let close_col = column(&headers, "close")
            .ok_or_else(|| data_error(format!("{}: missing close column", path.display())))?;
        let volume_col = column(&headers, "volume");

        let mut bars = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let row = line + 2;

            let date_str = record.get(date_col).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                data_error(format!("row {}: invalid date '{}': {}", row, date_str, e))
            })?;

            let close_str = record.get(close_col).unwrap_or("").trim();
            let close: f64 = close_str.parse().map_err(|e| {
                data_error(format!("row {}: invalid close '{}': {}", row, close_str, e))
            })?;
            if !close.is_finite() || close <= 0.0 {
                return Err(data_error(format!(
                    "row {}: close must be a positive number, got '{}'",
                    row, close_str
                )));
            }

            let volume = match volume_col.and_then(|c| record.get(c)).map(str::trim) {
                None | Some("") => 0,
                Some(v) => v
                    .parse::<f64>()
                    .map_err(|e| data_error(format!("row {}: invalid volume '{}': {}", row, v, e)))?
                    as i64,
            };

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(dup) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(data_error(format!(
                "{}: duplicate date {}",
                path.display(),
                dup[0].date
            )));
        }
        if bars.is_empty() {
            return Err(AlphaCrossError::NoData {
                symbol: symbol.to_string(),
            });
        }

        debug!(symbol, bars = bars.len(), "loaded price history");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, AlphaCrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
