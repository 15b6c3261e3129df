//! JSON report adapter implementing ReportPort.
//!
//! Dates are written as `DD-MM-YYYY` and every monetary or percentage value
//! is rounded to two decimals here, at the output boundary.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlphaCrossError;
use crate::domain::features::Snapshot;
use crate::domain::label_codec::LabelSource;
use crate::domain::metrics::{Summary, round2};
use crate::domain::position::Trade;
use crate::domain::predictor::Prediction;
use crate::ports::report_port::ReportPort;

const DATE_FORMAT: &str = "%d-%m-%Y";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Debug, Serialize)]
pub struct TradeLog {
    pub stock: String,
    pub entry_date: String,
    pub exit_date: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit: f64,
    pub profit_pct: f64,
}

impl From<&Trade> for TradeLog {
    fn from(t: &Trade) -> Self {
        TradeLog {
            stock: t.symbol.clone(),
            entry_date: format_date(t.entry_date),
            exit_date: format_date(t.exit_date),
            entry_price: round2(t.entry_price),
            exit_price: round2(t.exit_price),
            profit: round2(t.profit),
            profit_pct: round2(t.profit_pct),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub number_of_trades: usize,
    pub invested_amount: f64,
    pub final_amount: f64,
    pub win_rate_pct: f64,
    pub risk_reward_ratio: f64,
    pub avg_profit_pct: f64,
    pub max_loss_pct: f64,
    pub max_win_pct: f64,
    pub profit_factor: f64,
    pub pnl_pct: f64,
    pub avg_loss_pct: f64,
    pub max_drawdown_pct: f64,
}

impl From<&Summary> for SummaryReport {
    fn from(s: &Summary) -> Self {
        let s = s.rounded();
        SummaryReport {
            number_of_trades: s.number_of_trades,
            invested_amount: s.invested_amount,
            final_amount: s.final_amount,
            win_rate_pct: s.win_rate_pct,
            risk_reward_ratio: s.risk_reward_ratio,
            avg_profit_pct: s.avg_profit_pct,
            max_loss_pct: s.max_loss_pct,
            max_win_pct: s.max_win_pct,
            profit_factor: s.profit_factor,
            pnl_pct: s.pnl_pct,
            avg_loss_pct: s.avg_loss_pct,
            max_drawdown_pct: s.max_drawdown_pct,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub tier: u8,
    pub strategy: String,
    pub trade_logs: Vec<TradeLog>,
    pub summary: SummaryReport,
}

impl From<&BacktestResult> for BacktestReport {
    fn from(r: &BacktestResult) -> Self {
        BacktestReport {
            symbol: r.symbol.clone(),
            tier: r.tier.number(),
            strategy: r.tier.to_string(),
            trade_logs: r.trades.iter().map(TradeLog::from).collect(),
            summary: SummaryReport::from(&r.summary),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub symbol: String,
    pub date: String,
    pub prediction: String,
    pub signal: i8,
    pub confidence: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub label_source: &'static str,
    pub rule_based: bool,
}

impl From<&Prediction> for PredictionReport {
    fn from(p: &Prediction) -> Self {
        PredictionReport {
            symbol: p.symbol.clone(),
            date: format_date(p.date),
            prediction: p.signal.to_string(),
            signal: p.signal.as_i8(),
            confidence: round2(p.confidence),
            ema_fast: round2(p.ema_fast),
            ema_slow: round2(p.ema_slow),
            rsi: round2(p.rsi),
            label_source: match p.source {
                LabelSource::Target => "target",
                LabelSource::Signal => "signal",
            },
            rule_based: p.rule_based,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotReport {
    pub symbol: String,
    pub date: String,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
}

impl SnapshotReport {
    pub fn new(symbol: &str, s: &Snapshot) -> Self {
        SnapshotReport {
            symbol: symbol.to_string(),
            date: format_date(s.date),
            close: round2(s.close),
            ema_fast: round2(s.ema_fast),
            ema_slow: round2(s.ema_slow),
            rsi: round2(s.rsi),
        }
    }
}

/// Writes one JSON document per call, followed by a newline.
#[derive(Debug, Default)]
pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn emit<T: Serialize>(&self, value: &T, out: &mut dyn Write) -> Result<(), AlphaCrossError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, value)?;
        } else {
            serde_json::to_writer(&mut *out, value)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_backtest(
        &self,
        result: &BacktestResult,
        out: &mut dyn Write,
    ) -> Result<(), AlphaCrossError> {
        self.emit(&BacktestReport::from(result), out)
    }

    fn write_prediction(
        &self,
        prediction: &Prediction,
        out: &mut dyn Write,
    ) -> Result<(), AlphaCrossError> {
        self.emit(&PredictionReport::from(prediction), out)
    }

    fn write_snapshot(
        &self,
        symbol: &str,
        snapshot: &Snapshot,
        out: &mut dyn Write,
    ) -> Result<(), AlphaCrossError> {
        self.emit(&SnapshotReport::new(symbol, snapshot), out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::day_record::Signal;
    use crate::domain::label_codec::LabelMapping;
    use crate::domain::strategy::Tier;
    use serde_json::Value;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn trade() -> Trade {
        Trade {
            symbol: "INFY".into(),
            entry_date: date(4),
            exit_date: date(9),
            entry_price: 100.123,
            exit_price: 105.456,
            profit: 5.333,
            profit_pct: 5.32667,
        }
    }

    fn render(f: impl FnOnce(&JsonReportAdapter, &mut Vec<u8>)) -> Value {
        let mut buf = Vec::new();
        f(&JsonReportAdapter::default(), &mut buf);
        assert_eq!(buf.last(), Some(&b'\n'));
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn backtest_report_shape() {
        let trades = vec![trade()];
        let result = BacktestResult {
            symbol: "INFY".into(),
            tier: Tier::Crossover { min_trades: 5 },
            summary: Summary::compute(&trades, 100_000.0),
            trades,
        };
        let v = render(|a, buf| a.write_backtest(&result, buf).unwrap());

        assert_eq!(v["tier"], 1);
        assert_eq!(v["strategy"], "crossover");
        let log = &v["trade_logs"][0];
        assert_eq!(log["stock"], "INFY");
        assert_eq!(log["entry_date"], "04-03-2024");
        assert_eq!(log["exit_date"], "09-03-2024");
        assert_eq!(log["entry_price"], 100.12);
        assert_eq!(log["profit_pct"], 5.33);
        assert_eq!(v["summary"]["number_of_trades"], 1);
        assert_eq!(v["summary"]["final_amount"], 100005.33);
        assert_eq!(v["summary"]["win_rate_pct"], 100.0);
    }

    #[test]
    fn empty_backtest_report() {
        let result = BacktestResult {
            symbol: "TCS".into(),
            tier: Tier::EmaProximity {
                entry_max_distance_pct: 2.0,
                exit_min_distance_pct: 5.0,
            },
            trades: Vec::new(),
            summary: Summary::empty(100_000.0),
        };
        let v = render(|a, buf| a.write_backtest(&result, buf).unwrap());
        assert_eq!(v["trade_logs"].as_array().unwrap().len(), 0);
        assert_eq!(v["summary"]["final_amount"], 100000.0);
        assert_eq!(v["summary"]["max_drawdown_pct"], 0.0);
    }

    #[test]
    fn prediction_report_shape() {
        let prediction = Prediction {
            symbol: "HDFC".into(),
            date: date(15),
            signal: Signal::Bearish,
            confidence: 0.72345,
            source: LabelSource::Target,
            mapping: LabelMapping::Ternary,
            rule_based: false,
            ema_fast: 1498.456,
            ema_slow: 1502.0,
            rsi: 38.123,
        };
        let v = render(|a, buf| a.write_prediction(&prediction, buf).unwrap());
        assert_eq!(v["symbol"], "HDFC");
        assert_eq!(v["prediction"], "Bearish");
        assert_eq!(v["signal"], -1);
        assert_eq!(v["confidence"], 0.72);
        assert_eq!(v["ema_fast"], 1498.46);
        assert_eq!(v["ema_slow"], 1502.0);
        assert_eq!(v["rsi"], 38.12);
        assert_eq!(v["label_source"], "target");
        assert_eq!(v["date"], "15-03-2024");
    }

    #[test]
    fn snapshot_report_shape() {
        let snapshot = Snapshot {
            date: date(1),
            close: 1520.456,
            ema_fast: 1510.0,
            ema_slow: 1490.004,
            rsi: 61.239,
        };
        let v = render(|a, buf| a.write_snapshot("RELIANCE", &snapshot, buf).unwrap());
        assert_eq!(v["symbol"], "RELIANCE");
        assert_eq!(v["close"], 1520.46);
        assert_eq!(v["rsi"], 61.24);
    }

    #[test]
    fn pretty_output_is_multiline() {
        let snapshot = Snapshot {
            date: date(1),
            close: 1.0,
            ema_fast: 1.0,
            ema_slow: 1.0,
            rsi: 50.0,
        };
        let mut buf = Vec::new();
        JsonReportAdapter::new(true)
            .write_snapshot("X", &snapshot, &mut buf)
            .unwrap();
        assert!(String::from_utf8(buf).unwrap().lines().count() > 2);
    }
}
