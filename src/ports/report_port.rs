//! Report output port trait.

use std::io::Write;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlphaCrossError;
use crate::domain::features::Snapshot;
use crate::domain::predictor::Prediction;

/// Port for writing run results. Writers receive the output sink so the
/// CLI can send reports to stdout and tests to a buffer.
pub trait ReportPort {
    fn write_backtest(
        &self,
        result: &BacktestResult,
        out: &mut dyn Write,
    ) -> Result<(), AlphaCrossError>;

    fn write_prediction(
        &self,
        prediction: &Prediction,
        out: &mut dyn Write,
    ) -> Result<(), AlphaCrossError>;

    fn write_snapshot(
        &self,
        symbol: &str,
        snapshot: &Snapshot,
        out: &mut dyn Write,
    ) -> Result<(), AlphaCrossError>;
}
