//! Price history access port trait.

use crate::domain::error::AlphaCrossError;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// Daily bars for `symbol`, oldest first, one bar per date.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, AlphaCrossError>;

    fn list_symbols(&self) -> Result<Vec<String>, AlphaCrossError>;
}
