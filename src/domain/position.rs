//! Open position state and closed trades.

use chrono::NaiveDate;

/// A single open long position. Only lives inside one tier's walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_index: usize,
}

impl Position {
    /// Records elapsed since entry.
    pub fn records_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    /// Close the position, producing the trade. Profit is per unit; there is
    /// no position sizing.
    pub fn close(self, symbol: &str, exit_date: NaiveDate, exit_price: f64) -> Trade {
        let profit = exit_price - self.entry_price;
        Trade {
            symbol: symbol.to_string(),
            entry_date: self.entry_date,
            exit_date,
            entry_price: self.entry_price,
            exit_price,
            profit,
            profit_pct: profit / self.entry_price * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub symbol: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit: f64,
    pub profit_pct: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_pct > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit_pct < 0.0
    }
}
