//! Performance summary over a trade log.
//!
//! All values are kept at full precision; [`Summary::rounded`] produces the
//! two-decimal form used in reports.

use super::position::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub number_of_trades: usize,
    pub invested_amount: f64,
    pub final_amount: f64,
    pub win_rate_pct: f64,
    /// Mean winner pct over |mean loser pct|. With no losing trades the
    /// denominator is taken as 1, so this is not a true ratio in that case.
    pub risk_reward_ratio: f64,
    pub avg_profit_pct: f64,
    pub max_loss_pct: f64,
    pub max_win_pct: f64,
    /// Sum of winner pct over |sum of loser pct|, with the same
    /// denominator-of-1 approximation when nothing lost.
    pub profit_factor: f64,
    pub pnl_pct: f64,
    pub avg_loss_pct: f64,
    pub max_drawdown_pct: f64,
}

impl Summary {
    /// Zero-valued summary for an empty trade log.
    pub fn empty(initial_capital: f64) -> Self {
        Summary {
            number_of_trades: 0,
            invested_amount: 0.0,
            final_amount: initial_capital,
            win_rate_pct: 0.0,
            risk_reward_ratio: 0.0,
            avg_profit_pct: 0.0,
            max_loss_pct: 0.0,
            max_win_pct: 0.0,
            profit_factor: 0.0,
            pnl_pct: 0.0,
            avg_loss_pct: 0.0,
            max_drawdown_pct: 0.0,
        }
    }

    pub fn compute(trades: &[Trade], initial_capital: f64) -> Self {
        if trades.is_empty() {
            return Self::empty(initial_capital);
        }

        let n = trades.len() as f64;
        let profits: Vec<f64> = trades.iter().map(|t| t.profit_pct).collect();
        let wins: Vec<f64> = profits.iter().copied().filter(|&p| p > 0.0).collect();
        let losses: Vec<f64> = profits.iter().copied().filter(|&p| p < 0.0).collect();

        let invested_amount: f64 = trades.iter().map(|t| t.entry_price).sum();
        let final_amount = initial_capital + trades.iter().map(|t| t.profit).sum::<f64>();
        let pnl_pct = if initial_capital > 0.0 {
            (final_amount - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let avg_win = mean(&wins);
        let loss_denominator = if losses.is_empty() {
            1.0
        } else {
            mean(&losses).abs()
        };
        let risk_reward_ratio = if loss_denominator > 0.0 {
            avg_win / loss_denominator
        } else {
            0.0
        };

        let total_wins: f64 = wins.iter().sum();
        let total_losses = if losses.is_empty() {
            1.0
        } else {
            losses.iter().sum::<f64>().abs()
        };
        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else {
            0.0
        };

        let max_win_pct = profits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let max_loss_pct = profits.iter().copied().fold(f64::INFINITY, f64::min);

        Summary {
            number_of_trades: trades.len(),
            invested_amount,
            final_amount,
            win_rate_pct: wins.len() as f64 / n * 100.0,
            risk_reward_ratio,
            avg_profit_pct: mean(&profits),
            max_loss_pct,
            max_win_pct,
            profit_factor,
            pnl_pct,
            avg_loss_pct: mean(&losses),
            max_drawdown_pct: compute_drawdown(trades, initial_capital),
        }
    }

    /// Copy with every float rounded to two decimals.
    pub fn rounded(&self) -> Self {
        Summary {
            number_of_trades: self.number_of_trades,
            invested_amount: round2(self.invested_amount),
            final_amount: round2(self.final_amount),
            win_rate_pct: round2(self.win_rate_pct),
            risk_reward_ratio: round2(self.risk_reward_ratio),
            avg_profit_pct: round2(self.avg_profit_pct),
            max_loss_pct: round2(self.max_loss_pct),
            max_win_pct: round2(self.max_win_pct),
            profit_factor: round2(self.profit_factor),
            pnl_pct: round2(self.pnl_pct),
            avg_loss_pct: round2(self.avg_loss_pct),
            max_drawdown_pct: round2(self.max_drawdown_pct),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Peak-to-trough drawdown of the equity walked trade by trade, in percent.
fn compute_drawdown(trades: &[Trade], initial_capital: f64) -> f64 {
    let mut equity = initial_capital;
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    for trade in trades {
        equity += trade.profit;
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (peak - equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
