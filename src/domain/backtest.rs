//! Strategy escalation controller.
//!
//! BacktestConfig carries every threshold and constant the ladder uses.

use tracing::{debug, info};

use super::day_record::DayRecord;
use super::execution::simulate_tier;
use super::metrics::Summary;
use super::position::Trade;
use super::strategy::Tier;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub tier1_min_trades: usize,
    pub tier2_min_trades: usize,
    pub tier3_min_trades: usize,
    pub max_hold_records: usize,
    pub entry_proximity_pct: f64,
    pub exit_divergence_pct: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            tier1_min_trades: 5,
            tier2_min_trades: 3,
            tier3_min_trades: 2,
            max_hold_records: 20,
            entry_proximity_pct: 2.0,
            exit_divergence_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    /// The accepted tier.
    pub tier: Tier,
    pub trades: Vec<Trade>,
    pub summary: Summary,
}

/// Run the tier ladder over `records` and summarise the accepted tier.
///
/// Tiers are tried in order and the first whose completed-trade count meets
/// its threshold wins; its open position, if any, is then force-closed at
/// the final record. Empty or single-record input yields an empty trade log.
pub fn run_backtest(records: &[DayRecord], symbol: &str, config: &BacktestConfig) -> BacktestResult {
    let ladder = Tier::ladder(config);
    let mut accepted = None;

    for tier in ladder {
        let run = simulate_tier(records, tier, symbol);
        debug!(
            symbol,
            tier = tier.number(),
            completed = run.completed_trades(),
            "tier simulated"
        );
        if tier.accepts(run.completed_trades()) {
            accepted = Some(run);
            break;
        }
    }

    // The terminal tier always accepts, so the ladder never runs dry.
    let run = match accepted {
        Some(run) => run,
        None => simulate_tier(records, ladder[ladder.len() - 1], symbol),
    };

    let tier = run.tier;
    let trades = run.finish(records, symbol);
    let summary = Summary::compute(&trades, config.initial_capital);

    info!(
        symbol,
        tier = tier.number(),
        rule = %tier,
        trades = trades.len(),
        pnl_pct = summary.pnl_pct,
        "backtest complete"
    );

    BacktestResult {
        symbol: symbol.to_string(),
        tier,
        trades,
        summary,
    }
}
