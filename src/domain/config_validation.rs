//! Configuration validation.
//!
//! Validates every field before a run and builds the typed configs the
//! domain consumes. Absent keys take their built-in defaults.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::AlphaCrossError;
use crate::domain::features::FeatureConfig;
use crate::domain::predictor::PredictorConfig;
use crate::ports::config_port::ConfigPort;

fn invalid(section: &str, key: &str, reason: &str) -> AlphaCrossError {
    AlphaCrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
    min: i64,
) -> Result<usize, AlphaCrossError> {
    let value = config.get_int(section, key, default as i64);
    if value < min {
        return Err(invalid(
            section,
            key,
            &format!("{} must be at least {}", key, min),
        ));
    }
    usize::try_from(value).map_err(|_| invalid(section, key, "value out of range"))
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, AlphaCrossError> {
    let value = config.get_double(section, key, default);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(section, key, &format!("{} must be non-negative", key)));
    }
    Ok(value)
}

fn unit_interval(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, AlphaCrossError> {
    let value = config.get_double(section, key, default);
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(section, key, &format!("{} must be between 0 and 1", key)));
    }
    Ok(value)
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AlphaCrossError> {
    let defaults = BacktestConfig::default();

    let initial_capital = config.get_double("backtest", "initial_capital", defaults.initial_capital);
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    Ok(BacktestConfig {
        initial_capital,
        tier1_min_trades: count(config, "backtest", "tier1_min_trades", defaults.tier1_min_trades, 0)?,
        tier2_min_trades: count(config, "backtest", "tier2_min_trades", defaults.tier2_min_trades, 0)?,
        tier3_min_trades: count(config, "backtest", "tier3_min_trades", defaults.tier3_min_trades, 0)?,
        max_hold_records: count(config, "backtest", "max_hold_records", defaults.max_hold_records, 1)?,
        entry_proximity_pct: non_negative(
            config,
            "backtest",
            "entry_proximity_pct",
            defaults.entry_proximity_pct,
        )?,
        exit_divergence_pct: non_negative(
            config,
            "backtest",
            "exit_divergence_pct",
            defaults.exit_divergence_pct,
        )?,
    })
}

pub fn load_feature_config(config: &dyn ConfigPort) -> Result<FeatureConfig, AlphaCrossError> {
    let d = FeatureConfig::default();
    let features = FeatureConfig {
        fast_period: count(config, "features", "fast_period", d.fast_period, 1)?,
        slow_period: count(config, "features", "slow_period", d.slow_period, 1)?,
        rsi_period: count(config, "features", "rsi_period", d.rsi_period, 1)?,
        slope_lag: count(config, "features", "slope_lag", d.slope_lag, 1)?,
        volatility_window: count(config, "features", "volatility_window", d.volatility_window, 2)?,
        target_horizon: count(config, "features", "target_horizon", d.target_horizon, 1)?,
    };
    if features.fast_period >= features.slow_period {
        return Err(invalid(
            "features",
            "fast_period",
            "fast_period must be less than slow_period",
        ));
    }
    Ok(features)
}

pub fn load_predictor_config(config: &dyn ConfigPort) -> Result<PredictorConfig, AlphaCrossError> {
    let d = PredictorConfig::default();
    let max_depth = count(config, "predictor", "max_depth", d.max_depth as usize, 1)?;
    let seed = config.get_int("predictor", "seed", d.seed as i64);
    if seed < 0 {
        return Err(invalid("predictor", "seed", "seed must be non-negative"));
    }

    Ok(PredictorConfig {
        min_records: count(config, "predictor", "min_records", d.min_records, 3)?,
        min_target_labels: count(config, "predictor", "min_target_labels", d.min_target_labels, 1)?,
        holdout: d.holdout,
        n_trees: count(config, "predictor", "n_trees", d.n_trees, 1)?,
        max_depth: u16::try_from(max_depth)
            .map_err(|_| invalid("predictor", "max_depth", "max_depth out of range"))?,
        seed: seed as u64,
        fallback_confidence: unit_interval(
            config,
            "predictor",
            "fallback_confidence",
            d.fallback_confidence,
        )?,
        neutral_confidence: unit_interval(
            config,
            "predictor",
            "neutral_confidence",
            d.neutral_confidence,
        )?,
    })
}

/// Runs every section's checks, for the `validate` command.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), AlphaCrossError> {
    load_backtest_config(config)?;
    load_feature_config(config)?;
    load_predictor_config(config)?;
    validate_symbols(config)?;
    Ok(())
}

/// Symbols named by `[backtest] symbols` (comma separated) or `symbol`.
pub fn configured_symbols(config: &dyn ConfigPort) -> Vec<String> {
    let raw = config
        .get_string("backtest", "symbols")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| config.get_string("backtest", "symbol"))
        .unwrap_or_default();
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), AlphaCrossError> {
    let named = config.get_string("backtest", "symbols").is_some()
        || config.get_string("backtest", "symbol").is_some();
    if named && configured_symbols(config).is_empty() {
        return Err(invalid("backtest", "symbols", "symbols list is empty"));
    }
    Ok(())
}
