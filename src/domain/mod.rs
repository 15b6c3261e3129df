//! Core domain types and logic.

pub mod ohlcv;
pub mod day_record;
pub mod indicator;
pub mod features;
pub mod crossover;
pub mod position;
pub mod execution;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod label_codec;
pub mod predictor;
pub mod config_validation;
pub mod error;
