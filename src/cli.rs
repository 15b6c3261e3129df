//! CLI definition and dispatch.
//!
//! Reports go to stdout as JSON, one document per symbol. Diagnostics go to
//! stderr through `tracing`.

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::tree_ensemble_classifier::TreeEnsembleClassifier;
use crate::domain::backtest::{BacktestConfig, run_backtest};
use crate::domain::config_validation::{
    configured_symbols, load_backtest_config, load_feature_config, load_predictor_config,
    validate_all,
};
use crate::domain::error::AlphaCrossError;
use crate::domain::features::{FeatureConfig, build_day_records, latest_snapshot};
use crate::domain::predictor::{PredictorConfig, train_and_predict};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "alphacross",
    about = "Moving-average crossover backtester and signal predictor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// INI configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding <SYMBOL>.csv price files
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,
    /// Single symbol, overriding the configured list
    #[arg(short, long)]
    pub symbol: Option<String>,
    /// Indented JSON output; also `[report] pretty` in the config
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// INI configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding <SYMBOL>.csv price files
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the tiered crossover backtest
    Backtest(RunArgs),
    /// Predict the next-period signal
    Predict(RunArgs),
    /// Show the latest close, EMAs and RSI
    Info(RunArgs),
    /// List symbols available in the data directory
    ListSymbols(ListArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Every typed setting a run needs, read and validated once.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backtest: BacktestConfig,
    pub features: FeatureConfig,
    pub predictor: PredictorConfig,
    pub data_dir: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest(args) => with_context(&args, |ctx, out| {
            run_backtest_pipeline(ctx.data_port, ctx.report, &ctx.symbols, &ctx.settings, out)
        }),
        Command::Predict(args) => with_context(&args, |ctx, out| {
            run_predict_pipeline(ctx.data_port, ctx.report, &ctx.symbols, &ctx.settings, out)
        }),
        Command::Info(args) => with_context(&args, |ctx, out| {
            run_info_pipeline(ctx.data_port, ctx.report, &ctx.symbols, &ctx.settings, out)
        }),
        Command::ListSymbols(args) => run_list_symbols(&args),
        Command::Validate { config } => run_validate(&config),
    }
}

struct RunContext<'a> {
    data_port: &'a dyn DataPort,
    report: &'a dyn ReportPort,
    symbols: Vec<String>,
    settings: Settings,
}

fn with_context(
    args: &RunArgs,
    pipeline: impl FnOnce(&RunContext<'_>, &mut dyn Write) -> ExitCode,
) -> ExitCode {
    let (adapter, settings) = match prepare(args) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };
    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let symbols = match resolve_symbols(args.symbol.as_deref(), &adapter, &data_port) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let report = JsonReportAdapter::new(args.pretty || adapter.get_bool("report", "pretty", false));
    let ctx = RunContext {
        data_port: &data_port,
        report: &report,
        symbols,
        settings,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    pipeline(&ctx, &mut out)
}

fn prepare(args: &RunArgs) -> Result<(FileConfigAdapter, Settings), AlphaCrossError> {
    let adapter = load_config(args.config.as_deref())?;
    let settings = build_settings(&adapter, args.data_dir.as_deref())?;
    Ok((adapter, settings))
}

fn fail(err: &AlphaCrossError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Loads the INI file at `path`, or an empty configuration when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, AlphaCrossError> {
    let Some(path) = path else {
        info!("no config file given, using built-in defaults");
        return Ok(FileConfigAdapter::empty());
    };
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| AlphaCrossError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_settings(
    config: &dyn ConfigPort,
    data_dir_override: Option<&Path>,
) -> Result<Settings, AlphaCrossError> {
    let data_dir = match data_dir_override {
        Some(d) => d.to_path_buf(),
        None => config
            .get_string("backtest", "data_dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    Ok(Settings {
        backtest: load_backtest_config(config)?,
        features: load_feature_config(config)?,
        predictor: load_predictor_config(config)?,
        data_dir,
    })
}

/// `--symbol` first, then the configured list, then every file in the data
/// directory.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, AlphaCrossError> {
    if let Some(s) = symbol_override {
        let s = s.trim().to_uppercase();
        if !s.is_empty() {
            return Ok(vec![s]);
        }
    }
    let configured = configured_symbols(config);
    if !configured.is_empty() {
        return Ok(configured);
    }
    let listed = data_port.list_symbols()?;
    if listed.is_empty() {
        return Err(AlphaCrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        });
    }
    Ok(listed)
}

/// Runs `each` per symbol. A failing symbol is skipped with a warning; the
/// run fails only when no symbol succeeds, with the last error's exit code.
fn for_each_symbol(
    symbols: &[String],
    mut each: impl FnMut(&str) -> Result<(), AlphaCrossError>,
) -> ExitCode {
    let mut succeeded = 0usize;
    let mut last_err = None;
    for symbol in symbols {
        match each(symbol) {
            Ok(()) => succeeded += 1,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol");
                last_err = Some(e);
            }
        }
    }
    match (succeeded, last_err) {
        (0, Some(e)) => fail(&e),
        (0, None) => {
            eprintln!("error: no symbols to process");
            ExitCode::from(5)
        }
        _ => ExitCode::SUCCESS,
    }
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    symbols: &[String],
    settings: &Settings,
    out: &mut dyn Write,
) -> ExitCode {
    for_each_symbol(symbols, |symbol| {
        let bars = data_port.fetch_bars(symbol)?;
        let records = build_day_records(&bars, &settings.features);
        let result = run_backtest(&records, symbol, &settings.backtest);
        report.write_backtest(&result, out)
    })
}

pub fn run_predict_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    symbols: &[String],
    settings: &Settings,
    out: &mut dyn Write,
) -> ExitCode {
    for_each_symbol(symbols, |symbol| {
        let bars = data_port.fetch_bars(symbol)?;
        let records = build_day_records(&bars, &settings.features);
        let classifier = TreeEnsembleClassifier::from_config(&settings.predictor);
        let prediction = train_and_predict(&records, symbol, &settings.predictor, classifier)?;
        report.write_prediction(&prediction, out)
    })
}

pub fn run_info_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    symbols: &[String],
    settings: &Settings,
    out: &mut dyn Write,
) -> ExitCode {
    for_each_symbol(symbols, |symbol| {
        let bars = data_port.fetch_bars(symbol)?;
        let records = build_day_records(&bars, &settings.features);
        let snapshot = latest_snapshot(&records).ok_or_else(|| AlphaCrossError::InsufficientData {
            symbol: symbol.to_string(),
            records: 0,
            minimum: 1,
        })?;
        report.write_snapshot(symbol, &snapshot, out)
    })
}

fn run_list_symbols(args: &ListArgs) -> ExitCode {
    let settings = match load_config(args.config.as_deref())
        .and_then(|adapter| build_settings(&adapter, args.data_dir.as_deref()))
    {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let stdout = io::stdout();
    list_symbols(&data_port, &mut stdout.lock())
}

/// Writes one symbol per line from `data_port`.
pub fn list_symbols(data_port: &dyn DataPort, out: &mut dyn Write) -> ExitCode {
    let result = data_port.list_symbols().and_then(|symbols| {
        for symbol in &symbols {
            writeln!(out, "{}", symbol)?;
        }
        Ok(symbols.len())
    });
    match result {
        Ok(count) => {
            info!(count, "symbols listed");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(Some(config_path)) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    match validate_all(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
