//! TradeGrid CLI: strategy listing, single-ticker runs and batch scans.
//!
//! Commands:
//! - `strategies`: list every strategy with its defaults and grid size
//! - `run`: backtest one ticker at fixed parameters, or grid-search them
//! - `scan`: optimize one strategy across a ticker list from a TOML config

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tradegrid_core::domain::{Interval, PriceSeries, StrategyParams};
use tradegrid_core::engine::{EngineConfig, FillPolicy};
use tradegrid_core::strategy::StrategyKind;
use tradegrid_runner::{
    data_loader::MAX_WINDOW_DAYS, generate_synthetic_series, load_ticker, lookup_ticker_name,
    optimize, restrict_window,
    run_with_params, scan, BacktestResult, Constraint, LoadError, LoadOptions, Objective,
    OptimizeConfig, ResultsStore, ScanConfig, ScanReport,
};

#[derive(Parser)]
#[command(
    name = "tradegrid",
    version,
    about = "TradeGrid CLI: rule-based strategy backtests and grid-search optimization"
)]
struct Cli {
    /// Log filter (e.g. info, debug, tradegrid_runner=trace). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FillArg {
    /// Fill at the signal bar's close.
    SignalClose,
    /// Fill at the next bar's open.
    NextOpen,
}

impl From<FillArg> for FillPolicy {
    fn from(arg: FillArg) -> Self {
        match arg {
            FillArg::SignalClose => FillPolicy::SignalClose,
            FillArg::NextOpen => FillPolicy::NextOpen,
        }
    }
}

/// Where price data comes from.
#[derive(clap::Args, Debug, Clone)]
struct DataArgs {
    /// Root directory holding daily/ and minute/ CSV files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Bar interval: daily or intraday.
    #[arg(long)]
    interval: Option<Interval>,

    /// Generate a deterministic synthetic series instead of reading CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// First day of synthetic data (YYYY-MM-DD). Defaults to three years before --end.
    #[arg(long, requires = "synthetic")]
    start: Option<NaiveDate>,

    /// Last day of synthetic data (YYYY-MM-DD). Defaults to today.
    #[arg(long, requires = "synthetic")]
    end: Option<NaiveDate>,

    /// Keep only this many calendar days of history.
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_DAYS))]
    lookback_days: Option<i64>,

    /// End the history this many calendar days before the last bar.
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_WINDOW_DAYS))]
    days_ago: Option<i64>,

    /// CSV mapping ticker codes to display names.
    #[arg(long)]
    names_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available strategies, their default parameters and grid sizes.
    Strategies,
    /// Backtest one ticker at fixed parameters, or optimize them with --optimize.
    Run {
        /// Ticker symbol, e.g. 7203.T.
        ticker: String,

        /// Strategy name (see `tradegrid strategies`).
        #[arg(long, short, default_value = "sma_cross")]
        strategy: StrategyKind,

        /// Parameter override as name=value; repeatable. Unset names keep their defaults.
        #[arg(long = "param", short = 'p', conflicts_with = "optimize")]
        params: Vec<String>,

        /// Grid-search the strategy's parameter space.
        #[arg(long, default_value_t = false)]
        optimize: bool,

        /// Metric to maximize when optimizing.
        #[arg(long, default_value = "return_pct", requires = "optimize")]
        objective: Objective,

        /// Feasibility constraint when optimizing, e.g. "ns < nl".
        #[arg(long, requires = "optimize")]
        constraint: Option<Constraint>,

        /// Sweep attempts before giving up.
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,

        /// Starting cash.
        #[arg(long, default_value_t = 100_000.0)]
        cash: f64,

        /// Execution price rule.
        #[arg(long, value_enum, default_value_t = FillArg::SignalClose)]
        fill: FillArg,

        /// Trailing bars checked for recent buy/sell signals.
        #[arg(long, default_value_t = 2)]
        window: usize,

        #[command(flatten)]
        data: DataArgs,

        /// Write the full result as JSON to this path.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Append a summary row to this results CSV.
        #[arg(long)]
        results_file: Option<PathBuf>,
    },
    /// Optimize one strategy across many tickers.
    Scan {
        /// TOML scan config. Flags below override its values.
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Tickers to scan; replaces the config's ticker list.
        tickers: Vec<String>,

        #[arg(long, short)]
        strategy: Option<StrategyKind>,

        #[arg(long)]
        objective: Option<Objective>,

        #[arg(long)]
        constraint: Option<String>,

        #[command(flatten)]
        data: DataArgs,

        /// Append one summary row per successful ticker to this results CSV.
        #[arg(long)]
        results_file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Strategies => run_strategies(),
        Commands::Run {
            ticker,
            strategy,
            params,
            optimize,
            objective,
            constraint,
            max_attempts,
            cash,
            fill,
            window,
            data,
            output,
            results_file,
        } => {
            let engine = EngineConfig::new(cash).with_fill_policy(fill.into());
            let mode = if optimize {
                RunMode::Optimize(OptimizeConfig {
                    objective,
                    constraint,
                    max_attempts,
                    engine,
                    window_bars: window,
                    ..OptimizeConfig::default()
                })
            } else {
                RunMode::Fixed {
                    params: fixed_params(strategy, &params)?,
                    engine,
                    window,
                }
            };
            run_cmd(&ticker, strategy, mode, &data, output.as_deref(), results_file.as_deref())
        }
        Commands::Scan {
            config,
            tickers,
            strategy,
            objective,
            constraint,
            data,
            results_file,
        } => {
            let mut cfg = match &config {
                Some(path) => ScanConfig::from_file(path)
                    .with_context(|| format!("loading scan config {}", path.display()))?,
                None => ScanConfig::default(),
            };
            if !tickers.is_empty() {
                cfg.tickers = tickers;
                cfg.tickers_file = None;
            }
            if let Some(s) = strategy {
                cfg.strategy = s;
            }
            if let Some(o) = objective {
                cfg.objective = o;
            }
            if constraint.is_some() {
                cfg.constraint = constraint;
            }
            if results_file.is_some() {
                cfg.results_file = results_file;
            }
            data.apply_to(&mut cfg);
            scan_cmd(&cfg, &data)
        }
    }
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("bad --log-level '{level}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run_strategies() -> Result<()> {
    println!("{:<18} {:>8}  {:<48} description", "strategy", "grid", "defaults");
    for kind in StrategyKind::ALL {
        println!(
            "{:<18} {:>8}  {:<48} {}",
            kind.name(),
            kind.declare_parameters().cardinality(),
            kind.default_params().to_string(),
            kind.description()
        );
    }
    Ok(())
}

/// Defaults for `kind`, overridden by `name=value` pairs.
fn fixed_params(kind: StrategyKind, pairs: &[String]) -> Result<StrategyParams> {
    let overrides = StrategyParams::parse_pairs(pairs.iter().map(String::as_str))?;
    let mut params = kind.default_params();
    for (name, value) in overrides.iter() {
        if params.get(name).is_none() {
            bail!(
                "{kind} has no parameter '{name}' (expected one of: {})",
                kind.declare_parameters().names().collect::<Vec<_>>().join(", ")
            );
        }
        params.insert(name, value);
    }
    Ok(params)
}

enum RunMode {
    Fixed {
        params: StrategyParams,
        engine: EngineConfig,
        window: usize,
    },
    Optimize(OptimizeConfig),
}

impl DataArgs {
    fn load_options(&self) -> LoadOptions {
        let defaults = LoadOptions::default();
        LoadOptions {
            data_dir: self.data_dir.clone().unwrap_or(defaults.data_dir),
            interval: self.interval.unwrap_or(defaults.interval),
            drop_incomplete: defaults.drop_incomplete,
        }
    }

    fn apply_to(&self, cfg: &mut ScanConfig) {
        if let Some(dir) = &self.data_dir {
            cfg.data_dir = dir.clone();
        }
        if let Some(interval) = self.interval {
            cfg.interval = interval;
        }
        if let Some(days) = self.lookback_days {
            cfg.lookback_days = Some(days);
        }
        if let Some(days) = self.days_ago {
            cfg.days_ago = days;
        }
        if let Some(names) = &self.names_file {
            cfg.ticker_names = Some(names.clone());
        }
    }

    fn synthetic_range(&self) -> (NaiveDate, NaiveDate) {
        let end = self.end.unwrap_or_else(|| chrono::Local::now().date_naive());
        let start = self
            .start
            .unwrap_or_else(|| end - chrono::Duration::days(365 * 3));
        (start, end)
    }

    fn load(
        &self,
        ticker: &str,
        opts: &LoadOptions,
        days_ago: i64,
        lookback_days: Option<i64>,
    ) -> Result<PriceSeries, LoadError> {
        let series = if self.synthetic {
            let (start, end) = self.synthetic_range();
            generate_synthetic_series(ticker, start, end)?
        } else {
            load_ticker(ticker, opts)?
        };
        restrict_window(series, days_ago, lookback_days)
    }
}

fn ticker_name(names_file: Option<&Path>, ticker: &str) -> Option<String> {
    let path = names_file?;
    match lookup_ticker_name(path, ticker) {
        Ok(name) => Some(name),
        Err(e) => {
            tracing::warn!(ticker, error = %e, "ticker name lookup failed");
            None
        }
    }
}

fn run_cmd(
    ticker: &str,
    strategy: StrategyKind,
    mode: RunMode,
    data: &DataArgs,
    output: Option<&Path>,
    results_file: Option<&Path>,
) -> Result<()> {
    let opts = data.load_options();
    let series = data
        .load(ticker, &opts, data.days_ago.unwrap_or(0), data.lookback_days)
        .with_context(|| format!("loading {ticker}"))?;
    if series.is_empty() {
        bail!("no bars for {ticker} in the requested window");
    }

    let result = match &mode {
        RunMode::Fixed {
            params,
            engine,
            window,
        } => run_with_params(&series, strategy, params, engine, *window)?,
        RunMode::Optimize(cfg) => optimize(&series, strategy, cfg)?,
    };

    let name = ticker_name(data.names_file.as_deref(), ticker);
    print_summary(&result, name.as_deref());

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Result saved to: {}", path.display());
    }
    if let Some(path) = results_file {
        ResultsStore::new(path).append(&result, name.as_deref())?;
        println!("Row appended to: {}", path.display());
    }
    Ok(())
}

fn scan_cmd(cfg: &ScanConfig, data: &DataArgs) -> Result<()> {
    cfg.validate()?;
    let tickers = cfg.resolve_tickers()?;
    let optimize_cfg = cfg.optimize_config()?;
    let opts = cfg.load_options();

    tracing::info!(
        strategy = %cfg.strategy,
        tickers = tickers.len(),
        objective = %cfg.objective,
        "scan started"
    );
    let report = scan(
        &tickers,
        |t| data.load(t, &opts, cfg.days_ago, cfg.lookback_days),
        cfg.strategy,
        &optimize_cfg,
    );

    print_scan(&report);

    if let Some(path) = &cfg.results_file {
        let store = ResultsStore::new(path);
        for outcome in &report.outcomes {
            if let Some(result) = outcome.result() {
                let name = ticker_name(cfg.ticker_names.as_deref(), &outcome.ticker);
                store.append(result, name.as_deref())?;
            }
        }
        println!("Results appended to: {}", path.display());
    }

    if report.summary.succeeded == 0 {
        bail!("every ticker failed");
    }
    Ok(())
}

fn print_summary(result: &BacktestResult, name: Option<&str>) {
    let m = &result.metrics;
    let label = match name {
        Some(n) => format!("{} ({n})", result.symbol),
        None => result.symbol.clone(),
    };
    println!();
    println!("=== {label} · {} ===", result.strategy);
    if let (Some(start), Some(end)) = (result.start, result.end) {
        println!("Period:           {} → {} ({} bars)", start.date(), end.date(), result.bar_count);
    }
    println!("Parameters:       {}", result.params);
    if let Some(opt) = &result.optimization {
        println!(
            "Optimized:        {} = {:.4} ({} of {} candidates feasible, {} skipped, attempt {})",
            opt.objective,
            opt.best_value,
            opt.feasible_candidates,
            opt.total_candidates,
            opt.skipped_candidates,
            opt.attempts
        );
    }
    println!("Return:           {:.2}%", m.return_pct);
    println!("Buy & Hold:       {:.2}%", m.buy_hold_return_pct);
    println!("Final Equity:     {:.2}", m.final_equity);
    println!("Max Drawdown:     {:.2}%", m.max_drawdown_pct);
    println!("Sharpe:           {:.3}", m.sharpe);
    println!("Trades:           {}", m.trade_count);
    println!("Win Rate:         {:.1}%", m.win_rate_pct);
    println!("Profit Factor:    {:.2}", m.profit_factor);
    println!("Exposure:         {:.1}%", m.exposure_pct);
    if result.open_position.is_some() {
        println!("Open position:    yes (marked to market)");
    }
    println!(
        "Recent signals:   buy={} sell={} (last {} bars)",
        result.recent.buy, result.recent.sell, result.recent.window_bars
    );
    for w in &result.warnings {
        println!("Warning:          {w:?}");
    }
}

fn print_scan(report: &ScanReport) {
    println!();
    println!("=== Scan · {} ===", report.strategy);
    for o in &report.outcomes {
        match &o.outcome {
            Ok(r) => println!(
                "{:<12} {:>9.2}%  trades={:<4} buy={:<5} sell={:<5} {}",
                o.ticker,
                r.return_pct(),
                r.trade_count(),
                r.recent.buy,
                r.recent.sell,
                r.params
            ),
            Err(e) => println!("{:<12} FAILED: {e}", o.ticker),
        }
    }

    let s = &report.summary;
    println!();
    println!("Succeeded:        {} / {}", s.succeeded, s.succeeded + s.failed);
    println!("Mean Return:      {:.2}%", s.mean_return_pct);
    println!("Return Std Dev:   {:.2}%", s.return_std_pct);
    println!("Mean Trades:      {:.2}", s.mean_trade_count);
    println!("Buy signals:      {}", list_or_none(&s.buy_signal_tickers));
    println!("Sell signals:     {}", list_or_none(&s.sell_signal_tickers));
    if let (Some(t), Some(r)) = (&s.best_ticker, s.best_return_pct) {
        println!("Best:             {t} ({r:.2}%)");
    }
}

fn list_or_none(tickers: &[String]) -> String {
    if tickers.is_empty() {
        "none".to_string()
    } else {
        tickers.join(", ")
    }
}
